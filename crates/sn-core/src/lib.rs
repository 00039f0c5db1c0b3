//! Core domain logic for the stamp notebook.
//!
//! This crate contains the fundamental types and logic for:
//! - Stamps: timestamped care events with a kind and free-text note
//! - Sleep interval reconstruction from SLEEP/WAKE_UP point events
//! - Month windows: half-open epoch-millisecond ranges for calendar months
//! - CSV exchange: flat export/import of a note's full timeline

pub mod csv;
pub mod interval;
pub mod month;
pub mod note;
pub mod stamp;
pub mod types;

pub use csv::{CSV_HEADER, CsvError, export_csv, parse_csv};
pub use interval::{SleepInterval, reconstruct_sleep_intervals};
pub use month::{first_of_month, first_of_next_month, month_range};
pub use note::{Note, SharedNoteInfo};
pub use stamp::{StampKind, StampRecord, UnknownStampKind};
pub use types::{NoteId, OwnerId, SharedId, ValidationError};
