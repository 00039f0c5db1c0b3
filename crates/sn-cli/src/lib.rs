//! Care journal CLI library.
//!
//! This crate provides the command-line interface over the journal stores.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, NotesAction, StampAction, SubsAction};
pub use config::Config;
