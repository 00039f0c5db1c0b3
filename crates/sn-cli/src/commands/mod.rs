//! CLI command implementations.

pub mod export;
pub mod graph;
pub mod import;
pub mod notes;
pub mod review;
pub mod stamp;
pub mod subs;
pub mod timeline;
pub mod util;
