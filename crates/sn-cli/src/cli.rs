//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Care journal for recording a child's day.
///
/// Stamps (sleep, meals, medication, moods) are recorded on a timeline per
/// note and can be browsed by month, graphed, and exchanged as CSV.
#[derive(Debug, Parser)]
#[command(name = "sn", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage notes (named journals).
    Notes {
        #[command(subcommand)]
        action: NotesAction,
    },

    /// Record and inspect individual stamps.
    Stamp {
        #[command(subcommand)]
        action: StampAction,
    },

    /// Show one month of stamps, newest first.
    Timeline {
        /// Month to show as YYYY-MM (defaults to the current month).
        #[arg(long)]
        month: Option<String>,

        /// Note to read (name or ID, defaults to the first note).
        #[arg(long)]
        note: Option<String>,

        /// Output as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show a month's diary: stamps with free text, grouped by day.
    Review {
        /// Month to show as YYYY-MM (defaults to the current month).
        #[arg(long)]
        month: Option<String>,

        /// Only show stamps of this kind (identifier or label).
        #[arg(long)]
        kind: Option<String>,

        /// Note to read (name or ID, defaults to the first note).
        #[arg(long)]
        note: Option<String>,
    },

    /// Show reconstructed sleep intervals for a month, one line per day.
    Graph {
        /// Month to show as YYYY-MM (defaults to the current month).
        #[arg(long)]
        month: Option<String>,

        /// Note to read (name or ID, defaults to the first note).
        #[arg(long)]
        note: Option<String>,
    },

    /// Export a note's full timeline as CSV.
    Export {
        /// Note to export (name or ID, defaults to the first note).
        #[arg(long)]
        note: Option<String>,

        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import stamps from a CSV file.
    Import {
        /// The CSV file to import.
        file: PathBuf,

        /// Note to import into (name or ID, defaults to the first note).
        #[arg(long)]
        note: Option<String>,
    },

    /// List the available stamp kinds.
    Kinds,

    /// Manage shared-note subscriptions.
    Subs {
        #[command(subcommand)]
        action: SubsAction,
    },
}

/// Note management actions.
#[derive(Debug, Subcommand)]
pub enum NotesAction {
    /// List all notes.
    List {
        /// Output as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Create a new note.
    Create {
        /// Display name of the note.
        name: String,

        /// Publish the note under this shared ID at creation.
        #[arg(long)]
        shared_id: Option<String>,
    },

    /// Rename a note.
    Rename {
        /// Note to rename (name or ID).
        note: String,

        /// The new display name.
        name: String,
    },

    /// Delete a note and its entire timeline.
    Delete {
        /// Note to delete (name or ID).
        note: String,
    },

    /// Publish a note under a shared ID.
    Share {
        /// Note to share (name or ID).
        note: String,

        /// The shared ID to publish under.
        shared_id: String,
    },

    /// Withdraw a note's shared ID.
    Unshare {
        /// Note to unshare (name or ID).
        note: String,
    },
}

/// Stamp actions.
#[derive(Debug, Subcommand)]
pub enum StampAction {
    /// Record a stamp.
    Add {
        /// The stamp kind, by identifier (SLEEP) or label (ねる).
        kind: String,

        /// Free text attached to the stamp.
        #[arg(default_value = "")]
        text: String,

        /// Record at this local time (YYYY-MM-DD HH:MM[:SS]) instead of now.
        #[arg(long)]
        at: Option<String>,

        /// Note to record into (name or ID, defaults to the first note).
        #[arg(long)]
        note: Option<String>,
    },

    /// Show the stamp at an exact timestamp (epoch milliseconds).
    Show {
        timestamp: i64,

        /// Note to read (name or ID, defaults to the first note).
        #[arg(long)]
        note: Option<String>,
    },

    /// Delete the stamp at an exact timestamp (epoch milliseconds).
    Delete {
        timestamp: i64,

        /// Note to delete from (name or ID, defaults to the first note).
        #[arg(long)]
        note: Option<String>,
    },

    /// Suggest recent free texts for a stamp kind.
    Suggest {
        /// The stamp kind, by identifier (SLEEP) or label (ねる).
        kind: String,

        /// Note to read (name or ID, defaults to the first note).
        #[arg(long)]
        note: Option<String>,
    },
}

/// Subscription actions.
#[derive(Debug, Subcommand)]
pub enum SubsAction {
    /// Subscribe to a shared note.
    Subscribe {
        /// The shared ID to subscribe to.
        shared_id: String,
    },

    /// Unsubscribe from a shared note.
    Unsubscribe {
        /// The shared ID to drop.
        shared_id: String,
    },

    /// List subscriptions and whether they still resolve.
    List,
}
