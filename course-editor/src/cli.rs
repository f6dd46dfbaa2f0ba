use std::path::PathBuf;

use clap::{Parser, Subcommand};
use course_editor::domain::models::ActivityKind;

#[derive(Debug, Parser)]
#[command(name = "course-editor")]
#[command(about = "Reorder and edit the structure of an LMS course")]
pub struct Cli {
    /// Course to open. Falls back to `editor.course_id` from config
    #[arg(long, global = true)]
    pub course: Option<String>,
    /// Run against a seeded in-memory course instead of the LMS
    #[arg(long, global = true)]
    pub dev: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the course tree
    Show,
    /// Move a section to another position (0-based)
    MoveSection { from: usize, to: usize },
    /// Move an activity within a section or into another one (0-based)
    MoveActivity {
        #[arg(long)]
        from_section: String,
        #[arg(long)]
        from_index: usize,
        #[arg(long)]
        to_section: String,
        #[arg(long)]
        to_index: usize,
    },
    /// Append a new section
    AddSection {
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    RenameSection { section_id: String, title: String },
    DeleteSection { section_id: String },
    /// Append a new activity to a section
    AddActivity {
        section_id: String,
        title: String,
        #[arg(long, default_value = "page")]
        kind: ActivityKind,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    RenameActivity {
        section_id: String,
        activity_id: String,
        title: String,
    },
    DeleteActivity {
        section_id: String,
        activity_id: String,
    },
    /// Replay drag gestures from a JSON file, one after another
    Replay { path: PathBuf },
    /// Print the config directory and environment in use
    ConfigPath,
}
