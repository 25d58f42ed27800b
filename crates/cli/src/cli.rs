use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::edits::TaskAssignment;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "listmgr",
    version,
    about = "Edit a record's task lists: relative deadlines, owners, reminders and recurrence.",
    after_help = "Examples:\n  listmgr seed --record MATTER-1\n  listmgr tasks --record MATTER-1 --list 01HX...\n  listmgr edit --record MATTER-1 --list 01HX... --set 01HY...:deadline=10 --set 01HY...:deadline-direction=before\n  listmgr edit --record MATTER-1 --name \"Trial prep\" --target-date 2024-06-01"
)]
pub struct Cli {
    /// Override the data directory (defaults to platform-specific app dir)
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Tracing filter directive (e.g. "info", "listmgr_core=debug")
    #[arg(long = "log", value_name = "DIRECTIVE", global = true, default_value = "info")]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Insert a sample roster, list and tasks for a record
    Seed(RecordArgs),
    /// Show the task lists of a record
    Lists(OutputArgs),
    /// Show the active members of a record
    Members(OutputArgs),
    /// Show a list's tasks with decomposed offsets
    Tasks(TasksArgs),
    /// Apply edits to a list and save them
    Edit(EditArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Parent record identifier
    #[arg(long = "record", value_name = "ID")]
    pub record_id: String,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    #[command(flatten)]
    pub record: RecordArgs,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TasksArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    /// List identifier
    #[arg(long = "list", value_name = "ID")]
    pub list_id: String,
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    #[command(flatten)]
    pub record: RecordArgs,

    /// List to edit; omit to create a new list
    #[arg(long = "list", value_name = "ID")]
    pub list_id: Option<String>,

    /// New list name
    #[arg(long)]
    pub name: Option<String>,

    /// New list target date (YYYY-MM-DD)
    #[arg(long = "target-date", value_name = "DATE")]
    pub target_date: Option<NaiveDate>,

    /// Clear the list target date
    #[arg(long = "clear-target-date", conflicts_with = "target_date")]
    pub clear_target_date: bool,

    /// Add a task with the given subject (refer to it later as +1, +2, ...)
    #[arg(long = "add", value_name = "SUBJECT", action = ArgAction::Append)]
    pub add: Vec<String>,

    /// Remove the task row with the given key
    #[arg(long = "remove", value_name = "KEY", action = ArgAction::Append)]
    pub remove: Vec<String>,

    /// Set a task field: KEY:FIELD=VALUE (an empty VALUE clears the field)
    #[arg(long = "set", value_name = "KEY:FIELD=VALUE", action = ArgAction::Append)]
    pub set: Vec<TaskAssignment>,
}
