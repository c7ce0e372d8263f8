//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::add::AddArgs;
use crate::commands::calendar::CalendarArgs;
use crate::commands::categories::CategoriesAction;
use crate::commands::delete::DeleteArgs;
use crate::commands::done::DoneArgs;
use crate::commands::edit::EditArgs;
use crate::commands::history::HistoryArgs;
use crate::commands::list::ListArgs;
use crate::commands::theme::ThemeArgs;
use crate::commands::time::TimeArgs;

/// Kairos task manager.
///
/// Type what you want to get done; Kairos structures it into tasks with a
/// category, priority, duration and time slot.
#[derive(Debug, Parser)]
#[command(name = "kairos", version, about, long_about = None)]
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
    /// Add tasks from a free-text description.
    Add(AddArgs),

    /// List active and completed tasks.
    List(ListArgs),

    /// Toggle a task between active and completed.
    Done(DoneArgs),

    /// Delete a task.
    Delete(DeleteArgs),

    /// Change a task's title, category or priority.
    Edit(EditArgs),

    /// Change a task's start time, end time or duration.
    Time(TimeArgs),

    /// Export a task to Google Calendar or an .ics file.
    Calendar(CalendarArgs),

    /// Show completion totals and tasks grouped by the day they were added.
    History(HistoryArgs),

    /// Manage category labels and colors.
    #[command(subcommand)]
    Categories(CategoriesAction),

    /// Show or toggle the color theme.
    Theme(ThemeArgs),
}
