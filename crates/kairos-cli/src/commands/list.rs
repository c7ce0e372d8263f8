//! List command: active and completed tasks.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use kairos_core::{AppState, Task};

use crate::Config;
use crate::commands::util::{format_task_line, open_database};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct TaskList<'a> {
    active: Vec<&'a Task>,
    completed: Vec<&'a Task>,
}

pub fn run<W: Write>(writer: &mut W, args: &ListArgs, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    let mut state = db.load_state()?;
    let corrected = state.reconcile_all();
    if corrected > 0 {
        db.save_state(&state)?;
    }

    if args.json {
        let list = TaskList {
            active: state.active_tasks().collect(),
            completed: state.completed_tasks().collect(),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&list)?)?;
    } else {
        write!(writer, "{}", format_tasks(&state))?;
    }
    Ok(())
}

/// Renders the two task sections.
pub fn format_tasks(state: &AppState) -> String {
    if state.tasks.is_empty() {
        return "No tasks yet. Add one with `kairos add`.\n".to_string();
    }

    let mut output = String::new();
    output.push_str("ACTIVE TASKS\n");
    let mut active = state.active_tasks().peekable();
    if active.peek().is_none() {
        output.push_str("  You're all done for the day!\n");
    }
    for task in active {
        output.push_str("  ");
        output.push_str(&format_task_line(task));
        output.push('\n');
    }

    let completed: Vec<&Task> = state.completed_tasks().collect();
    if !completed.is_empty() {
        output.push_str("\nCOMPLETED\n");
        for task in completed {
            output.push_str("  ");
            output.push_str(&format_task_line(task));
            output.push('\n');
        }
    }
    output
}
