//! Done command: toggles a task's completion.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use crate::Config;
use crate::commands::util::{load_task_for_edit, open_database};

#[derive(Debug, Args)]
pub struct DoneArgs {
    /// Task ID or unique prefix.
    pub id: String,
}

pub fn run<W: Write>(writer: &mut W, args: &DoneArgs, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    let (mut state, id) = load_task_for_edit(&mut db, &args.id)?;
    let Some(completed) = state.toggle_complete(&id) else {
        bail!("task not found: {}", args.id);
    };
    db.save_state(&state)?;

    let title = state.task(&id).map_or("", |task| task.title.as_str());
    let verb = if completed { "Completed" } else { "Reopened" };
    writeln!(writer, "{verb}: {title}")?;
    Ok(())
}
