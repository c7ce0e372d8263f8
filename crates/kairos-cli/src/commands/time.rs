//! Time command: edits a task's start, end or duration.
//!
//! Every edit goes through the reconciliation rules, so the stored range
//! always ends at start + duration.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use kairos_core::{ClockTime, TaskDuration, TimeEdit};

use crate::Config;
use crate::commands::util::{load_task_for_edit, open_database};

#[derive(Debug, Args)]
pub struct TimeArgs {
    /// Task ID or unique prefix.
    pub id: String,

    /// Start time, e.g. "9:30 AM" or 21:30.
    #[arg(long)]
    pub start: Option<ClockTime>,

    /// End time, e.g. "11:00 AM" or 23:00.
    #[arg(long)]
    pub end: Option<ClockTime>,

    /// Duration as HH:MM.
    #[arg(long)]
    pub duration: Option<TaskDuration>,
}

impl TimeArgs {
    /// Edits in the order they are applied: duration, then start, then end.
    fn edits(&self) -> Vec<TimeEdit> {
        self.duration
            .map(TimeEdit::Duration)
            .into_iter()
            .chain(self.start.map(TimeEdit::Start))
            .chain(self.end.map(TimeEdit::End))
            .collect()
    }
}

pub fn run<W: Write>(writer: &mut W, args: &TimeArgs, config: &Config) -> Result<()> {
    let edits = args.edits();
    if edits.is_empty() {
        bail!("nothing to change: pass --start, --end or --duration");
    }

    let mut db = open_database(config)?;
    let (mut state, id) = load_task_for_edit(&mut db, &args.id)?;
    let mut slot = None;
    for edit in edits {
        slot = state.edit_time(&id, edit);
    }
    let Some(slot) = slot else {
        bail!("task not found: {}", args.id);
    };
    db.save_state(&state)?;

    let duration = slot
        .duration
        .map_or_else(|| "--:--".to_string(), |duration| duration.to_string());
    match slot.scheduled_for {
        Some(range) => writeln!(writer, "Scheduled {range} ({duration})")?,
        None => writeln!(writer, "Duration {duration}, unscheduled")?,
    }
    Ok(())
}
