//! Add command: turns free text into one or more tasks.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{Local, Utc};
use clap::Args;

use kairos_core::{ExtractionRequest, NewTask, fallback_tasks};
use kairos_llm::{Client, extract_or_fallback};

use crate::Config;
use crate::commands::util::{format_task_line, open_database};

#[derive(Debug, Args)]
pub struct AddArgs {
    /// What you want to get done, e.g. "gym at 6pm for an hour".
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Give every task a time slot, starting after the current time.
    #[arg(long)]
    pub auto_schedule: bool,

    /// Skip the Claude API and store the text as a single task.
    #[arg(long)]
    pub offline: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &AddArgs, config: &Config) -> Result<()> {
    let text = args.text.join(" ");
    if text.trim().is_empty() {
        bail!("task text cannot be empty");
    }

    let request = ExtractionRequest::new(text, args.auto_schedule, Local::now().naive_local());
    let tasks = if args.offline {
        fallback_tasks(&request.text)
    } else {
        extract_tasks(&request, config)
    };

    let mut db = open_database(config)?;
    let mut state = db.load_state()?;
    let ids = state.add_tasks(tasks, Utc::now());
    db.save_state(&state)?;

    let noun = if ids.len() == 1 { "task" } else { "tasks" };
    writeln!(writer, "Added {} {noun}:", ids.len())?;
    for task in ids.iter().filter_map(|id| state.task(id)) {
        writeln!(writer, "  {}", format_task_line(task))?;
    }
    Ok(())
}

fn extract_tasks(request: &ExtractionRequest, config: &Config) -> Vec<NewTask> {
    let Some(api_key) = config.api_key() else {
        tracing::info!("no API key configured, storing text as a single task");
        return fallback_tasks(&request.text);
    };

    let client = match Client::new(api_key) {
        Ok(client) => client.with_model(config.model()),
        Err(err) => {
            tracing::warn!(error = %err, "failed to create Claude client");
            return fallback_tasks(&request.text);
        }
    };

    match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime.block_on(extract_or_fallback(&client, request)),
        Err(err) => {
            tracing::warn!(error = %err, "failed to start async runtime");
            fallback_tasks(&request.text)
        }
    }
}
