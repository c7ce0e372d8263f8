//! History command: completion totals and every task grouped by day.

use std::io::Write;

use anyhow::Result;
use chrono::Local;
use clap::Args;

use kairos_core::TaskHistory;

use crate::Config;
use crate::commands::util::open_database;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &HistoryArgs, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let state = db.load_state()?;
    let history = state.history(&Local);

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&history)?)?;
    } else {
        write!(writer, "{}", format_history(&history))?;
    }
    Ok(())
}

/// Renders totals followed by one section per creation day.
pub fn format_history(history: &TaskHistory<'_>) -> String {
    let mut output = format!(
        "Completed tasks: {}\nTotal time: {}\n",
        history.completed_count,
        history.total_time.label()
    );

    for day in &history.days {
        output.push_str(&format!("\n{}\n", day.date.format("%B %-d, %Y")));
        for task in &day.tasks {
            let mark = if task.completed { "x" } else { " " };
            output.push_str(&format!("  [{mark}] {}", task.title));
            if let Some(duration) = task.duration.filter(|_| task.completed) {
                output.push_str(&format!("  {duration}"));
            }
            output.push('\n');
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use insta::assert_snapshot;
    use kairos_core::{AppState, NewTask};
    use kairos_db::Database;

    fn state() -> AppState {
        let mut state = AppState::default();
        let ids = state.add_tasks(
            vec![
                NewTask {
                    duration: Some("01:30".parse().unwrap()),
                    ..NewTask::title_only("Gym")
                },
                NewTask {
                    duration: Some("02:00".parse().unwrap()),
                    ..NewTask::title_only("Write report")
                },
            ],
            "2025-03-01T09:00:00Z".parse().unwrap(),
        );
        state.add_tasks(
            vec![NewTask {
                duration: Some("00:45".parse().unwrap()),
                ..NewTask::title_only("Read")
            }],
            "2025-03-02T09:00:00Z".parse().unwrap(),
        );
        state.toggle_complete(&ids[0]);
        state
    }

    #[test]
    fn history_lists_days_newest_first() {
        let state = state();
        assert_snapshot!(format_history(&state.history(&Utc)).trim_end(), @r"
        Completed tasks: 1
        Total time: 1h 30m

        March 2, 2025
          [ ] Read

        March 1, 2025
          [x] Gym  01:30
          [ ] Write report
        ");
    }

    #[test]
    fn empty_history_shows_zero_totals() {
        let state = AppState::default();
        assert_eq!(
            format_history(&state.history(&Utc)),
            "Completed tasks: 0\nTotal time: 0h 0m\n"
        );
    }

    #[test]
    fn history_json_reports_totals() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("kairos.db"),
            api_key: None,
            model: None,
        };
        let mut db = Database::open(&config.database_path).unwrap();
        db.save_state(&state()).unwrap();

        let mut output = Vec::new();
        run(&mut output, &HistoryArgs { json: true }, &config).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["completedCount"], 1);
        assert_eq!(value["totalTime"], "01:30");
        assert_eq!(value["days"].as_array().unwrap().len(), 2);
    }
}
