//! Calendar command: exports a task as a Google Calendar link or `.ics` file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::Args;

use kairos_core::calendar::{google_calendar_url, ics_document, ics_file_name};

use crate::Config;
use crate::commands::util::{load_task_for_edit, open_database};

#[derive(Debug, Args)]
pub struct CalendarArgs {
    /// Task ID or unique prefix.
    pub id: String,

    /// Write an .ics file instead of printing a Google Calendar link.
    #[arg(long)]
    pub ics: bool,

    /// Where to write the .ics file. Defaults to a name derived from the title.
    #[arg(short, long, requires = "ics")]
    pub output: Option<PathBuf>,
}

pub fn run<W: Write>(writer: &mut W, args: &CalendarArgs, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    let (state, id) = load_task_for_edit(&mut db, &args.id)?;
    let Some(task) = state.task(&id) else {
        bail!("task not found: {}", args.id);
    };
    let date = Local::now().date_naive();

    if args.ics {
        let path = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(ics_file_name(&task.title)));
        std::fs::write(&path, ics_document(task, date))
            .with_context(|| format!("failed to write {}", path.display()))?;
        writeln!(writer, "Wrote {}", path.display())?;
    } else {
        writeln!(writer, "{}", google_calendar_url(task, date))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use kairos_core::{AppState, NewTask};
    use kairos_db::Database;

    fn setup(temp: &tempfile::TempDir) -> (Config, String) {
        let config = Config {
            database_path: temp.path().join("kairos.db"),
            api_key: None,
            model: None,
        };
        let mut db = Database::open(&config.database_path).unwrap();
        let mut state = AppState::default();
        let ids = state.add_tasks(
            vec![NewTask {
                duration: Some("01:30".parse().unwrap()),
                scheduled_for: Some("2:00 PM - 3:30 PM".parse().unwrap()),
                ..NewTask::title_only("Team sync")
            }],
            "2025-03-01T08:00:00Z".parse().unwrap(),
        );
        db.save_state(&state).unwrap();
        (config, ids[0].to_string())
    }

    #[test]
    fn prints_google_calendar_link() {
        let temp = tempfile::tempdir().unwrap();
        let (config, id) = setup(&temp);
        let args = CalendarArgs {
            id,
            ics: false,
            output: None,
        };

        let mut output = Vec::new();
        run(&mut output, &args, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("https://calendar.google.com/calendar/render?action=TEMPLATE"));
        assert!(output.contains("text=Team+sync"));
        assert!(output.contains("T140000%2F"));
        assert!(output.contains("T153000"));
    }

    #[test]
    fn writes_ics_file() {
        let temp = tempfile::tempdir().unwrap();
        let (config, id) = setup(&temp);
        let path = temp.path().join("sync.ics");
        let args = CalendarArgs {
            id,
            ics: true,
            output: Some(path.clone()),
        };

        let mut output = Vec::new();
        run(&mut output, &args, &config).unwrap();

        let document = std::fs::read_to_string(&path).unwrap();
        assert!(document.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(document.contains("SUMMARY:Team sync\r\n"));
        assert!(document.contains("T140000\r\n"));
        assert_eq!(
            String::from_utf8(output).unwrap(),
            format!("Wrote {}\n", path.display())
        );
    }
}
