//! Delete command: removes a single task.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use crate::Config;
use crate::commands::util::open_database;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Task ID or unique prefix.
    pub id: String,
}

pub fn run<W: Write>(writer: &mut W, args: &DeleteArgs, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    let mut state = db.load_state()?;
    let id = state.resolve_task(&args.id)?;
    let title = state
        .task(&id)
        .map(|task| task.title.clone())
        .unwrap_or_default();
    if !state.delete_task(&id) {
        bail!("task not found: {}", args.id);
    }
    db.save_state(&state)?;

    writeln!(writer, "Deleted: {title}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use kairos_core::{AppState, NewTask, TaskId};
    use kairos_db::Database;

    #[test]
    fn delete_removes_only_the_target() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("kairos.db"),
            api_key: None,
            model: None,
        };
        let mut db = Database::open(&config.database_path).unwrap();
        let mut state = AppState::default();
        state.add_tasks(
            vec![
                NewTask::title_only("A"),
                NewTask::title_only("B"),
                NewTask::title_only("C"),
            ],
            "2025-03-01T08:00:00Z".parse().unwrap(),
        );
        for (task, id) in state.tasks.iter_mut().zip(["a-1", "b-2", "c-3"]) {
            task.id = TaskId::new(id).unwrap();
        }
        db.save_state(&state).unwrap();

        let mut output = Vec::new();
        run(&mut output, &DeleteArgs { id: "b".to_string() }, &config).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Deleted: B\n");

        let titles: Vec<String> = db
            .load_state()
            .unwrap()
            .tasks
            .into_iter()
            .map(|task| task.title)
            .collect();
        assert_eq!(titles, ["A", "C"]);
    }

    #[test]
    fn delete_reports_missing_task() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("kairos.db"),
            api_key: None,
            model: None,
        };

        let err = run(&mut Vec::new(), &DeleteArgs { id: "x".to_string() }, &config).unwrap_err();
        assert!(err.to_string().contains("task not found"));
    }
}
