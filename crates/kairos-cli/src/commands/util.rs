//! Shared utilities for CLI commands.

use anyhow::{Context, Result};
use kairos_core::{AppState, Task, TaskId};
use kairos_db::Database;

use crate::Config;

/// Opens the configured database, creating its directory if needed.
pub fn open_database(config: &Config) -> Result<Database> {
    if let Some(parent) = config
        .database_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

/// Loads state and resolves `key` to a task.
///
/// The task's time fields are reconciled before anything edits them, and a
/// correction is written back immediately.
pub fn load_task_for_edit(db: &mut Database, key: &str) -> Result<(AppState, TaskId)> {
    let mut state = db.load_state()?;
    let id = state.resolve_task(key)?;
    if state.reconcile_task(&id) {
        db.save_state(&state)?;
    }
    Ok((state, id))
}

/// One-line rendering of a task used by every command.
pub fn format_task_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    let duration = task
        .duration
        .map_or_else(|| "--:--".to_string(), |duration| duration.to_string());
    let scheduled = task
        .scheduled_for
        .map_or_else(|| "unscheduled".to_string(), |range| range.to_string());
    format!(
        "[{mark}] {:<8}  {:<6}  {:<10}  {:>5}  {:<19}  {}",
        task.id.short(),
        task.priority.as_str(),
        task.category.name(),
        duration,
        scheduled,
        task.title
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use kairos_core::{NewTask, TaskCategory, TaskPriority};

    fn task() -> Task {
        let mut task = Task::from_new(
            NewTask {
                title: "Design landing page".to_string(),
                category: Some(TaskCategory::Work),
                priority: Some(TaskPriority::High),
                duration: Some("02:00".parse().unwrap()),
                scheduled_for: Some("9:00 AM - 11:00 AM".parse().unwrap()),
            },
            "2025-03-01T09:00:00Z".parse().unwrap(),
        );
        task.id = TaskId::new("1a2b3c4d-0000").unwrap();
        task
    }

    #[test]
    fn task_line_shows_all_fields() {
        assert_eq!(
            format_task_line(&task()),
            "[ ] 1a2b3c4d  High    Work        02:00  9:00 AM - 11:00 AM   Design landing page"
        );
    }

    #[test]
    fn task_line_marks_missing_times() {
        let mut task = task();
        task.duration = None;
        task.scheduled_for = None;
        task.completed = true;
        assert_eq!(
            format_task_line(&task),
            "[x] 1a2b3c4d  High    Work        --:--  unscheduled          Design landing page"
        );
    }

    #[test]
    fn load_task_for_edit_persists_reconciliation() {
        let temp = tempfile::tempdir().unwrap();
        let mut db = Database::open(&temp.path().join("kairos.db")).unwrap();
        let mut state = AppState::default();
        let mut stale = task();
        stale.duration = Some("06:00".parse().unwrap());
        stale.scheduled_for = Some("12:00 AM - 5:00 AM".parse().unwrap());
        state.tasks.push(stale);
        db.save_state(&state).unwrap();

        let (state, id) = load_task_for_edit(&mut db, "1a2b").unwrap();
        assert_eq!(id.as_str(), "1a2b3c4d-0000");
        assert_eq!(
            state.task(&id).unwrap().scheduled_for.unwrap().to_string(),
            "12:00 AM - 6:00 AM"
        );

        let reloaded = db.load_state().unwrap();
        assert_eq!(reloaded, state);
    }

    #[test]
    fn load_task_for_edit_reports_missing_task() {
        let mut db = Database::open_in_memory().unwrap();
        let err = load_task_for_edit(&mut db, "nope").unwrap_err();
        assert!(err.to_string().contains("task not found"));
    }
}
