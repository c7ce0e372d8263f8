//! Edit command: changes a task's title, category or priority.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use kairos_core::{TaskCategory, TaskPriority};

use crate::Config;
use crate::commands::util::{format_task_line, load_task_for_edit, open_database};

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Task ID or unique prefix.
    pub id: String,

    /// New title.
    #[arg(long)]
    pub title: Option<String>,

    /// Category name; must match a configured category.
    #[arg(long)]
    pub category: Option<String>,

    /// Low, Medium or High.
    #[arg(long)]
    pub priority: Option<TaskPriority>,
}

pub fn run<W: Write>(writer: &mut W, args: &EditArgs, config: &Config) -> Result<()> {
    if args.title.is_none() && args.category.is_none() && args.priority.is_none() {
        bail!("nothing to change: pass --title, --category or --priority");
    }

    let mut db = open_database(config)?;
    let (mut state, id) = load_task_for_edit(&mut db, &args.id)?;

    if let Some(title) = &args.title {
        state.set_title(&id, title)?;
    }
    if let Some(category) = &args.category {
        let name = state.find_category(category)?.name.clone();
        state.set_category(&id, TaskCategory::from_name(&name));
    }
    if let Some(priority) = args.priority {
        state.set_priority(&id, priority);
    }
    db.save_state(&state)?;

    if let Some(task) = state.task(&id) {
        writeln!(writer, "Updated: {}", format_task_line(task))?;
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
        state.add_category("Errands", "#a29bfe").unwrap();
        let ids = state.add_tasks(
            vec![NewTask::title_only("post office")],
            "2025-03-01T08:00:00Z".parse().unwrap(),
        );
        db.save_state(&state).unwrap();
        (config, ids[0].to_string())
    }

    fn args(id: &str) -> EditArgs {
        EditArgs {
            id: id.to_string(),
            title: None,
            category: None,
            priority: None,
        }
    }

    #[test]
    fn edit_updates_fields() {
        let temp = tempfile::tempdir().unwrap();
        let (config, id) = setup(&temp);
        let args = EditArgs {
            title: Some("Post office run".to_string()),
            category: Some("errands".to_string()),
            priority: Some(TaskPriority::High),
            ..args(&id)
        };

        run(&mut Vec::new(), &args, &config).unwrap();

        let state = Database::open(&config.database_path)
            .unwrap()
            .load_state()
            .unwrap();
        let task = &state.tasks[0];
        assert_eq!(task.title, "Post office run");
        assert_eq!(task.category, TaskCategory::Custom("Errands".to_string()));
        assert_eq!(task.priority, TaskPriority::High);
    }

    #[test]
    fn edit_requires_a_change() {
        let temp = tempfile::tempdir().unwrap();
        let (config, id) = setup(&temp);
        let err = run(&mut Vec::new(), &args(&id), &config).unwrap_err();
        assert!(err.to_string().contains("nothing to change"));
    }

    #[test]
    fn edit_rejects_unknown_category() {
        let temp = tempfile::tempdir().unwrap();
        let (config, id) = setup(&temp);
        let args = EditArgs {
            category: Some("Hobbies".to_string()),
            ..args(&id)
        };
        let err = run(&mut Vec::new(), &args, &config).unwrap_err();
        assert!(err.to_string().contains("category not found"));
    }

    #[test]
    fn edit_rejects_blank_title() {
        let temp = tempfile::tempdir().unwrap();
        let (config, id) = setup(&temp);
        let args = EditArgs {
            title: Some("  ".to_string()),
            ..args(&id)
        };
        let err = run(&mut Vec::new(), &args, &config).unwrap_err();
        assert!(err.to_string().contains("title cannot be empty"));
    }
}
