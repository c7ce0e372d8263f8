//! The application state container.
//!
//! [`AppState`] owns the task collection, the category preferences and the
//! theme flag. It is loaded by the top-level command, handed to whatever
//! needs it, and written back as a whole snapshot.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::clock::TaskDuration;
use crate::schedule::{TimeEdit, TimeSlot};
use crate::task::{
    CategoryPreference, FALLBACK_CATEGORY_COLOR, NewTask, Task, TaskCategory, TaskPriority,
    default_categories,
};
use crate::types::{CategoryId, TaskId, ValidationError, validate_hex_color};

/// Errors from state operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("task id {0} matches more than one task")]
    AmbiguousTask(String),

    #[error("category not found: {0}")]
    CategoryNotFound(String),

    #[error("category already exists: {0}")]
    DuplicateCategory(String),

    /// Built-in categories cannot be renamed or deleted.
    #[error("default category {name} cannot be {action}")]
    DefaultCategory { name: String, action: &'static str },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Completion totals and tasks grouped by the day they were created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHistory<'a> {
    pub completed_count: usize,
    /// Sum of the durations of completed tasks.
    pub total_time: TaskDuration,
    /// Newest day first.
    pub days: Vec<HistoryDay<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryDay<'a> {
    pub date: NaiveDate,
    /// Insertion order within the day.
    pub tasks: Vec<&'a Task>,
}

/// Tasks, category preferences and the theme flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub tasks: Vec<Task>,
    pub categories: Vec<CategoryPreference>,
    pub dark_mode: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            categories: default_categories(),
            dark_mode: false,
        }
    }
}

impl AppState {
    pub const fn new(
        tasks: Vec<Task>,
        categories: Vec<CategoryPreference>,
        dark_mode: bool,
    ) -> Self {
        Self {
            tasks,
            categories,
            dark_mode,
        }
    }

    // ========== Tasks ==========

    /// Commits a batch of accepted drafts, returning their new IDs in order.
    pub fn add_tasks(&mut self, tasks: Vec<NewTask>, now: DateTime<Utc>) -> Vec<TaskId> {
        let start = self.tasks.len();
        self.tasks
            .extend(tasks.into_iter().map(|new| Task::from_new(new, now)));
        let ids: Vec<TaskId> = self.tasks[start..]
            .iter()
            .map(|task| task.id.clone())
            .collect();
        tracing::debug!(count = ids.len(), "added tasks");
        ids
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    fn task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| &task.id == id)
    }

    /// Resolves a full task ID or a unique prefix of one.
    pub fn resolve_task(&self, key: &str) -> Result<TaskId, StateError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ValidationError::Empty { field: "task ID" }.into());
        }
        if let Some(task) = self.tasks.iter().find(|task| task.id.as_str() == key) {
            return Ok(task.id.clone());
        }
        let mut matches = self
            .tasks
            .iter()
            .filter(|task| task.id.as_str().starts_with(key));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task.id.clone()),
            (Some(_), Some(_)) => Err(StateError::AmbiguousTask(key.to_string())),
            (None, _) => Err(StateError::TaskNotFound(key.to_string())),
        }
    }

    pub fn set_title(&mut self, id: &TaskId, title: &str) -> Result<bool, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }
        Ok(self.task_mut(id).is_some_and(|task| {
            task.title = title.to_string();
            true
        }))
    }

    pub fn set_category(&mut self, id: &TaskId, category: TaskCategory) -> bool {
        self.task_mut(id).is_some_and(|task| {
            task.category = category;
            true
        })
    }

    pub fn set_priority(&mut self, id: &TaskId, priority: TaskPriority) -> bool {
        self.task_mut(id).is_some_and(|task| {
            task.priority = priority;
            true
        })
    }

    /// Flips completion, returning the new value.
    pub fn toggle_complete(&mut self, id: &TaskId) -> Option<bool> {
        let task = self.task_mut(id)?;
        task.completed = !task.completed;
        Some(task.completed)
    }

    /// Applies a time edit through the reconciliation rules.
    pub fn edit_time(&mut self, id: &TaskId, edit: TimeEdit) -> Option<TimeSlot> {
        let task = self.task_mut(id)?;
        let slot = task.time_slot().apply(edit);
        task.set_time_slot(slot);
        Some(slot)
    }

    /// Repairs a task whose range disagrees with its duration. Returns
    /// whether anything changed.
    pub fn reconcile_task(&mut self, id: &TaskId) -> bool {
        let Some(task) = self.task_mut(id) else {
            return false;
        };
        match task.time_slot().reconciled() {
            Some(fixed) => {
                tracing::info!(task = %task.id, "corrected inconsistent schedule");
                task.set_time_slot(fixed);
                true
            }
            None => false,
        }
    }

    /// Runs [`Self::reconcile_task`] over every task, returning how many
    /// were corrected.
    pub fn reconcile_all(&mut self) -> usize {
        let ids: Vec<TaskId> = self.tasks.iter().map(|task| task.id.clone()).collect();
        ids.iter().filter(|id| self.reconcile_task(id)).count()
    }

    /// Removes exactly the task with this ID, keeping the others in order.
    pub fn delete_task(&mut self, id: &TaskId) -> bool {
        let Some(index) = self.tasks.iter().position(|task| &task.id == id) else {
            return false;
        };
        self.tasks.remove(index);
        true
    }

    pub fn active_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| !task.completed)
    }

    pub fn completed_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| task.completed)
    }

    /// Builds the task history, bucketing tasks by their creation date in
    /// `tz`.
    pub fn history<Tz: TimeZone>(&self, tz: &Tz) -> TaskHistory<'_> {
        let completed: Vec<&Task> = self.completed_tasks().collect();
        let total_minutes = completed
            .iter()
            .filter_map(|task| task.duration)
            .map(TaskDuration::total_minutes)
            .sum();

        let mut days: Vec<HistoryDay<'_>> = Vec::new();
        for task in &self.tasks {
            let date = task.created_at.with_timezone(tz).date_naive();
            match days.iter_mut().find(|day| day.date == date) {
                Some(day) => day.tasks.push(task),
                None => days.push(HistoryDay {
                    date,
                    tasks: vec![task],
                }),
            }
        }
        days.sort_by(|a, b| b.date.cmp(&a.date));

        TaskHistory {
            completed_count: completed.len(),
            total_time: TaskDuration::from_minutes(total_minutes),
            days,
        }
    }

    // ========== Categories ==========

    /// Looks a category up by ID or case-insensitive name.
    pub fn find_category(&self, key: &str) -> Result<&CategoryPreference, StateError> {
        let key = key.trim();
        self.categories
            .iter()
            .find(|category| category.id.as_str() == key)
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|category| category.name.eq_ignore_ascii_case(key))
            })
            .ok_or_else(|| StateError::CategoryNotFound(key.to_string()))
    }

    fn category_index(&self, key: &str) -> Result<usize, StateError> {
        let id = self.find_category(key)?.id.clone();
        self.categories
            .iter()
            .position(|category| category.id == id)
            .ok_or_else(|| StateError::CategoryNotFound(key.to_string()))
    }

    fn ensure_unique_name(&self, name: &str, except: Option<&CategoryId>) -> Result<(), StateError> {
        let taken = self
            .categories
            .iter()
            .filter(|category| Some(&category.id) != except)
            .any(|category| category.name.eq_ignore_ascii_case(name));
        if taken {
            return Err(StateError::DuplicateCategory(name.to_string()));
        }
        Ok(())
    }

    pub fn add_category(&mut self, name: &str, color: &str) -> Result<CategoryId, StateError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty {
                field: "category name",
            }
            .into());
        }
        let color = validate_hex_color(color)?;
        self.ensure_unique_name(name, None)?;

        let id = CategoryId::generate();
        self.categories.push(CategoryPreference {
            id: id.clone(),
            name: name.to_string(),
            color,
            is_default: false,
        });
        tracing::debug!(%id, name, "added category");
        Ok(id)
    }

    /// Renames and/or recolors a category. Default categories keep their
    /// name but may change color.
    pub fn update_category(
        &mut self,
        key: &str,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<(), StateError> {
        let index = self.category_index(key)?;
        let color = color.map(validate_hex_color).transpose()?;
        let name = match name.map(str::trim) {
            Some("") => {
                return Err(ValidationError::Empty {
                    field: "category name",
                }
                .into());
            }
            Some(name) if name != self.categories[index].name => {
                let category = &self.categories[index];
                if category.is_default {
                    return Err(StateError::DefaultCategory {
                        name: category.name.clone(),
                        action: "renamed",
                    });
                }
                self.ensure_unique_name(name, Some(&category.id))?;
                Some(name.to_string())
            }
            _ => None,
        };

        let category = &mut self.categories[index];
        if let Some(name) = name {
            category.name = name;
        }
        if let Some(color) = color {
            category.color = color;
        }
        Ok(())
    }

    pub fn delete_category(&mut self, key: &str) -> Result<CategoryPreference, StateError> {
        let index = self.category_index(key)?;
        if self.categories[index].is_default {
            return Err(StateError::DefaultCategory {
                name: self.categories[index].name.clone(),
                action: "deleted",
            });
        }
        Ok(self.categories.remove(index))
    }

    /// Display color for a category name.
    pub fn category_color(&self, name: &str) -> &str {
        self.categories
            .iter()
            .find(|category| category.name == name)
            .map_or(FALLBACK_CATEGORY_COLOR, |category| category.color.as_str())
    }

    /// Number of tasks filed under each category preference, in order.
    pub fn category_usage(&self) -> Vec<(&CategoryPreference, usize)> {
        self.categories
            .iter()
            .map(|category| {
                let count = self
                    .tasks
                    .iter()
                    .filter(|task| task.category.name() == category.name)
                    .count();
                (category, count)
            })
            .collect()
    }

    // ========== Theme ==========

    pub const fn toggle_theme(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::clock::{ClockTime, TaskDuration, TimeRange};

    fn now() -> DateTime<Utc> {
        "2025-03-01T09:00:00Z".parse().unwrap()
    }

    fn state_with(titles: &[&str]) -> (AppState, Vec<TaskId>) {
        let mut state = AppState::default();
        let ids = state.add_tasks(
            titles.iter().map(|title| NewTask::title_only(*title)).collect(),
            now(),
        );
        (state, ids)
    }

    fn titles(state: &AppState) -> Vec<&str> {
        state.tasks.iter().map(|task| task.title.as_str()).collect()
    }

    #[test]
    fn add_tasks_applies_defaults() {
        let (state, ids) = state_with(&["buy milk"]);
        let task = state.task(&ids[0]).unwrap();
        assert_eq!(task.category, TaskCategory::Other);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(!task.completed);
        assert_eq!(task.progress, 0);
        assert_eq!(task.created_at, now());
    }

    #[test]
    fn add_tasks_inserts_batch_in_order() {
        let (mut state, _) = state_with(&["first"]);
        let ids = state.add_tasks(
            vec![NewTask::title_only("second"), NewTask::title_only("third")],
            now(),
        );
        assert_eq!(ids.len(), 2);
        assert_eq!(titles(&state), ["first", "second", "third"]);
    }

    #[test]
    fn delete_removes_exactly_one_and_keeps_order() {
        let (mut state, ids) = state_with(&["a", "b", "c", "d"]);
        assert!(state.delete_task(&ids[1]));
        assert_eq!(titles(&state), ["a", "c", "d"]);
        assert!(!state.delete_task(&ids[1]));
        assert_eq!(state.tasks.len(), 3);
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let (mut state, _) = state_with(&["a"]);
        let missing = TaskId::new("missing").unwrap();
        let before = state.clone();
        assert!(!state.set_category(&missing, TaskCategory::Work));
        assert!(state.toggle_complete(&missing).is_none());
        assert!(state.edit_time(&missing, TimeEdit::Duration(TaskDuration::ONE_HOUR)).is_none());
        assert!(!state.reconcile_task(&missing));
        assert_eq!(state, before);
    }

    #[test]
    fn resolve_task_accepts_unique_prefix() {
        let mut state = AppState::default();
        for id in ["abc123", "abd456"] {
            let mut task = Task::from_new(NewTask::title_only(id), now());
            task.id = TaskId::new(id).unwrap();
            state.tasks.push(task);
        }
        assert_eq!(state.resolve_task("abc").unwrap().as_str(), "abc123");
        assert_eq!(state.resolve_task("abd456").unwrap().as_str(), "abd456");
        assert_eq!(
            state.resolve_task("ab"),
            Err(StateError::AmbiguousTask("ab".to_string()))
        );
        assert_eq!(
            state.resolve_task("zz"),
            Err(StateError::TaskNotFound("zz".to_string()))
        );
    }

    #[test]
    fn toggle_complete_partitions_tasks() {
        let (mut state, ids) = state_with(&["a", "b"]);
        assert_eq!(state.toggle_complete(&ids[0]), Some(true));
        let active: Vec<_> = state.active_tasks().map(|t| t.title.as_str()).collect();
        let done: Vec<_> = state.completed_tasks().map(|t| t.title.as_str()).collect();
        assert_eq!(active, ["b"]);
        assert_eq!(done, ["a"]);
        assert_eq!(state.toggle_complete(&ids[0]), Some(false));
    }

    #[test]
    fn set_title_rejects_blank() {
        let (mut state, ids) = state_with(&["a"]);
        assert!(state.set_title(&ids[0], "  ").is_err());
        assert_eq!(state.set_title(&ids[0], " renamed "), Ok(true));
        assert_eq!(titles(&state), ["renamed"]);
    }

    #[test]
    fn edit_time_routes_through_reconciliation() {
        let (mut state, ids) = state_with(&["focus"]);
        let start: ClockTime = "9:00 AM".parse().unwrap();
        state.edit_time(&ids[0], TimeEdit::Start(start));
        state.edit_time(&ids[0], TimeEdit::Duration("02:30".parse().unwrap()));
        let task = state.task(&ids[0]).unwrap();
        assert_eq!(task.scheduled_for.unwrap().to_string(), "9:00 AM - 11:30 AM");

        state.edit_time(&ids[0], TimeEdit::End("10:00 AM".parse().unwrap()));
        let task = state.task(&ids[0]).unwrap();
        assert_eq!(task.duration.unwrap().to_string(), "01:00");
        assert_eq!(task.scheduled_for.unwrap().start, start);
    }

    #[test]
    fn reconcile_all_counts_corrections() {
        let (mut state, ids) = state_with(&["a", "b"]);
        state.tasks[0].duration = Some("06:00".parse().unwrap());
        state.tasks[0].scheduled_for = Some("12:00 AM - 5:00 AM".parse().unwrap());
        state.tasks[1].duration = Some("01:00".parse().unwrap());
        state.tasks[1].scheduled_for = Some("9:00 AM - 10:00 AM".parse().unwrap());

        assert_eq!(state.reconcile_all(), 1);
        let fixed: TimeRange = "12:00 AM - 6:00 AM".parse().unwrap();
        assert_eq!(state.task(&ids[0]).unwrap().scheduled_for, Some(fixed));
        assert_eq!(state.reconcile_all(), 0);
    }

    #[test]
    fn add_category_validates() {
        let mut state = AppState::default();
        let id = state.add_category("Errands", "#9B59B6").unwrap();
        assert!(!state.find_category(id.as_str()).unwrap().is_default);
        assert_eq!(state.category_color("Errands"), "#9B59B6");
        assert!(matches!(
            state.add_category("errands", "#000000"),
            Err(StateError::DuplicateCategory(_))
        ));
        assert!(matches!(
            state.add_category("", "#000000"),
            Err(StateError::Invalid(ValidationError::Empty { .. }))
        ));
        assert!(matches!(
            state.add_category("Garden", "green"),
            Err(StateError::Invalid(ValidationError::InvalidColor { .. }))
        ));
    }

    #[test]
    fn default_categories_cannot_be_renamed_or_deleted() {
        let mut state = AppState::default();
        assert!(matches!(
            state.update_category("work", Some("Job"), None),
            Err(StateError::DefaultCategory { action: "renamed", .. })
        ));
        assert!(matches!(
            state.delete_category("Work"),
            Err(StateError::DefaultCategory { action: "deleted", .. })
        ));
        state.update_category("Work", None, Some("#000000")).unwrap();
        assert_eq!(state.category_color("Work"), "#000000");
        state.update_category("Work", Some("Work"), None).unwrap();
    }

    #[test]
    fn custom_categories_can_be_renamed_and_deleted() {
        let mut state = AppState::default();
        state.add_category("Errands", "#9B59B6").unwrap();
        state.update_category("errands", Some("Chores"), None).unwrap();
        assert!(state.find_category("Chores").is_ok());
        let removed = state.delete_category("Chores").unwrap();
        assert_eq!(removed.name, "Chores");
        assert_eq!(state.categories.len(), 5);
        assert_eq!(state.category_color("Chores"), FALLBACK_CATEGORY_COLOR);
    }

    #[test]
    fn category_usage_counts_tasks() {
        let (mut state, ids) = state_with(&["a", "b"]);
        state.set_category(&ids[0], TaskCategory::Work);
        let usage = state.category_usage();
        let work = usage.iter().find(|(c, _)| c.name == "Work").unwrap();
        let other = usage.iter().find(|(c, _)| c.name == "Other").unwrap();
        assert_eq!(work.1, 1);
        assert_eq!(other.1, 1);
    }

    #[test]
    fn history_totals_completed_work() {
        let mut state = AppState::default();
        let ids = state.add_tasks(
            vec![
                NewTask {
                    duration: Some(TaskDuration::new(1, 30).unwrap()),
                    ..NewTask::title_only("gym")
                },
                NewTask {
                    duration: Some(TaskDuration::new(0, 45).unwrap()),
                    ..NewTask::title_only("read")
                },
                NewTask {
                    duration: Some(TaskDuration::new(3, 0).unwrap()),
                    ..NewTask::title_only("still open")
                },
                NewTask::title_only("no duration"),
            ],
            now(),
        );
        for id in [&ids[0], &ids[1], &ids[3]] {
            state.toggle_complete(id);
        }

        let history = state.history(&Utc);
        assert_eq!(history.completed_count, 3);
        assert_eq!(history.total_time.label(), "2h 15m");
    }

    #[test]
    fn history_groups_by_creation_day_newest_first() {
        let mut state = AppState::default();
        let day_one = "2025-03-01T09:00:00Z".parse().unwrap();
        let day_two = "2025-03-02T23:30:00Z".parse().unwrap();
        state.add_tasks(vec![NewTask::title_only("a")], day_one);
        state.add_tasks(vec![NewTask::title_only("b")], day_two);
        state.add_tasks(vec![NewTask::title_only("c")], day_one);

        let history = state.history(&Utc);
        let days: Vec<(String, Vec<&str>)> = history
            .days
            .iter()
            .map(|day| {
                (
                    day.date.to_string(),
                    day.tasks.iter().map(|task| task.title.as_str()).collect(),
                )
            })
            .collect();
        assert_eq!(
            days,
            vec![
                ("2025-03-02".to_string(), vec!["b"]),
                ("2025-03-01".to_string(), vec!["a", "c"]),
            ]
        );
        assert_eq!(history.completed_count, 0);
        assert_eq!(history.total_time, TaskDuration::ZERO);
    }

    #[test]
    fn history_uses_the_given_time_zone() {
        let mut state = AppState::default();
        state.add_tasks(
            vec![NewTask::title_only("late")],
            "2025-03-02T23:30:00Z".parse().unwrap(),
        );
        let tokyo = chrono::FixedOffset::east_opt(9 * 3600).unwrap();
        let history = state.history(&tokyo);
        assert_eq!(history.days[0].date.to_string(), "2025-03-03");
    }

    #[test]
    fn toggle_theme_flips_flag() {
        let mut state = AppState::default();
        assert!(state.toggle_theme());
        assert!(!state.toggle_theme());
    }
}
