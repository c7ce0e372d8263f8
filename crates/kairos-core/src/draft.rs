//! Draft tasks returned by the extraction service and the rules that turn
//! them into tasks ready for state.
//!
//! Extraction never blocks task creation: an empty answer degrades to a
//! single task titled with the raw input, and callers do the same when the
//! service itself fails (see [`fallback_tasks`]).

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::clock::{ClockTime, MINUTES_PER_DAY, TaskDuration, TimeRange};
use crate::schedule::DEFAULT_DURATION;
use crate::task::{NewTask, TaskCategory, TaskPriority};

/// Granularity used when picking automatic start times.
const AUTO_SCHEDULE_STEP_MINUTES: u32 = 15;

/// What the extraction service is asked to structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub text: String,
    /// Whether the service (and [`auto_schedule`]) should assign times to
    /// tasks that do not mention one.
    pub auto_assign_time: bool,
    /// Local wall-clock reference for relative scheduling.
    pub now: NaiveDateTime,
}

impl ExtractionRequest {
    pub fn new(text: impl Into<String>, auto_assign_time: bool, now: NaiveDateTime) -> Self {
        Self {
            text: text.into().trim().to_string(),
            auto_assign_time,
            now,
        }
    }
}

/// An unvalidated task-shaped record from the extraction service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftTask {
    #[serde(default)]
    pub task_title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub scheduled_for: Option<String>,
}

/// The shapes the extraction service may answer with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExtractionResponse {
    /// `{"tasks": [...]}`
    Batch { tasks: Vec<DraftTask> },
    /// `[...]`
    List(Vec<DraftTask>),
    /// A single bare draft (legacy shape).
    Single(DraftTask),
}

impl ExtractionResponse {
    /// Normalizes every shape to an ordered list of drafts.
    pub fn into_drafts(self) -> Vec<DraftTask> {
        match self {
            Self::Batch { tasks } | Self::List(tasks) => tasks,
            Self::Single(draft) => vec![draft],
        }
    }
}

/// The single title-only task used whenever extraction yields nothing.
pub fn fallback_tasks(raw_text: &str) -> Vec<NewTask> {
    vec![NewTask::title_only(raw_text.trim())]
}

/// Applies defaulting and validation to every draft.
///
/// - a blank title falls back to the raw input
/// - a missing or malformed duration becomes `01:00`
/// - a scheduled range has its end recomputed from start + duration
/// - unknown priorities are dropped
/// - zero drafts produce [`fallback_tasks`]
pub fn finalize_drafts(request: &ExtractionRequest, drafts: Vec<DraftTask>) -> Vec<NewTask> {
    if drafts.is_empty() {
        tracing::debug!("extraction returned no tasks, using raw text");
        return fallback_tasks(&request.text);
    }

    let mut tasks: Vec<NewTask> = drafts
        .into_iter()
        .map(|draft| accept_draft(&request.text, draft))
        .collect();

    if request.auto_assign_time {
        auto_schedule(&mut tasks, request.now.time());
    }
    tasks
}

fn accept_draft(raw_text: &str, draft: DraftTask) -> NewTask {
    let title = match draft.task_title.trim() {
        "" => raw_text.trim().to_string(),
        title => title.to_string(),
    };

    let category = draft
        .category
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(TaskCategory::from_name);

    let priority = draft.priority.as_deref().and_then(|value| {
        value
            .parse::<TaskPriority>()
            .inspect_err(|err| tracing::warn!(%err, "dropping extracted priority"))
            .ok()
    });

    let duration = draft
        .duration
        .as_deref()
        .and_then(|value| {
            value
                .parse::<TaskDuration>()
                .inspect_err(|err| tracing::warn!(%err, "dropping extracted duration"))
                .ok()
        })
        .unwrap_or(DEFAULT_DURATION);

    let scheduled_for = draft
        .scheduled_for
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            let extracted = TimeRange::parse_lenient(value);
            let fixed = TimeRange::spanning(extracted.start, duration);
            if fixed != extracted {
                tracing::debug!(%extracted, %fixed, "corrected extracted time range");
            }
            fixed
        });

    NewTask {
        title,
        category,
        priority,
        duration: Some(duration),
        scheduled_for,
    }
}

/// Assigns back-to-back ranges to tasks that have none.
///
/// Placement starts at the first quarter hour strictly after `now`, or after
/// the latest same-day end among tasks that are already scheduled, whichever
/// is later. Tasks without a duration get [`DEFAULT_DURATION`].
pub fn auto_schedule(tasks: &mut [NewTask], now: NaiveTime) {
    let now_minutes = now.hour() * 60 + now.minute();
    let next_slot = (now_minutes / AUTO_SCHEDULE_STEP_MINUTES + 1) * AUTO_SCHEDULE_STEP_MINUTES;

    let latest_end = tasks
        .iter()
        .filter_map(|task| task.scheduled_for)
        .filter(|range| !range.crosses_midnight())
        .map(|range| range.end.minutes_since_midnight())
        .max()
        .unwrap_or(0);

    let mut cursor = next_slot.max(latest_end);
    for task in tasks.iter_mut().filter(|task| task.scheduled_for.is_none()) {
        let duration = *task.duration.get_or_insert(DEFAULT_DURATION);
        let start = ClockTime::from_minutes_wrapping(cursor);
        let range = TimeRange::spanning(start, duration);
        tracing::debug!(title = %task.title, %range, "auto-scheduled task");
        task.scheduled_for = Some(range);
        cursor = (cursor + duration.total_minutes()) % MINUTES_PER_DAY;
    }
}
