//! Core domain logic for the Kairos task manager.
//!
//! This crate contains the fundamental types and logic for:
//! - Clock arithmetic: 12-hour times, `HH:MM` durations and time ranges
//! - Schedule reconciliation: keeping start + duration = end after edits
//! - Draft acceptance: defaulting and validating extracted tasks
//! - Calendar export: Google Calendar links and `.ics` documents
//! - Application state: the task and category collections

pub mod calendar;
pub mod clock;
pub mod draft;
pub mod schedule;
pub mod state;
pub mod task;
mod types;

pub use clock::{
    ClockTime, TaskDuration, TimeParseError, TimeRange, compute_duration, compute_end_time,
    format_clock_time, parse_clock_time, parse_duration,
};
pub use draft::{
    DraftTask, ExtractionRequest, ExtractionResponse, auto_schedule, fallback_tasks,
    finalize_drafts,
};
pub use schedule::{DEFAULT_DURATION, TimeEdit, TimeSlot};
pub use state::{AppState, HistoryDay, StateError, TaskHistory};
pub use task::{
    CategoryPreference, FALLBACK_CATEGORY_COLOR, NewTask, PALETTE, Task, TaskCategory,
    TaskPriority, default_categories,
};
pub use types::{CategoryId, SHORT_ID_LEN, TaskId, ValidationError, validate_hex_color};
