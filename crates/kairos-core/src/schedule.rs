//! Reconciliation of a task's duration and scheduled range.
//!
//! Whenever both are present, `end == start + duration (mod 24h)` must hold.
//! [`TimeSlot::apply`] restores that after a single-field edit and
//! [`TimeSlot::reconciled`] repairs pairs that arrive already inconsistent.

use crate::clock::{ClockTime, TaskDuration, TimeRange, compute_duration};

/// Duration assumed when a range is created for a task without one.
pub const DEFAULT_DURATION: TaskDuration = TaskDuration::ONE_HOUR;

/// A single user edit to a task's time fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeEdit {
    Start(ClockTime),
    End(ClockTime),
    Duration(TaskDuration),
}

/// The `(duration, scheduledFor)` pair of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSlot {
    pub duration: Option<TaskDuration>,
    pub scheduled_for: Option<TimeRange>,
}

impl TimeSlot {
    pub const fn new(duration: Option<TaskDuration>, scheduled_for: Option<TimeRange>) -> Self {
        Self {
            duration,
            scheduled_for,
        }
    }

    /// Applies one edit and recomputes the dependent field.
    ///
    /// | Edit | Result |
    /// |---|---|
    /// | start | keep duration (default 01:00), end = start + duration |
    /// | end, with range | keep start, duration = end - start |
    /// | end, no range | start at 12:00 AM, duration = end - start |
    /// | duration, with range | keep start, end = start + duration |
    /// | duration, no range | store duration only |
    #[must_use]
    pub fn apply(self, edit: TimeEdit) -> Self {
        let next = match (edit, self.scheduled_for) {
            (TimeEdit::Start(start), _) => {
                let duration = self.duration.unwrap_or(DEFAULT_DURATION);
                Self::new(Some(duration), Some(TimeRange::spanning(start, duration)))
            }
            (TimeEdit::End(end), range) => {
                let start = range.map_or(ClockTime::MIDNIGHT, |range| range.start);
                Self::new(
                    Some(compute_duration(start, end)),
                    Some(TimeRange::new(start, end)),
                )
            }
            (TimeEdit::Duration(duration), Some(range)) => Self::new(
                Some(duration),
                Some(TimeRange::spanning(range.start, duration)),
            ),
            (TimeEdit::Duration(duration), None) => Self::new(Some(duration), None),
        };
        tracing::debug!(?edit, before = ?self, after = ?next, "applied time edit");
        next
    }

    /// Returns the corrected slot if the end disagrees with start + duration.
    ///
    /// Duration wins: the end is recomputed from it.
    pub fn reconciled(self) -> Option<Self> {
        let (Some(duration), Some(range)) = (self.duration, self.scheduled_for) else {
            return None;
        };
        if range.is_consistent_with(duration) {
            return None;
        }
        let fixed = TimeRange::spanning(range.start, duration);
        tracing::debug!(stale = %range, fixed = %fixed, "reconciled inconsistent time range");
        Some(Self::new(Some(duration), Some(fixed)))
    }

    /// Whether the slot satisfies the start + duration = end invariant.
    pub fn is_consistent(self) -> bool {
        self.reconciled().is_none()
    }
}
