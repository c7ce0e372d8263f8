//! Clock times, durations and time ranges.
//!
//! Values are kept as integer minutes internally and only rendered to the
//! `H:MM AM`, `HH:MM` and `<start> - <end>` strings at the boundary. All
//! arithmetic is confined to a single day: adding a duration to a clock time
//! wraps modulo 24 hours, and the number of carried days is reported
//! separately so callers that care (calendar export) can recover it.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// `H:MM` with an optional `AM`/`PM` marker.
static CLOCK_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s*([AP]M)?$").unwrap());

/// `HH:MM` with any number of hours.
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3}):(\d{2})$").unwrap());

/// Errors from strict time parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    /// The input did not have the expected shape.
    #[error("malformed {kind}: {input:?}")]
    Malformed { kind: &'static str, input: String },

    /// The hour was outside the allowed range for the notation used.
    #[error("hour out of range: {hour}")]
    HourOutOfRange { hour: u32 },

    /// The minute was outside 0..=59.
    #[error("minute out of range: {minute}")]
    MinuteOutOfRange { minute: u32 },
}

/// A wall-clock time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockTime {
    minutes: u32,
}

impl ClockTime {
    /// 12:00 AM.
    pub const MIDNIGHT: Self = Self { minutes: 0 };

    /// Creates a clock time from a 24-hour hour and a minute.
    pub const fn new(hour24: u32, minute: u32) -> Result<Self, TimeParseError> {
        if hour24 > 23 {
            return Err(TimeParseError::HourOutOfRange { hour: hour24 });
        }
        if minute > 59 {
            return Err(TimeParseError::MinuteOutOfRange { minute });
        }
        Ok(Self {
            minutes: hour24 * 60 + minute,
        })
    }

    /// Creates a clock time from minutes since midnight, wrapping past 24h.
    pub const fn from_minutes_wrapping(minutes: u32) -> Self {
        Self {
            minutes: minutes % MINUTES_PER_DAY,
        }
    }

    /// Hour in 24-hour notation (0..=23).
    pub const fn hour24(self) -> u32 {
        self.minutes / 60
    }

    /// Minute of the hour (0..=59).
    pub const fn minute(self) -> u32 {
        self.minutes % 60
    }

    /// Minutes since midnight.
    pub const fn minutes_since_midnight(self) -> u32 {
        self.minutes
    }

    /// Adds a duration, returning the wrapped time and the number of
    /// midnights crossed.
    pub const fn add_duration(self, duration: TaskDuration) -> (Self, u32) {
        let total = self.minutes + duration.total_minutes();
        (
            Self::from_minutes_wrapping(total),
            total / MINUTES_PER_DAY,
        )
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hour = self.hour24();
        let display_hour = match hour {
            0 => 12,
            13..=23 => hour - 12,
            _ => hour,
        };
        let meridiem = if hour >= 12 { "PM" } else { "AM" };
        write!(f, "{display_hour}:{:02} {meridiem}", self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = TimeParseError;

    /// Parses `H:MM AM|PM` (case-insensitive, optional space before the
    /// marker) or 24-hour `HH:MM` without a marker.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let Some(caps) = CLOCK_TIME_RE.captures(trimmed) else {
            return Err(TimeParseError::Malformed {
                kind: "clock time",
                input: s.to_string(),
            });
        };

        let hour: u32 = caps[1].parse().map_err(|_| TimeParseError::Malformed {
            kind: "clock time",
            input: s.to_string(),
        })?;
        let minute: u32 = caps[2].parse().map_err(|_| TimeParseError::Malformed {
            kind: "clock time",
            input: s.to_string(),
        })?;

        let hour24 = match caps.get(3).map(|m| m.as_str().to_ascii_uppercase()) {
            Some(meridiem) => {
                if !(1..=12).contains(&hour) {
                    return Err(TimeParseError::HourOutOfRange { hour });
                }
                match (meridiem.as_str(), hour) {
                    ("AM", 12) => 0,
                    ("PM", 12) | ("AM", _) => hour,
                    _ => hour + 12,
                }
            }
            None => hour,
        };

        Self::new(hour24, minute)
    }
}

/// A task duration with minute precision, rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TaskDuration {
    minutes: u32,
}

impl TaskDuration {
    /// `00:00`.
    pub const ZERO: Self = Self { minutes: 0 };

    /// `01:00`, the duration assumed whenever none is known.
    pub const ONE_HOUR: Self = Self { minutes: 60 };

    /// Creates a duration from hours and minutes.
    pub const fn new(hours: u32, minutes: u32) -> Result<Self, TimeParseError> {
        if minutes > 59 {
            return Err(TimeParseError::MinuteOutOfRange { minute: minutes });
        }
        Ok(Self {
            minutes: hours * 60 + minutes,
        })
    }

    /// Creates a duration from a total number of minutes.
    pub const fn from_minutes(minutes: u32) -> Self {
        Self { minutes }
    }

    /// Whole hours.
    pub const fn hours(self) -> u32 {
        self.minutes / 60
    }

    /// Minutes past the whole hours (0..=59).
    pub const fn minutes(self) -> u32 {
        self.minutes % 60
    }

    /// Total length in minutes.
    pub const fn total_minutes(self) -> u32 {
        self.minutes
    }

    /// Human label such as `1h 30m`.
    pub fn label(self) -> String {
        format!("{}h {}m", self.hours(), self.minutes())
    }
}

impl fmt::Display for TaskDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours(), self.minutes())
    }
}

impl FromStr for TaskDuration {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let malformed = || TimeParseError::Malformed {
            kind: "duration",
            input: s.to_string(),
        };
        let caps = DURATION_RE.captures(trimmed).ok_or_else(malformed)?;
        let hours: u32 = caps[1].parse().map_err(|_| malformed())?;
        let minutes: u32 = caps[2].parse().map_err(|_| malformed())?;
        Self::new(hours, minutes)
    }
}

impl From<String> for TaskDuration {
    fn from(value: String) -> Self {
        parse_duration(&value)
    }
}

impl From<TaskDuration> for String {
    fn from(duration: TaskDuration) -> Self {
        duration.to_string()
    }
}

/// A scheduled time range, rendered as `"<start> - <end>"`.
///
/// The range may be inconsistent with a task's duration when it comes from
/// storage or from the extraction service; see [`crate::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TimeRange {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeRange {
    pub const fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    /// A range starting at `start` and lasting `duration`.
    pub const fn spanning(start: ClockTime, duration: TaskDuration) -> Self {
        Self {
            start,
            end: compute_end_time(start, duration),
        }
    }

    /// Length of the range, treating an end before the start as next day.
    pub const fn duration(self) -> TaskDuration {
        compute_duration(self.start, self.end)
    }

    /// Whether the end falls on the following day.
    pub fn crosses_midnight(self) -> bool {
        self.end < self.start
    }

    /// Whether `end == start + duration (mod 24h)`.
    pub fn is_consistent_with(self, duration: TaskDuration) -> bool {
        self.end == compute_end_time(self.start, duration)
    }

    /// Lenient parse used for stored and extracted values.
    ///
    /// A missing end collapses to the start; malformed sides degrade to
    /// midnight.
    pub fn parse_lenient(s: &str) -> Self {
        match s.split_once('-') {
            Some((start, end)) => Self {
                start: parse_clock_time(start),
                end: parse_clock_time(end),
            },
            None => {
                tracing::warn!(input = s, "time range has no end, collapsing to start");
                let start = parse_clock_time(s);
                Self { start, end: start }
            }
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

impl FromStr for TimeRange {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s.split_once('-').ok_or_else(|| TimeParseError::Malformed {
            kind: "time range",
            input: s.to_string(),
        })?;
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
        })
    }
}

impl From<String> for TimeRange {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<TimeRange> for String {
    fn from(range: TimeRange) -> Self {
        range.to_string()
    }
}

/// Parses a 12-hour clock time, degrading to midnight on malformed input.
pub fn parse_clock_time(s: &str) -> ClockTime {
    s.parse().unwrap_or_else(|err: TimeParseError| {
        tracing::warn!(input = s, error = %err, "malformed clock time, using 12:00 AM");
        ClockTime::MIDNIGHT
    })
}

/// Parses an `HH:MM` duration, degrading to `00:00` on malformed input.
pub fn parse_duration(s: &str) -> TaskDuration {
    s.parse().unwrap_or_else(|err: TimeParseError| {
        tracing::warn!(input = s, error = %err, "malformed duration, using 00:00");
        TaskDuration::ZERO
    })
}

/// Formats a 24-hour time as `H:MM AM|PM`. Out-of-range values wrap.
pub fn format_clock_time(hour24: u32, minute: u32) -> String {
    ClockTime::from_minutes_wrapping((hour24 % 24) * 60 + minute % MINUTES_PER_DAY).to_string()
}

/// End time of a task starting at `start` and lasting `duration`.
///
/// Wraps modulo 24 hours; use [`ClockTime::add_duration`] to learn whether a
/// day boundary was crossed.
pub const fn compute_end_time(start: ClockTime, duration: TaskDuration) -> ClockTime {
    start.add_duration(duration).0
}

/// Duration between two clock times. An end before the start is taken to be
/// on the next day.
pub const fn compute_duration(start: ClockTime, end: ClockTime) -> TaskDuration {
    let start = start.minutes_since_midnight();
    let end = end.minutes_since_midnight();
    let diff = if end >= start {
        end - start
    } else {
        end + MINUTES_PER_DAY - start
    };
    TaskDuration::from_minutes(diff)
}
