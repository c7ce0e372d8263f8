//! Calendar export: Google Calendar template links and `.ics` payloads.
//!
//! Times are wall-clock local values with no timezone conversion. Events are
//! placed on the given day; a range that runs past midnight ends on the
//! following date.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use url::Url;

use crate::schedule::DEFAULT_DURATION;
use crate::task::Task;

static GOOGLE_CALENDAR_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://calendar.google.com/calendar/render").unwrap());
const ICS_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// A concrete event derived from a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub title: String,
    pub details: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl CalendarEvent {
    /// Builds the event for `task` on `date`.
    ///
    /// Without a range the event starts at midnight; without a duration it
    /// lasts one hour.
    pub fn for_task(task: &Task, date: NaiveDate) -> Self {
        let start_time = task
            .scheduled_for
            .map(|range| range.start)
            .unwrap_or_default();
        let duration = task.duration.unwrap_or(DEFAULT_DURATION);

        let start = date.and_time(
            NaiveTime::from_hms_opt(start_time.hour24(), start_time.minute(), 0)
                .unwrap_or(NaiveTime::MIN),
        );
        let end = start + Duration::minutes(i64::from(duration.total_minutes()));

        Self {
            title: task.title.clone(),
            details: format!("Category: {}\nPriority: {}", task.category, task.priority),
            start,
            end,
        }
    }

    fn dates(&self) -> String {
        format!(
            "{}/{}",
            self.start.format(ICS_TIMESTAMP_FORMAT),
            self.end.format(ICS_TIMESTAMP_FORMAT)
        )
    }
}

/// Google Calendar "create event" link for a task.
pub fn google_calendar_url(task: &Task, date: NaiveDate) -> Url {
    let event = CalendarEvent::for_task(task, date);
    let mut url = GOOGLE_CALENDAR_URL.clone();
    url.query_pairs_mut()
        .append_pair("action", "TEMPLATE")
        .append_pair("text", &event.title)
        .append_pair("details", &event.details)
        .append_pair("dates", &event.dates());
    tracing::debug!(%url, "built calendar link");
    url
}

/// A minimal iCalendar document holding one event for the task.
pub fn ics_document(task: &Task, date: NaiveDate) -> String {
    let event = CalendarEvent::for_task(task, date);
    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//Kairos//Tasks//EN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}@kairos", task.id),
        format!("DTSTART:{}", event.start.format(ICS_TIMESTAMP_FORMAT)),
        format!("DTEND:{}", event.end.format(ICS_TIMESTAMP_FORMAT)),
        format!("SUMMARY:{}", escape_text(&event.title)),
        format!("DESCRIPTION:{}", escape_text(&event.details)),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];
    let mut document = lines.join("\r\n");
    document.push_str("\r\n");
    document
}

/// File name for an exported task, e.g. `design-landing-page.ics`.
pub fn ics_file_name(title: &str) -> String {
    let slug = title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "task.ics".to_string()
    } else {
        format!("{slug}.ics")
    }
}

/// Escapes TEXT values per RFC 5545.
fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            c => escaped.push(c),
        }
    }
    escaped
}
