//! Tasks and category preferences.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::clock::{TaskDuration, TimeRange};
use crate::schedule::TimeSlot;
use crate::types::{CategoryId, TaskId, ValidationError};

/// Color used for categories that have no preference entry.
pub const FALLBACK_CATEGORY_COLOR: &str = "#b2bec3";

/// Colors offered by the category color picker.
pub const PALETTE: [&str; 20] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEEAD", "#D4A5A5", "#9B59B6", "#3498DB",
    "#FFB6B9", "#77DD77", "#836953", "#FF9671", "#E056FD", "#F7D794", "#786FA6", "#F8C291",
    "#00B894", "#FDA7DF", "#4834D4", "#6AB04C",
];

/// A task category: one of the built-in set or a user-defined name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskCategory {
    Work,
    Personal,
    Health,
    Shopping,
    #[default]
    Other,
    Custom(String),
}

impl TaskCategory {
    /// Built-in categories in display order.
    pub const BUILT_IN: [Self; 5] = [
        Self::Work,
        Self::Personal,
        Self::Health,
        Self::Shopping,
        Self::Other,
    ];

    /// Maps a name to a category. Built-in names match case-insensitively,
    /// anything else becomes a custom category. Blank names map to `Other`.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        Self::BUILT_IN
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(name))
            .unwrap_or_else(|| {
                if name.is_empty() {
                    Self::Other
                } else {
                    Self::Custom(name.to_string())
                }
            })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Work => "Work",
            Self::Personal => "Personal",
            Self::Health => "Health",
            Self::Shopping => "Shopping",
            Self::Other => "Other",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for TaskCategory {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<TaskCategory> for String {
    fn from(category: TaskCategory) -> Self {
        match category {
            TaskCategory::Custom(name) => name,
            other => other.name().to_string(),
        }
    }
}

/// Task priority.
///
/// Stored values outside Low, Medium and High read back as `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::InvalidPriority {
                value: s.to_string(),
            })
    }
}

impl From<String> for TaskPriority {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|err: ValidationError| {
            tracing::warn!(%err, "unknown stored priority, using Medium");
            Self::default()
        })
    }
}

impl From<TaskPriority> for String {
    fn from(priority: TaskPriority) -> Self {
        priority.as_str().to_string()
    }
}

/// A stored task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub category: TaskCategory,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<TaskDuration>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub completed: bool,
    /// Kept for compatibility with stored data; nothing updates it.
    #[serde(default)]
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_for: Option<TimeRange>,
}

/// Reads an optional string-encoded field. Blank strings mean absent.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()).map(T::from))
}

impl Task {
    /// Builds a task from accepted draft fields, applying the commit defaults.
    pub fn from_new(new: NewTask, created_at: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::generate(),
            title: new.title,
            category: new.category.unwrap_or_default(),
            duration: new.duration,
            priority: new.priority.unwrap_or_default(),
            completed: false,
            progress: 0,
            created_at,
            scheduled_for: new.scheduled_for,
        }
    }

    pub const fn time_slot(&self) -> TimeSlot {
        TimeSlot::new(self.duration, self.scheduled_for)
    }

    pub fn set_time_slot(&mut self, slot: TimeSlot) {
        self.duration = slot.duration;
        self.scheduled_for = slot.scheduled_for;
    }
}

/// Fields of a task about to be committed to state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTask {
    pub title: String,
    pub category: Option<TaskCategory>,
    pub priority: Option<TaskPriority>,
    pub duration: Option<TaskDuration>,
    pub scheduled_for: Option<TimeRange>,
}

impl NewTask {
    /// A task carrying only a title.
    pub fn title_only(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A user-visible category label and color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPreference {
    pub id: CategoryId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub is_default: bool,
}

/// The category preferences every fresh store starts with.
pub fn default_categories() -> Vec<CategoryPreference> {
    [
        ("work", TaskCategory::Work, "#ff7675"),
        ("personal", TaskCategory::Personal, "#74b9ff"),
        ("health", TaskCategory::Health, "#55efc4"),
        ("shopping", TaskCategory::Shopping, "#ffeaa7"),
        ("other", TaskCategory::Other, "#b2bec3"),
    ]
    .into_iter()
    .filter_map(|(id, category, color)| {
        Some(CategoryPreference {
            id: CategoryId::new(id).ok()?,
            name: category.name().to_string(),
            color: color.to_string(),
            is_default: true,
        })
    })
    .collect()
}
