use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum description length, counted in characters.
pub const DESCRIPTION_LIMIT: usize = 300;

/// A task identifier.
///
/// Server ids and client-generated provisional ids share this type; both
/// are opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task urgency. This is the only in-memory representation; numeric codes
/// exist only on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Decode a wire code. Anything other than 2 or 3 is `Low`.
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Priority::Medium,
            3 => Priority::High,
            _ => Priority::Low,
        }
    }

    /// Wire code sent to the API.
    pub fn code(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    /// Display rank, most urgent first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Exact label match, case-insensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown priority `{0}` (expected low, medium, high or 1-3)")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    /// Accepts a label or one of the codes 1, 2, 3.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(priority) = Self::from_label(s) {
            return Ok(priority);
        }
        match s.trim() {
            "1" => Ok(Priority::Low),
            "2" => Ok(Priority::Medium),
            "3" => Ok(Priority::High),
            other => Err(ParsePriorityError(other.to_string())),
        }
    }
}

/// A normalized task as held in application state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

/// User input for a new task, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Partial edit of a task. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.priority.is_none()
    }

    /// Clamp the description to [`DESCRIPTION_LIMIT`].
    pub fn truncated(mut self) -> Self {
        self.description = self.description.map(|d| truncate_description(&d));
        self
    }

    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = truncate_description(description);
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
    }
}

pub fn truncate_description(description: &str) -> String {
    description.chars().take(DESCRIPTION_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task {
            id: TaskId::new("1"),
            title: "Write report".to_string(),
            description: "Quarterly numbers".to_string(),
            priority: Priority::Low,
            completed: false,
            owner_id: None,
        }
    }

    #[test]
    fn codes_map_to_labels() {
        assert_eq!(Priority::from_code(1), Priority::Low);
        assert_eq!(Priority::from_code(2), Priority::Medium);
        assert_eq!(Priority::from_code(3), Priority::High);
        assert_eq!(Priority::from_code(0), Priority::Low);
        assert_eq!(Priority::from_code(7), Priority::Low);
        assert_eq!(Priority::from_code(-2), Priority::Low);
    }

    #[test]
    fn code_is_inverse_of_from_code() {
        for priority in Priority::ALL {
            assert_eq!(Priority::from_code(priority.code() as i64), priority);
        }
    }

    #[test]
    fn rank_puts_high_first() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }

    #[test]
    fn parses_labels_and_codes() {
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(" medium ".parse::<Priority>(), Ok(Priority::Medium));
        assert_eq!("1".parse::<Priority>(), Ok(Priority::Low));
        assert_eq!("3".parse::<Priority>(), Ok(Priority::High));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn truncates_by_characters_not_bytes() {
        let long = "ñ".repeat(DESCRIPTION_LIMIT + 20);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.chars().count(), DESCRIPTION_LIMIT);

        assert_eq!(truncate_description("short"), "short");
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut task = task();
        TaskPatch {
            priority: Some(Priority::High),
            ..Default::default()
        }
        .apply_to(&mut task);

        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.title, "Write report");
        assert_eq!(task.description, "Quarterly numbers");
    }

    #[test]
    fn patch_truncates_description() {
        let mut task = task();
        let patch = TaskPatch {
            description: Some("x".repeat(400)),
            ..Default::default()
        };
        patch.apply_to(&mut task);
        assert_eq!(task.description.len(), DESCRIPTION_LIMIT);
        assert_eq!(
            patch.truncated().description.map(|d| d.len()),
            Some(DESCRIPTION_LIMIT)
        );
    }

    #[test]
    fn new_task_defaults_to_medium() {
        let new = NewTask::new("Call the bank");
        assert_eq!(new.priority, Priority::Medium);
        assert!(new.description.is_empty());
    }
}
