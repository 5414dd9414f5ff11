use crate::api::dto::{RawPriority, RawTask};
use crate::domain::{Priority, Task, TaskId};

/// Map a wire priority onto the canonical label.
///
/// Numeric codes follow [`Priority::from_code`]. Labels pass through when
/// they name one of the three priorities; anything else falls back to `Low`,
/// the same as an unknown code or any other value. A missing priority is
/// also `Low`.
pub fn normalize_priority(raw: Option<&RawPriority>) -> Priority {
    match raw {
        Some(RawPriority::Code(code)) => Priority::from_code(*code),
        Some(RawPriority::Label(label)) => Priority::from_label(label).unwrap_or_else(|| {
            tracing::debug!(label = %label, "unknown priority label, using low");
            Priority::Low
        }),
        Some(RawPriority::Other(value)) => {
            tracing::debug!(priority = %value, "unknown priority value, using low");
            Priority::Low
        }
        None => Priority::Low,
    }
}

/// Reshape one API record into a [`Task`]. `status` wins over `completed`
/// when both are present; neither means not completed.
pub fn normalize_task(raw: RawTask) -> Task {
    let priority = normalize_priority(raw.priority.as_ref());
    Task {
        id: TaskId::new(raw.id.to_string()),
        title: raw.title,
        description: raw.description,
        priority,
        completed: raw.status.or(raw.completed).unwrap_or(false),
        owner_id: raw.user_id.map(|id| id.to_string()),
    }
}

/// Keep only the records owned by `owner_id` and normalize them, preserving
/// server order. Records without an owner are dropped.
pub fn normalize_owned_by(records: Vec<RawTask>, owner_id: &str) -> Vec<Task> {
    records
        .into_iter()
        .filter(|raw| {
            raw.user_id
                .as_ref()
                .is_some_and(|owner| owner.to_string() == owner_id)
        })
        .map(normalize_task)
        .collect()
}
