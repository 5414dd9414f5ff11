use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::domain::{Priority, TaskPatch};

/// Ids arrive as strings or as bare numbers depending on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Text(s) => f.write_str(s),
            RawId::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Priority as sent by the API: a numeric code or a label. Anything else
/// (fractions, out-of-range numbers, booleans) is kept as `Other` so the
/// record still parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPriority {
    Code(i64),
    Label(String),
    Other(Value),
}

/// A task record exactly as the API returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTask {
    #[serde(alias = "_id")]
    pub id: RawId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<RawPriority>,
    #[serde(default, deserialize_with = "truthy")]
    pub status: Option<bool>,
    #[serde(default, deserialize_with = "truthy")]
    pub completed: Option<bool>,
    #[serde(default)]
    pub user_id: Option<RawId>,
}

/// Completion flags are read by truthiness: `1`, `"yes"` and objects count
/// as set, `0` and `""` as unset. `null` is the same as absent.
fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Null => None,
        Value::Bool(b) => Some(b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => Some(!s.is_empty()),
        Value::Array(_) | Value::Object(_) => Some(true),
    }))
}

/// Parse a `GET /api/tasks` payload record by record, dropping records
/// that do not look like tasks instead of failing the whole refresh.
pub fn parse_raw_tasks(values: Vec<serde_json::Value>) -> Vec<RawTask> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawTask>(value) {
            Ok(raw) => Some(raw),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed task record");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
    pub priority: u8,
    pub status: bool,
}

/// Body of `PUT /api/tasks/{id}`. Only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
}

impl UpdateTaskRequest {
    pub fn status(completed: bool) -> Self {
        Self {
            status: Some(completed),
            ..Default::default()
        }
    }

    /// Encode an edit, converting the priority label to its numeric code.
    pub fn from_patch(patch: &TaskPatch) -> Self {
        Self {
            title: patch.title.clone(),
            description: patch.description.clone(),
            priority: patch.priority.map(Priority::code),
            status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn toggle_body_only_carries_status() {
        let body = serde_json::to_value(UpdateTaskRequest::status(true)).unwrap();
        assert_eq!(body, json!({ "status": true }));
    }

    #[test]
    fn edit_body_uses_numeric_priority() {
        let patch = TaskPatch {
            title: Some("Renamed".to_string()),
            priority: Some(Priority::High),
            ..Default::default()
        };
        let body = serde_json::to_value(UpdateTaskRequest::from_patch(&patch)).unwrap();
        assert_eq!(body, json!({ "title": "Renamed", "priority": 3 }));
    }

    #[test]
    fn raw_task_accepts_both_encodings() {
        let numeric: RawTask = serde_json::from_value(json!({
            "_id": "abc",
            "title": "t",
            "priority": 2,
            "status": true,
            "userId": 42
        }))
        .unwrap();
        assert_eq!(numeric.id, RawId::Text("abc".to_string()));
        assert_eq!(numeric.priority, Some(RawPriority::Code(2)));
        assert_eq!(numeric.user_id.map(|u| u.to_string()), Some("42".to_string()));

        let labelled: RawTask = serde_json::from_value(json!({
            "id": 7,
            "priority": "high",
            "completed": false
        }))
        .unwrap();
        assert_eq!(labelled.id.to_string(), "7");
        assert_eq!(labelled.priority, Some(RawPriority::Label("high".to_string())));
        assert_eq!(labelled.status, None);
    }

    #[test]
    fn unusual_priorities_still_parse() {
        let parsed = parse_raw_tasks(vec![
            json!({ "id": "a", "priority": 2.5 }),
            json!({ "id": "b", "priority": 9999999999999999999u64 }),
            json!({ "id": "c", "priority": true }),
        ]);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].priority, Some(RawPriority::Other(json!(2.5))));
    }

    #[test]
    fn completion_flags_follow_truthiness() {
        let parsed = parse_raw_tasks(vec![
            json!({ "id": "a", "status": 1 }),
            json!({ "id": "b", "status": 0 }),
            json!({ "id": "c", "completed": "yes" }),
            json!({ "id": "d", "status": null }),
        ]);
        let status: Vec<_> = parsed.iter().map(|r| (r.status, r.completed)).collect();
        assert_eq!(
            status,
            vec![
                (Some(true), None),
                (Some(false), None),
                (None, Some(true)),
                (None, None)
            ]
        );
    }

    #[test]
    fn malformed_records_are_skipped() {
        let parsed = parse_raw_tasks(vec![
            json!({ "id": "1", "title": "ok" }),
            json!({ "title": "no id" }),
            json!("not an object"),
        ]);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].title, "ok");
    }
}
