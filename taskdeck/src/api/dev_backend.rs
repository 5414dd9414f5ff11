use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use super::dto::{CreateTaskRequest, RawId, RawPriority, RawTask, UpdateTaskRequest};
use super::{ApiError, TaskApi};
use crate::domain::TaskId;

pub const DEV_USER_ID: &str = "dev-user";
pub const DEV_TOKEN: &str = "dev-token";

/// A request as received by the dev backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevRequest {
    Fetch,
    Create(CreateTaskRequest),
    Update { id: TaskId, body: UpdateTaskRequest },
    Delete(TaskId),
}

/// In-memory stand-in for the remote API.
///
/// Clones share the same store, so a test can keep a handle while the
/// controller owns another.
#[derive(Debug, Clone, Default)]
pub struct DevBackend {
    state: Arc<Mutex<DevState>>,
}

#[derive(Debug, Default)]
struct DevState {
    records: Vec<RawTask>,
    next_id: u64,
    failures_left: u32,
    requests: Vec<DevRequest>,
}

impl DevBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend preloaded with a few tasks for the dev user and one task owned
    /// by somebody else.
    pub fn seeded() -> Self {
        Self::new().with_records(seed_records())
    }

    pub fn with_records(self, records: Vec<RawTask>) -> Self {
        {
            let mut state = self.lock();
            state.next_id = state.next_id.max(records.len() as u64 + 100);
            state.records = records;
        }
        self
    }

    /// Fail the next `count` requests with a 503.
    pub fn fail_next(&self, count: u32) {
        self.lock().failures_left = count;
    }

    pub fn requests(&self) -> Vec<DevRequest> {
        self.lock().requests.clone()
    }

    pub fn records(&self) -> Vec<RawTask> {
        self.lock().records.clone()
    }

    fn lock(&self) -> MutexGuard<'_, DevState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(
        &self,
        token: &str,
        request: DevRequest,
        call: &str,
    ) -> Result<MutexGuard<'_, DevState>, ApiError> {
        let mut state = self.lock();
        state.requests.push(request);

        if token.is_empty() {
            return Err(ApiError::Unauthorized {
                call: call.to_string(),
            });
        }
        if state.failures_left > 0 {
            state.failures_left -= 1;
            return Err(ApiError::status(call, 503));
        }
        Ok(state)
    }
}

#[async_trait]
impl TaskApi for DevBackend {
    async fn fetch_tasks(&self, token: &str) -> Result<Vec<RawTask>, ApiError> {
        let state = self.begin(token, DevRequest::Fetch, "GET /api/tasks")?;
        Ok(state.records.clone())
    }

    async fn create_task(
        &self,
        token: &str,
        body: &CreateTaskRequest,
    ) -> Result<RawTask, ApiError> {
        let mut state = self.begin(token, DevRequest::Create(body.clone()), "POST /api/tasks")?;
        state.next_id += 1;

        let record = RawTask {
            id: RawId::Text(format!("srv-{}", state.next_id)),
            title: body.title.clone(),
            description: body.description.clone(),
            priority: Some(RawPriority::Code(body.priority as i64)),
            status: Some(body.status),
            completed: None,
            user_id: Some(RawId::Text(DEV_USER_ID.to_string())),
        };
        state.records.push(record.clone());
        Ok(record)
    }

    async fn update_task(
        &self,
        token: &str,
        id: &TaskId,
        body: &UpdateTaskRequest,
    ) -> Result<(), ApiError> {
        let call = "PUT /api/tasks/:id";
        let mut state = self.begin(
            token,
            DevRequest::Update {
                id: id.clone(),
                body: body.clone(),
            },
            call,
        )?;

        let Some(record) = state
            .records
            .iter_mut()
            .find(|r| r.id.to_string() == id.as_str())
        else {
            return Err(ApiError::status(call, 404));
        };

        if let Some(title) = &body.title {
            record.title = title.clone();
        }
        if let Some(description) = &body.description {
            record.description = description.clone();
        }
        if let Some(priority) = body.priority {
            record.priority = Some(RawPriority::Code(priority as i64));
        }
        if let Some(status) = body.status {
            record.status = Some(status);
        }
        Ok(())
    }

    async fn delete_task(&self, token: &str, id: &TaskId) -> Result<(), ApiError> {
        let call = "DELETE /api/tasks/:id";
        let mut state = self.begin(token, DevRequest::Delete(id.clone()), call)?;

        let before = state.records.len();
        state.records.retain(|r| r.id.to_string() != id.as_str());
        if state.records.len() == before {
            return Err(ApiError::status(call, 404));
        }
        Ok(())
    }
}

fn seed_records() -> Vec<RawTask> {
    fn record(
        id: &str,
        title: &str,
        description: &str,
        priority: RawPriority,
        status: bool,
        owner: &str,
    ) -> RawTask {
        RawTask {
            id: RawId::Text(id.to_string()),
            title: title.to_string(),
            description: description.to_string(),
            priority: Some(priority),
            status: Some(status),
            completed: None,
            user_id: Some(RawId::Text(owner.to_string())),
        }
    }

    vec![
        record(
            "1",
            "Water the plants",
            "The ferns in the hallway need more than the rest.",
            RawPriority::Code(1),
            false,
            DEV_USER_ID,
        ),
        record(
            "2",
            "Renew passport",
            "Book an appointment before the summer rush.",
            RawPriority::Code(3),
            false,
            DEV_USER_ID,
        ),
        record(
            "3",
            "Send invoice",
            "March invoice for the design work.",
            RawPriority::Label("medium".to_string()),
            true,
            DEV_USER_ID,
        ),
        record(
            "4",
            "Not mine",
            "Belongs to another account and must never be shown.",
            RawPriority::Code(2),
            false,
            "someone-else",
        ),
    ]
}
