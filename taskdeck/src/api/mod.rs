mod client;
mod dev_backend;
pub mod dto;
mod error;

use async_trait::async_trait;

pub use client::*;
pub use dev_backend::*;
pub use error::*;

use crate::domain::TaskId;
use dto::{CreateTaskRequest, RawTask, UpdateTaskRequest};

/// Outbound port for the remote task API.
///
/// Every call carries the bearer token explicitly; implementations hold no
/// session state of their own.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// `GET /api/tasks`. Returns every record the server sends; owner
    /// filtering happens in the caller.
    async fn fetch_tasks(&self, token: &str) -> Result<Vec<RawTask>, ApiError>;

    /// `POST /api/tasks`.
    async fn create_task(
        &self,
        token: &str,
        body: &CreateTaskRequest,
    ) -> Result<RawTask, ApiError>;

    /// `PUT /api/tasks/{id}`.
    async fn update_task(
        &self,
        token: &str,
        id: &TaskId,
        body: &UpdateTaskRequest,
    ) -> Result<(), ApiError>;

    /// `DELETE /api/tasks/{id}`.
    async fn delete_task(&self, token: &str, id: &TaskId) -> Result<(), ApiError>;
}
