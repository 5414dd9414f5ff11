use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use crate::api::dto::{CreateTaskRequest, RawTask, UpdateTaskRequest};
use crate::api::{ApiError, TaskApi};
use crate::domain::{sort_tasks, truncate_description, NewTask, Task, TaskId, TaskPatch};
use crate::normalize::{normalize_owned_by, normalize_task};
use crate::session::Session;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("auth token is missing")]
    MissingSession,
    #[error("no task with id {0}")]
    UnknownTask(TaskId),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// What happens to an optimistic change when the server rejects it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollbackPolicy {
    /// Log the failure and leave the local change in place.
    #[default]
    Keep,
    /// Restore the task as it was before the change.
    Revert,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub rollback: RollbackPolicy,
    /// Also `POST` new tasks. When off, added tasks only live locally.
    pub push_new_tasks: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Add,
    Toggle,
    Edit,
    Delete,
}

/// Ticket for an optimistic mutation that has not been acknowledged yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOp {
    pub id: TaskId,
    pub kind: OpKind,
    pub seq: u64,
}

#[derive(Debug, Clone)]
struct PendingEntry {
    kind: OpKind,
    seq: u64,
    snapshot: Option<Task>,
    position: usize,
}

/// Marks the point in the local mutation sequence at which a refresh began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    seq: u64,
}

/// Owns the task list for one session and keeps it in step with the API.
///
/// Every mutation is applied locally first and then sent. Each local change
/// is stamped with a sequence number; a refresh that started before a change
/// will not overwrite it.
pub struct SyncController<A> {
    api: A,
    options: SyncOptions,
    session: Option<Session>,
    tasks: Vec<Task>,
    seq: u64,
    touched: HashMap<TaskId, u64>,
    pending: HashMap<TaskId, Vec<PendingEntry>>,
    last_provisional_ms: i128,
}

impl<A: TaskApi> SyncController<A> {
    pub fn new(api: A, options: SyncOptions) -> Self {
        Self {
            api,
            options,
            session: None,
            tasks: Vec::new(),
            seq: 0,
            touched: HashMap::new(),
            pending: HashMap::new(),
            last_provisional_ms: 0,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.login(session);
        self
    }

    pub fn login(&mut self, session: Session) {
        info!(user_id = %session.user_id(), "session started");
        self.session = Some(session);
    }

    /// Drop the session and everything that belonged to it.
    pub fn logout(&mut self) {
        self.session = None;
        self.tasks.clear();
        self.touched.clear();
        self.pending.clear();
        info!("session cleared");
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Tasks in local insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks in display order, derived fresh on every call.
    pub fn sorted_tasks(&self) -> Vec<Task> {
        sort_tasks(&self.tasks)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn has_pending(&self, id: &TaskId) -> bool {
        self.pending.contains_key(id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    // ------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------

    /// Fetch the owner's tasks and replace local state, keeping any local
    /// change made while the request was in flight.
    #[tracing::instrument(skip_all)]
    pub async fn list_tasks(&mut self) -> Result<usize, SyncError> {
        let token = match self.token() {
            Ok(token) => token,
            Err(e) => {
                error!("auth token is missing, not fetching tasks");
                return Err(e);
            }
        };

        let ticket = self.begin_refresh();
        match self.api.fetch_tasks(&token).await {
            Ok(records) => Ok(self.finish_refresh(ticket, records)),
            Err(e) => {
                error!(error = %e, "failed to fetch tasks");
                Err(e.into())
            }
        }
    }

    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket { seq: self.seq }
    }

    /// Merge a fetched task list into local state.
    ///
    /// Server records replace local tasks, except for tasks changed locally
    /// after `ticket` was taken or still waiting on the server: those keep
    /// their local version, and stay gone if they were deleted. Returns the
    /// number of tasks held afterwards.
    pub fn finish_refresh(&mut self, ticket: RefreshTicket, records: Vec<RawTask>) -> usize {
        let Some(owner_id) = self.session.as_ref().map(|s| s.user_id().to_string()) else {
            warn!("session ended while refreshing, discarding response");
            return self.tasks.len();
        };

        let fresh = normalize_owned_by(records, &owner_id);
        let mut seen = HashSet::with_capacity(fresh.len());
        let mut merged = Vec::with_capacity(fresh.len());

        for server_task in fresh {
            seen.insert(server_task.id.clone());
            if self.changed_since(&server_task.id, ticket) {
                if let Some(local) = self.task(&server_task.id) {
                    debug!(task_id = %server_task.id, "keeping newer local version");
                    merged.push(local.clone());
                }
            } else {
                merged.push(server_task);
            }
        }

        for local in &self.tasks {
            if !seen.contains(&local.id) && self.changed_since(&local.id, ticket) {
                merged.push(local.clone());
            }
        }

        self.tasks = merged;

        let pending = &self.pending;
        self.touched
            .retain(|id, seq| *seq > ticket.seq || pending.contains_key(id));

        info!(count = self.tasks.len(), "applied task refresh");
        self.tasks.len()
    }

    fn changed_since(&self, id: &TaskId, ticket: RefreshTicket) -> bool {
        self.pending.contains_key(id) || self.touched.get(id).is_some_and(|&seq| seq > ticket.seq)
    }

    // ------------------------------------------------------------------
    // Optimistic local halves
    // ------------------------------------------------------------------

    /// Append a new task with a provisional id.
    pub fn apply_add(&mut self, input: NewTask) -> PendingOp {
        let task = Task {
            id: self.next_provisional_id(),
            title: input.title,
            description: truncate_description(&input.description),
            priority: input.priority,
            completed: false,
            owner_id: self.session.as_ref().map(|s| s.user_id().to_string()),
        };
        let id = task.id.clone();
        let position = self.tasks.len();
        self.tasks.push(task);

        let seq = self.next_seq();
        self.track(id, OpKind::Add, seq, None, position)
    }

    pub fn apply_toggle(&mut self, id: &TaskId) -> Result<PendingOp, SyncError> {
        let position = self.position(id)?;
        let snapshot = self.tasks[position].clone();
        self.tasks[position].completed = !snapshot.completed;

        let seq = self.next_seq();
        Ok(self.track(id.clone(), OpKind::Toggle, seq, Some(snapshot), position))
    }

    pub fn apply_edit(&mut self, id: &TaskId, patch: &TaskPatch) -> Result<PendingOp, SyncError> {
        let position = self.position(id)?;
        let snapshot = self.tasks[position].clone();
        patch.apply_to(&mut self.tasks[position]);

        let seq = self.next_seq();
        Ok(self.track(id.clone(), OpKind::Edit, seq, Some(snapshot), position))
    }

    pub fn apply_delete(&mut self, id: &TaskId) -> Result<PendingOp, SyncError> {
        let position = self.position(id)?;
        let snapshot = self.tasks.remove(position);

        let seq = self.next_seq();
        Ok(self.track(id.clone(), OpKind::Delete, seq, Some(snapshot), position))
    }

    /// Close out a pending operation with the server's answer.
    ///
    /// On failure the error is logged and returned; whether the local change
    /// survives depends on [`RollbackPolicy`].
    pub fn settle(&mut self, op: &PendingOp, result: Result<(), SyncError>) -> Result<(), SyncError> {
        let entry = self.take_pending(op);

        let Err(err) = result else {
            debug!(task_id = %op.id, kind = ?op.kind, "operation acknowledged");
            return Ok(());
        };

        match (self.options.rollback, entry) {
            (RollbackPolicy::Revert, Some(entry)) => self.roll_back(op, entry, &err),
            _ => warn!(
                task_id = %op.id,
                kind = ?op.kind,
                error = %err,
                "operation failed, keeping local change"
            ),
        }
        Err(err)
    }

    fn roll_back(&mut self, op: &PendingOp, entry: PendingEntry, err: &SyncError) {
        if self.touched.get(&op.id).is_some_and(|&seq| seq > entry.seq) {
            warn!(
                task_id = %op.id,
                kind = ?entry.kind,
                error = %err,
                "operation failed but the task changed since, not rolling back"
            );
            return;
        }

        match entry.kind {
            OpKind::Add => self.tasks.retain(|t| t.id != op.id),
            OpKind::Toggle | OpKind::Edit => {
                if let (Some(snapshot), Some(task)) = (
                    entry.snapshot,
                    self.tasks.iter_mut().find(|t| t.id == op.id),
                ) {
                    *task = snapshot;
                }
            }
            OpKind::Delete => {
                if let Some(snapshot) = entry.snapshot {
                    if self.task(&op.id).is_none() {
                        let at = entry.position.min(self.tasks.len());
                        self.tasks.insert(at, snapshot);
                    }
                }
            }
        }

        warn!(
            task_id = %op.id,
            kind = ?entry.kind,
            error = %err,
            "operation failed, rolled back local change"
        );
    }

    // ------------------------------------------------------------------
    // Full operations
    // ------------------------------------------------------------------

    /// Add a task locally and, if enabled, create it on the server. Returns
    /// the task's id, which is the server id once the server confirmed it.
    #[tracing::instrument(skip_all, fields(title = %input.title))]
    pub async fn add_task(&mut self, input: NewTask) -> Result<TaskId, SyncError> {
        let op = self.apply_add(input);

        if !self.options.push_new_tasks {
            self.settle(&op, Ok(()))?;
            return Ok(op.id);
        }

        let body = match self.task(&op.id) {
            Some(task) => CreateTaskRequest {
                title: task.title.clone(),
                description: task.description.clone(),
                priority: task.priority.code(),
                status: false,
            },
            None => return Err(SyncError::UnknownTask(op.id)),
        };

        let created = match self.token() {
            Ok(token) => self
                .api
                .create_task(&token, &body)
                .await
                .map_err(SyncError::from),
            Err(e) => Err(e),
        };

        match created {
            Ok(record) => {
                let op = self.adopt_server_id(&op, record);
                self.settle(&op, Ok(()))?;
                Ok(op.id)
            }
            Err(e) => self.settle(&op, Err(e)).map(|_| op.id),
        }
    }

    /// Flip `completed` locally, then send the new state. Returns the new
    /// value of `completed`.
    #[tracing::instrument(skip_all, fields(task_id = %id))]
    pub async fn toggle_complete(&mut self, id: &TaskId) -> Result<bool, SyncError> {
        let op = self.apply_toggle(id)?;
        let completed = self.task(&op.id).is_some_and(|t| t.completed);

        let result = self
            .send_update(&op.id, &UpdateTaskRequest::status(completed))
            .await;
        self.settle(&op, result).map(|_| completed)
    }

    /// Merge `patch` locally, then send it with the priority as its code.
    /// An empty patch does nothing.
    #[tracing::instrument(skip_all, fields(task_id = %id))]
    pub async fn edit_task(&mut self, id: &TaskId, patch: TaskPatch) -> Result<(), SyncError> {
        if patch.is_empty() {
            return match self.task(id) {
                Some(_) => Ok(()),
                None => Err(SyncError::UnknownTask(id.clone())),
            };
        }

        let patch = patch.truncated();
        let op = self.apply_edit(id, &patch)?;

        let result = self
            .send_update(&op.id, &UpdateTaskRequest::from_patch(&patch))
            .await;
        self.settle(&op, result)
    }

    #[tracing::instrument(skip_all, fields(task_id = %id))]
    pub async fn delete_task(&mut self, id: &TaskId) -> Result<(), SyncError> {
        let op = self.apply_delete(id)?;

        let result = match self.token() {
            Ok(token) => self
                .api
                .delete_task(&token, &op.id)
                .await
                .map_err(SyncError::from),
            Err(e) => Err(e),
        };
        self.settle(&op, result)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    async fn send_update(&self, id: &TaskId, body: &UpdateTaskRequest) -> Result<(), SyncError> {
        let token = self.token()?;
        self.api.update_task(&token, id, body).await?;
        Ok(())
    }

    fn token(&self) -> Result<String, SyncError> {
        self.session
            .as_ref()
            .map(|s| s.token().to_string())
            .ok_or(SyncError::MissingSession)
    }

    fn position(&self, id: &TaskId) -> Result<usize, SyncError> {
        self.tasks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| SyncError::UnknownTask(id.clone()))
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Millisecond timestamp, bumped when two tasks are added within the
    /// same millisecond.
    fn next_provisional_id(&mut self) -> TaskId {
        let now_ms = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let id = now_ms.max(self.last_provisional_ms + 1);
        self.last_provisional_ms = id;
        TaskId::new(id.to_string())
    }

    fn track(
        &mut self,
        id: TaskId,
        kind: OpKind,
        seq: u64,
        snapshot: Option<Task>,
        position: usize,
    ) -> PendingOp {
        self.touched.insert(id.clone(), seq);
        self.pending.entry(id.clone()).or_default().push(PendingEntry {
            kind,
            seq,
            snapshot,
            position,
        });
        PendingOp { id, kind, seq }
    }

    fn take_pending(&mut self, op: &PendingOp) -> Option<PendingEntry> {
        let entries = self.pending.get_mut(&op.id)?;
        let index = entries.iter().position(|e| e.seq == op.seq)?;
        let entry = entries.remove(index);
        if entries.is_empty() {
            self.pending.remove(&op.id);
        }
        Some(entry)
    }

    /// Swap a provisional id for the one the server assigned.
    fn adopt_server_id(&mut self, op: &PendingOp, record: RawTask) -> PendingOp {
        let server = normalize_task(record);
        if server.id == op.id {
            return op.clone();
        }

        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == op.id) {
            task.id = server.id.clone();
            if task.owner_id.is_none() {
                task.owner_id = server.owner_id;
            }
        }
        if let Some(seq) = self.touched.remove(&op.id) {
            self.touched.insert(server.id.clone(), seq);
        }
        if let Some(entries) = self.pending.remove(&op.id) {
            self.pending
                .entry(server.id.clone())
                .or_default()
                .extend(entries);
        }

        debug!(provisional = %op.id, server = %server.id, "task created on server");
        PendingOp {
            id: server.id,
            ..op.clone()
        }
    }
}
