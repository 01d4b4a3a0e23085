//! Record client adapter.
//!
//! [`RecordClient`] turns domain calls (list boards, move a task) into
//! generic record-service calls and normalises every response into
//! [`Board`]/[`Task`] values right away. Raw records never leave this
//! module.
//!
//! Every failure is logged and pushed to the shared [`Notifications`] log
//! exactly once, here, before it is returned. Callers must not notify again
//! for an `Err`; they only report negative `Ok(false)` outcomes.

use taskflow_proto::normalize::{
    board_from_record, board_record, board_update_record, status_patch, task_from_record,
    task_record,
};
use taskflow_proto::record::{
    BOARD_FIELDS, DeleteParams, Direction, FetchParams, PAGE_SIZE, RecordsParams, TASK_FIELDS,
    fields,
};
use taskflow_proto::{
    Board, BoardDraft, BoardId, NormalizeError, Record, Resource, Task, TaskDraft, TaskId,
    TaskStatus,
};

use crate::notify::Notifications;
use crate::service::{RecordService, ServiceError};

/// Failure of an adapter call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The service call itself failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A returned record could not be normalised.
    #[error("malformed record: {0}")]
    Malformed(#[from] NormalizeError),

    /// A fetch returned no data payload.
    #[error("no data returned from the server")]
    NoData,

    /// A mutation came back with `success: false`.
    #[error("the service rejected the request to {0}")]
    Rejected(&'static str),

    /// A successful mutation carried no record.
    #[error("no record returned after request to {0}")]
    NoRecord(&'static str),
}

/// Domain-level client for the record service.
#[derive(Debug)]
pub struct RecordClient<S> {
    service: S,
    notifications: Notifications,
}

impl<S: RecordService> RecordClient<S> {
    /// Wraps `service`, reporting failures to `notifications`.
    pub const fn new(service: S, notifications: Notifications) -> Self {
        Self {
            service,
            notifications,
        }
    }

    /// Underlying record service.
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// Shared notification log.
    pub const fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    fn report<T>(
        &self,
        operation: &'static str,
        user_message: &str,
        result: Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        if let Err(e) = &result {
            tracing::error!(operation, error = %e, "record service call failed");
            self.notifications.error(user_message);
        }
        result
    }

    /// Lists boards, newest first.
    ///
    /// # Errors
    ///
    /// Fails if the service call fails, returns no data payload, or returns
    /// a malformed record.
    pub async fn list_boards(&self) -> Result<Vec<Board>, RemoteError> {
        let result = self.fetch_boards().await;
        if let Ok(boards) = &result {
            tracing::debug!(count = boards.len(), "boards fetched");
        }
        self.report("list_boards", "Failed to load boards", result)
    }

    /// Creates a board from `draft`.
    ///
    /// # Errors
    ///
    /// Fails if the service call fails, reports non-success, or returns no
    /// usable record.
    pub async fn create_board(&self, draft: &BoardDraft) -> Result<Board, RemoteError> {
        let result = self
            .mutate(Resource::Board, board_record(draft), false, "create board")
            .await
            .and_then(|record| board_from_record(&record).map_err(RemoteError::from));
        self.report("create_board", "Failed to create board", result)
    }

    /// Saves name, description and tags of an existing board.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_board`].
    pub async fn update_board(&self, board: &Board) -> Result<Board, RemoteError> {
        let result = self
            .mutate(
                Resource::Board,
                board_update_record(board),
                true,
                "update board",
            )
            .await
            .and_then(|record| board_from_record(&record).map_err(RemoteError::from));
        self.report("update_board", "Failed to update board", result)
    }

    /// Deletes a board. Returns the service's success flag; a board that
    /// does not exist yields `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Fails only if the service call itself fails.
    pub async fn delete_board(&self, id: BoardId) -> Result<bool, RemoteError> {
        let result = self.delete(Resource::Board, id.get()).await;
        self.report("delete_board", "Failed to delete board", result)
    }

    /// Lists the tasks of `board_id`, newest first, capped at one page.
    ///
    /// # Errors
    ///
    /// Fails if the service call fails, returns no data payload, or returns
    /// a malformed record.
    pub async fn list_tasks(&self, board_id: BoardId) -> Result<Vec<Task>, RemoteError> {
        let result = self.fetch_tasks(board_id).await;
        if let Ok(tasks) = &result {
            tracing::debug!(board_id = %board_id, count = tasks.len(), "tasks fetched");
        }
        self.report("list_tasks", "Failed to load tasks", result)
    }

    /// Creates a task from `draft`, filling defaults for absent fields.
    ///
    /// # Errors
    ///
    /// Fails if the service call fails, reports non-success, or returns no
    /// usable record.
    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task, RemoteError> {
        let result = self
            .mutate(Resource::Task, task_record(draft, None), false, "create task")
            .await
            .and_then(|record| task_from_record(&record).map_err(RemoteError::from));
        self.report("create_task", "Failed to create task", result)
    }

    /// Replaces every editable field of task `id` with `draft`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_task`].
    pub async fn update_task(&self, id: TaskId, draft: &TaskDraft) -> Result<Task, RemoteError> {
        let result = self
            .mutate(Resource::Task, task_record(draft, Some(id)), true, "update task")
            .await
            .and_then(|record| task_from_record(&record).map_err(RemoteError::from));
        self.report("update_task", "Failed to update task", result)
    }

    /// Deletes a task. Returns the service's success flag.
    ///
    /// # Errors
    ///
    /// Fails only if the service call itself fails.
    pub async fn delete_task(&self, id: TaskId) -> Result<bool, RemoteError> {
        let result = self.delete(Resource::Task, id.get()).await;
        self.report("delete_task", "Failed to delete task", result)
    }

    /// Updates only the status field of task `id`. Returns the service's
    /// success flag.
    ///
    /// # Errors
    ///
    /// Fails only if the service call itself fails.
    pub async fn update_task_status(
        &self,
        id: TaskId,
        status: TaskStatus,
    ) -> Result<bool, RemoteError> {
        let result = self
            .service
            .update(Resource::Task, RecordsParams::single(status_patch(id, status)))
            .await
            .map(|response| response.success)
            .map_err(RemoteError::from);
        self.report(
            "update_task_status",
            "Failed to update task status",
            result,
        )
    }

    async fn fetch_boards(&self) -> Result<Vec<Board>, RemoteError> {
        let params = FetchParams::new()
            .with_fields(&BOARD_FIELDS)
            .order_by(fields::CREATED_ON, Direction::Desc)
            .paging(PAGE_SIZE, 0);
        let response = self.service.fetch(Resource::Board, params).await?;
        let records = response.data.ok_or(RemoteError::NoData)?;
        let mut boards = records
            .iter()
            .map(board_from_record)
            .collect::<Result<Vec<_>, _>>()?;
        boards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(boards)
    }

    async fn fetch_tasks(&self, board_id: BoardId) -> Result<Vec<Task>, RemoteError> {
        let params = FetchParams::new()
            .with_fields(&TASK_FIELDS)
            .exact_match(fields::BOARD, board_id.to_string())
            .order_by(fields::CREATED_ON, Direction::Desc)
            .paging(PAGE_SIZE, 0);
        let response = self.service.fetch(Resource::Task, params).await?;
        let records = response.data.ok_or(RemoteError::NoData)?;
        Ok(records
            .iter()
            .map(task_from_record)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn mutate(
        &self,
        resource: Resource,
        record: Record,
        existing: bool,
        operation: &'static str,
    ) -> Result<Record, RemoteError> {
        let params = RecordsParams::single(record);
        let response = if existing {
            self.service.update(resource, params).await?
        } else {
            self.service.create(resource, params).await?
        };
        if !response.success {
            return Err(RemoteError::Rejected(operation));
        }
        response
            .into_first_record()
            .ok_or(RemoteError::NoRecord(operation))
    }

    async fn delete(&self, resource: Resource, id: u64) -> Result<bool, RemoteError> {
        let params = DeleteParams {
            record_ids: vec![id],
        };
        let response = self.service.delete(resource, params).await?;
        Ok(response.success)
    }
}
