//! Integration tests for moving tasks between status columns.
//!
//! Runs the real sync worker ([`spawn_sync`]) over a [`LocalService`] so
//! status updates travel the same channel path as in the TUI.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use taskflow::app::App;
use taskflow::notify::{Level, Notifications};
use taskflow::records::RecordClient;
use taskflow::service::local::{Fault, LocalService};
use taskflow::sync::{DEFAULT_CHANNEL_CAPACITY, SyncCommand, SyncEvent, spawn_sync};
use taskflow::tasks::DragState;
use taskflow_proto::record::{FetchParams, fields};
use taskflow_proto::{Resource, TaskId, TaskStatus};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Worker {
    app: App,
    client: Arc<RecordClient<LocalService>>,
    tx: mpsc::Sender<SyncCommand>,
    rx: mpsc::Receiver<SyncEvent>,
}

impl Worker {
    async fn start() -> Self {
        let notifications = Notifications::new();
        let client = Arc::new(RecordClient::new(
            LocalService::with_demo_data().await,
            notifications.clone(),
        ));
        let (tx, rx) = spawn_sync(Arc::clone(&client), DEFAULT_CHANNEL_CAPACITY);
        let mut worker = Self {
            app: App::new(notifications),
            client,
            tx,
            rx,
        };
        let command = worker.app.load_boards();
        worker.round_trip(command).await;
        worker
    }

    /// Sends a command and applies events until no follow-up remains.
    async fn round_trip(&mut self, command: SyncCommand) {
        let mut next = Some(command);
        while let Some(command) = next.take() {
            self.tx.send(command).await.unwrap();
            let event = tokio::time::timeout(Duration::from_secs(5), self.rx.recv())
                .await
                .expect("sync event within timeout")
                .expect("worker alive");
            next = self.app.apply_event(event);
        }
    }

    fn task_in(&self, status: TaskStatus) -> TaskId {
        self.app
            .store
            .visible_columns()
            .get(status.column_index())
            .and_then(|column| column.first())
            .map(|task| task.id)
            .unwrap()
    }

    async fn remote_status(&self, id: TaskId) -> Option<String> {
        let params = FetchParams::new().exact_match(fields::ID, id.to_string());
        let rows = self
            .client
            .service()
            .store()
            .fetch(Resource::Task, &params)
            .await
            .data?;
        rows.first()
            .and_then(|row| row.get(fields::STATUS))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn todo_to_done_updates_cache_and_service() {
    let mut w = Worker::start().await;
    let id = w.task_in(TaskStatus::Todo);

    assert!(w.app.begin_drag(id));
    w.app.drag_over(TaskStatus::InProgress);
    w.app.drag_over(TaskStatus::Done);
    assert_eq!(w.app.drag.highlighted_column(), Some(TaskStatus::Done));

    let command = w.app.drop_task().unwrap();
    assert!(matches!(w.app.drag.state(), DragState::Dropping { .. }));
    w.round_trip(command).await;

    assert_eq!(w.app.store.find_task(id).unwrap().status, TaskStatus::Done);
    assert_eq!(w.app.drag.state(), DragState::Idle);
    let latest = w.app.notifications().latest().unwrap();
    assert_eq!(latest.message, "Task moved to Done");
    assert_eq!(latest.level, Level::Info);
    assert_eq!(w.remote_status(id).await.as_deref(), Some("done"));
}

#[tokio::test]
async fn rejected_move_leaves_task_in_place() {
    let mut w = Worker::start().await;
    let id = w.task_in(TaskStatus::Todo);
    w.client.service().inject(Fault::Rejected);

    w.app.begin_drag(id);
    w.app.drag_over(TaskStatus::Done);
    let command = w.app.drop_task().unwrap();
    w.round_trip(command).await;

    assert_eq!(w.app.store.find_task(id).unwrap().status, TaskStatus::Todo);
    assert!(!w.app.drag.is_dragging());
    assert_eq!(
        w.app.notifications().latest().unwrap().message,
        "Failed to update task status"
    );
    assert_eq!(w.remote_status(id).await.as_deref(), Some("todo"));
}

#[tokio::test]
async fn unreachable_service_notifies_once() {
    let mut w = Worker::start().await;
    let id = w.task_in(TaskStatus::InProgress);
    w.client.service().inject(Fault::Unavailable);
    let before = w.app.notifications().len();

    w.app.begin_drag(id);
    w.app.drag_over(TaskStatus::Todo);
    let command = w.app.drop_task().unwrap();
    w.round_trip(command).await;

    assert_eq!(w.app.notifications().len(), before + 1);
    assert_eq!(
        w.app.store.find_task(id).unwrap().status,
        TaskStatus::InProgress
    );
    assert!(!w.app.drag.is_dragging());
}

#[tokio::test]
async fn dropping_on_the_origin_column_is_a_no_op() {
    let mut w = Worker::start().await;
    let id = w.task_in(TaskStatus::Done);
    let calls = w.client.service().call_count();

    w.app.begin_drag(id);
    w.app.drag_over(TaskStatus::Done);
    assert!(w.app.drop_task().is_none());

    assert_eq!(w.client.service().call_count(), calls);
    assert_eq!(w.app.drag.state(), DragState::Idle);
}

#[tokio::test]
async fn drop_outside_any_column_is_ignored() {
    let mut w = Worker::start().await;
    let id = w.task_in(TaskStatus::Todo);

    w.app.begin_drag(id);
    assert!(w.app.drop_task().is_none());
    assert!(!w.app.drag.is_dragging());
    assert_eq!(w.app.store.find_task(id).unwrap().status, TaskStatus::Todo);
}

#[tokio::test]
async fn new_drag_waits_for_pending_drop() {
    let mut w = Worker::start().await;
    let first = w.task_in(TaskStatus::Todo);
    let other = w.task_in(TaskStatus::InProgress);

    w.app.begin_drag(first);
    w.app.drag_over(TaskStatus::Done);
    let command = w.app.drop_task().unwrap();
    assert!(!w.app.begin_drag(other));

    w.round_trip(command).await;
    assert!(w.app.begin_drag(other));
}

#[tokio::test]
async fn moved_task_changes_visible_columns() {
    let mut w = Worker::start().await;
    let before = w.app.store.visible_columns().map(|c| c.len());
    let id = w.task_in(TaskStatus::Todo);

    w.app.begin_drag(id);
    w.app.drag_over(TaskStatus::InProgress);
    let command = w.app.drop_task().unwrap();
    w.round_trip(command).await;

    let after = w.app.store.visible_columns().map(|c| c.len());
    assert_eq!(after[0], before[0] - 1);
    assert_eq!(after[1], before[1] + 1);
    assert_eq!(after[2], before[2]);
}
