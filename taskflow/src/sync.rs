//! Background sync worker wiring the UI loop to the record client.
//!
//! The UI loop is synchronous (crossterm poll-based) and never awaits a
//! remote call. It sends [`SyncCommand`]s; a dispatcher on the tokio runtime
//! runs each command in its own task and sends the outcome back as a
//! [`SyncEvent`], which the UI drains on every tick.
//!
//! ```text
//! UI loop  ←── SyncEvent ───  worker tasks ──▶ RecordClient ──▶ RecordService
//!          ─── SyncCommand →
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

use taskflow_proto::{Board, BoardDraft, BoardId, Task, TaskDraft, TaskId, TaskStatus};

use crate::records::{RecordClient, RemoteError};
use crate::service::RecordService;
use crate::store::{BoardsTicket, FetchTicket};

/// Default capacity of the command and event channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Work requested by the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    /// Fetch the board list.
    LoadBoards(BoardsTicket),
    /// Fetch the tasks of a board.
    LoadTasks(FetchTicket),
    /// Create a board.
    CreateBoard(BoardDraft),
    /// Replace a board's fields.
    UpdateBoard(Board),
    /// Delete a board.
    DeleteBoard(BoardId),
    /// Create a task.
    CreateTask(TaskDraft),
    /// Replace a task's fields.
    UpdateTask {
        /// Task to update.
        id: TaskId,
        /// New field values.
        draft: TaskDraft,
    },
    /// Delete a task.
    DeleteTask(TaskId),
    /// Change only a task's status (drag-and-drop).
    MoveTask {
        /// Task to move.
        task: TaskId,
        /// Destination status.
        to: TaskStatus,
    },
    /// Stop the dispatcher.
    Shutdown,
}

/// Outcome of a [`SyncCommand`], delivered to the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Board list fetched.
    BoardsLoaded {
        /// Ticket issued when the fetch began.
        ticket: BoardsTicket,
        /// Fetched boards.
        result: Result<Vec<Board>, RemoteError>,
    },
    /// Task list fetched.
    TasksLoaded {
        /// Ticket issued when the fetch began.
        ticket: FetchTicket,
        /// Fetched tasks.
        result: Result<Vec<Task>, RemoteError>,
    },
    /// Board created.
    BoardCreated(Result<Board, RemoteError>),
    /// Board updated.
    BoardUpdated(Result<Board, RemoteError>),
    /// Board delete finished.
    BoardDeleted {
        /// Board that was deleted.
        id: BoardId,
        /// Success flag reported by the service.
        result: Result<bool, RemoteError>,
    },
    /// Task created.
    TaskCreated(Result<Task, RemoteError>),
    /// Task updated.
    TaskUpdated(Result<Task, RemoteError>),
    /// Task delete finished.
    TaskDeleted {
        /// Task that was deleted.
        id: TaskId,
        /// Success flag reported by the service.
        result: Result<bool, RemoteError>,
    },
    /// Status-only update finished.
    TaskMoved {
        /// Task that was moved.
        task: TaskId,
        /// Destination status.
        to: TaskStatus,
        /// Success flag reported by the service.
        result: Result<bool, RemoteError>,
    },
}

/// Runs one command against the client. `Shutdown` yields no event.
pub async fn execute<S: RecordService>(
    client: &RecordClient<S>,
    command: SyncCommand,
) -> Option<SyncEvent> {
    let event = match command {
        SyncCommand::LoadBoards(ticket) => SyncEvent::BoardsLoaded {
            ticket,
            result: client.list_boards().await,
        },
        SyncCommand::LoadTasks(ticket) => SyncEvent::TasksLoaded {
            ticket,
            result: client.list_tasks(ticket.board_id).await,
        },
        SyncCommand::CreateBoard(draft) => {
            SyncEvent::BoardCreated(client.create_board(&draft).await)
        }
        SyncCommand::UpdateBoard(board) => {
            SyncEvent::BoardUpdated(client.update_board(&board).await)
        }
        SyncCommand::DeleteBoard(id) => SyncEvent::BoardDeleted {
            id,
            result: client.delete_board(id).await,
        },
        SyncCommand::CreateTask(draft) => SyncEvent::TaskCreated(client.create_task(&draft).await),
        SyncCommand::UpdateTask { id, draft } => {
            SyncEvent::TaskUpdated(client.update_task(id, &draft).await)
        }
        SyncCommand::DeleteTask(id) => SyncEvent::TaskDeleted {
            id,
            result: client.delete_task(id).await,
        },
        SyncCommand::MoveTask { task, to } => SyncEvent::TaskMoved {
            task,
            to,
            result: client.update_task_status(task, to).await,
        },
        SyncCommand::Shutdown => return None,
    };
    Some(event)
}

/// Spawns the dispatcher and returns its channel handles.
///
/// Each command runs in its own tokio task so a slow call never delays the
/// others; completions may therefore arrive out of order.
pub fn spawn_sync<S>(
    client: Arc<RecordClient<S>>,
    capacity: usize,
) -> (mpsc::Sender<SyncCommand>, mpsc::Receiver<SyncEvent>)
where
    S: RecordService + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel::<SyncCommand>(capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<SyncEvent>(capacity);
    tokio::spawn(dispatcher(client, cmd_rx, evt_tx));
    (cmd_tx, evt_rx)
}

async fn dispatcher<S>(
    client: Arc<RecordClient<S>>,
    mut cmd_rx: mpsc::Receiver<SyncCommand>,
    evt_tx: mpsc::Sender<SyncEvent>,
) where
    S: RecordService + 'static,
{
    while let Some(command) = cmd_rx.recv().await {
        if command == SyncCommand::Shutdown {
            tracing::info!("sync worker shutting down");
            break;
        }
        tracing::debug!(?command, "dispatching");
        let client = Arc::clone(&client);
        let evt_tx = evt_tx.clone();
        tokio::spawn(async move {
            if let Some(event) = execute(&client, command).await
                && evt_tx.send(event).await.is_err()
            {
                tracing::debug!("ui loop gone, dropping sync event");
            }
        });
    }
}
