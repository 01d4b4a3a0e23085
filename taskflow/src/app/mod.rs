//! Application state and intent handling.
//!
//! [`App`] owns the [`CacheStore`] and every piece of UI state. User intents
//! (from [`App::handle_key_event`] or called directly) never touch the
//! network: they validate locally and return the [`SyncCommand`] to run.
//! Outcomes come back through [`App::apply_event`], which is the only place
//! remote results reach the store.

pub mod keys;

use std::collections::HashSet;

use taskflow_proto::{Board, BoardId, Task, TaskId, TaskStatus};

use crate::notify::Notifications;
use crate::store::{CacheStore, FetchOutcome};
use crate::sync::{SyncCommand, SyncEvent};
use crate::tasks::{
    BoardForm, DragMachine, DropOutcome, FilterUpdate, FormMode, TaskForm, ValidationError,
};

/// Default maximum task title length accepted by the form.
pub const DEFAULT_MAX_TITLE_LEN: usize = taskflow_proto::task::DEFAULT_MAX_TITLE_LENGTH;

/// Default display format for due dates.
pub const DEFAULT_DATE_FORMAT: &str = "%b %d, %Y";

/// Which panel has keyboard focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    /// Board list.
    Sidebar,
    /// Status columns.
    #[default]
    Columns,
}

/// A modal surface capturing keyboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Task create/edit form.
    Task(TaskForm),
    /// Board create/rename form.
    Board(BoardForm),
    /// Search term entry.
    Search,
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Cached remote state and filter.
    pub store: CacheStore,
    /// Drag-and-drop controller.
    pub drag: DragMachine,
    /// Focused panel.
    pub focus: Focus,
    /// Open modal, if any.
    pub modal: Option<Modal>,
    /// Cursor in the board list.
    pub sidebar_cursor: usize,
    /// Focused status column.
    pub column: TaskStatus,
    /// Cursor row within the focused column.
    pub row: usize,
    /// Whether the dark palette is active.
    pub dark_mode: bool,
    /// Whether the app should quit.
    pub should_quit: bool,
    notifications: Notifications,
    max_task_title_len: usize,
    date_format: String,
    deleting_boards: HashSet<BoardId>,
    deleting_tasks: HashSet<TaskId>,
    theme_changed: bool,
}

impl App {
    /// Creates an application reporting to `notifications`.
    #[must_use]
    pub fn new(notifications: Notifications) -> Self {
        Self {
            store: CacheStore::new(),
            drag: DragMachine::new(),
            focus: Focus::default(),
            modal: None,
            sidebar_cursor: 0,
            column: TaskStatus::Todo,
            row: 0,
            dark_mode: true,
            should_quit: false,
            notifications,
            max_task_title_len: DEFAULT_MAX_TITLE_LEN,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            deleting_boards: HashSet::new(),
            deleting_tasks: HashSet::new(),
            theme_changed: false,
        }
    }

    /// Sets the maximum accepted task title length.
    #[must_use]
    pub const fn with_max_task_title_len(mut self, max: usize) -> Self {
        self.max_task_title_len = max;
        self
    }

    /// Sets the initial theme.
    #[must_use]
    pub const fn with_dark_mode(mut self, dark: bool) -> Self {
        self.dark_mode = dark;
        self
    }

    /// Sets the `chrono` format used to display due dates.
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Shared notification log.
    #[must_use]
    pub const fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// Display format for due dates.
    #[must_use]
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Maximum accepted task title length.
    #[must_use]
    pub const fn max_task_title_len(&self) -> usize {
        self.max_task_title_len
    }

    fn reject(&self, error: &ValidationError) {
        tracing::debug!(%error, "validation failed");
        self.notifications.error(error.to_string());
    }

    // --- boards ---

    /// Starts a full board reload; also the recovery action after a failed
    /// fetch. Once the boards arrive, the selected board's tasks are fetched
    /// again if their last fetch failed.
    pub fn load_boards(&mut self) -> SyncCommand {
        SyncCommand::LoadBoards(self.store.begin_boards_fetch())
    }

    /// Issues a task fetch for the selected board if it was never fetched or
    /// its last fetch failed.
    fn ensure_tasks(&mut self) -> Option<SyncCommand> {
        let board_id = self.store.selected_board_id()?;
        self.store
            .needs_task_fetch(board_id)
            .then(|| SyncCommand::LoadTasks(self.store.begin_tasks_fetch(board_id)))
    }

    fn sync_sidebar_cursor(&mut self) {
        let selected = self.store.selected_board_id();
        self.sidebar_cursor = self
            .store
            .boards()
            .items
            .iter()
            .position(|b| Some(b.id) == selected)
            .unwrap_or(0);
    }

    /// Selects a board; fetches its tasks the first time it is shown.
    pub fn select_board(&mut self, id: BoardId) -> Option<SyncCommand> {
        if !self.store.select_board(id) {
            return None;
        }
        self.sync_sidebar_cursor();
        self.row = 0;
        self.drag.cancel();
        self.ensure_tasks()
    }

    /// Opens the board form for a new board.
    pub fn open_board_form(&mut self) {
        self.modal = Some(Modal::Board(BoardForm::new()));
    }

    /// Opens the board form pre-filled from the selected board.
    pub fn open_board_edit_form(&mut self) {
        if let Some(board) = self.store.selected_board() {
            self.modal = Some(Modal::Board(BoardForm::edit(board)));
        }
    }

    /// Validates and submits the open board form.
    pub fn submit_board_form(&mut self) -> Option<SyncCommand> {
        let Some(Modal::Board(form)) = &mut self.modal else {
            return None;
        };
        let editing = form.editing;
        let draft = match form.submit() {
            Ok(draft) => draft?,
            Err(error) => {
                self.reject(&error);
                return None;
            }
        };
        match editing {
            None => Some(SyncCommand::CreateBoard(draft)),
            Some(id) => {
                let Some(current) = self.store.boards().items.iter().find(|b| b.id == id) else {
                    self.modal = None;
                    return None;
                };
                Some(SyncCommand::UpdateBoard(Board {
                    name: draft.name,
                    description: draft.description,
                    ..current.clone()
                }))
            }
        }
    }

    /// Requests deletion of a board. Refused when it is the only board.
    pub fn delete_board(&mut self, id: BoardId) -> Option<SyncCommand> {
        if self.store.boards().items.len() <= 1 {
            self.reject(&ValidationError::LastBoard);
            return None;
        }
        if !self.deleting_boards.insert(id) {
            return None;
        }
        Some(SyncCommand::DeleteBoard(id))
    }

    /// Requests deletion of the selected board.
    pub fn delete_selected_board(&mut self) -> Option<SyncCommand> {
        let id = self.store.selected_board_id()?;
        self.delete_board(id)
    }

    // --- tasks ---

    /// Tasks of the focused column, filtered and sorted.
    #[must_use]
    pub fn focused_column_tasks(&self) -> Vec<&Task> {
        let [todo, doing, done] = self.store.visible_columns();
        match self.column {
            TaskStatus::Todo => todo,
            TaskStatus::InProgress => doing,
            TaskStatus::Done => done,
        }
    }

    /// Task under the cursor.
    #[must_use]
    pub fn focused_task(&self) -> Option<&Task> {
        self.focused_column_tasks().get(self.row).copied()
    }

    /// Moves the column cursor; while dragging this is a drag-over.
    pub fn move_column(&mut self, forward: bool) {
        let index = self.column.column_index();
        let next = if forward {
            (index + 1).min(2)
        } else {
            index.saturating_sub(1)
        };
        self.column = TaskStatus::from_column_index(next).unwrap_or(self.column);
        if self.drag.is_dragging() {
            self.drag.over(self.column);
        } else {
            self.row = 0;
        }
    }

    /// Moves the row cursor within the focused column.
    pub fn move_row(&mut self, down: bool) {
        let len = self.focused_column_tasks().len();
        self.row = if down {
            (self.row + 1).min(len.saturating_sub(1))
        } else {
            self.row.saturating_sub(1)
        };
    }

    /// Opens the task form for a new task on the selected board.
    pub fn open_task_form(&mut self) {
        match self.store.selected_board_id() {
            Some(board_id) => self.modal = Some(Modal::Task(TaskForm::create(board_id))),
            None => self.notifications.info("Create a board first"),
        }
    }

    /// Opens the task form pre-filled from the focused task.
    pub fn open_edit_form(&mut self) {
        if let Some(task) = self.focused_task() {
            let form = TaskForm::edit(task);
            self.modal = Some(Modal::Task(form));
        }
    }

    /// Opens the task form pre-filled from a cached task.
    pub fn edit_task(&mut self, id: TaskId) {
        if let Some(task) = self.store.find_task(id) {
            let form = TaskForm::edit(task);
            self.modal = Some(Modal::Task(form));
        }
    }

    /// Validates and submits the open task form.
    pub fn submit_task_form(&mut self) -> Option<SyncCommand> {
        let max = self.max_task_title_len;
        let Some(Modal::Task(form)) = &mut self.modal else {
            return None;
        };
        let mode = form.mode;
        let draft = match form.submit(max) {
            Ok(draft) => draft?,
            Err(error) => {
                self.reject(&error);
                return None;
            }
        };
        Some(match mode {
            FormMode::Create => SyncCommand::CreateTask(draft),
            FormMode::Edit(id) => SyncCommand::UpdateTask { id, draft },
        })
    }

    /// Requests deletion of a task. Repeated requests while one is in
    /// flight are ignored.
    pub fn delete_task(&mut self, id: TaskId) -> Option<SyncCommand> {
        self.deleting_tasks
            .insert(id)
            .then_some(SyncCommand::DeleteTask(id))
    }

    /// Requests deletion of the focused task.
    pub fn delete_focused_task(&mut self) -> Option<SyncCommand> {
        let id = self.focused_task()?.id;
        self.delete_task(id)
    }

    // --- drag and drop ---

    /// Picks up a task for dragging.
    pub fn begin_drag(&mut self, id: TaskId) -> bool {
        let Some(status) = self.store.find_task(id).map(|t| t.status) else {
            return false;
        };
        self.drag.start(id, status)
    }

    /// Picks up the focused task.
    pub fn begin_drag_focused(&mut self) -> bool {
        match self.focused_task().map(|t| t.id) {
            Some(id) => self.begin_drag(id),
            None => false,
        }
    }

    /// Hovers the dragged task over a column.
    pub fn drag_over(&mut self, column: TaskStatus) {
        self.drag.over(column);
    }

    /// Drops the dragged task; returns the status update to run, if any.
    pub fn drop_task(&mut self) -> Option<SyncCommand> {
        match self.drag.drop() {
            DropOutcome::Move { task, to, .. } => Some(SyncCommand::MoveTask { task, to }),
            DropOutcome::Unchanged | DropOutcome::Ignored => None,
        }
    }

    // --- filter and theme ---

    /// Applies a partial filter change and resets the row cursor.
    pub fn update_filter(&mut self, update: FilterUpdate) {
        self.store.update_filter(update);
        self.row = 0;
    }

    /// Cycles the priority filter.
    pub fn cycle_priority_filter(&mut self) {
        let next = self.store.filter().priority.next();
        self.update_filter(FilterUpdate {
            priority: Some(next),
            ..FilterUpdate::default()
        });
    }

    /// Cycles the sort key.
    pub fn cycle_sort_key(&mut self) {
        let next = self.store.filter().sort_key.next();
        self.update_filter(FilterUpdate {
            sort_key: Some(next),
            ..FilterUpdate::default()
        });
    }

    /// Flips the sort direction.
    pub fn toggle_sort_direction(&mut self) {
        let next = self.store.filter().direction.toggle();
        self.update_filter(FilterUpdate {
            direction: Some(next),
            ..FilterUpdate::default()
        });
    }

    /// Replaces the search term.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.update_filter(FilterUpdate {
            search: Some(term.into()),
            ..FilterUpdate::default()
        });
    }

    /// Switches between the dark and light palettes.
    pub const fn toggle_theme(&mut self) {
        self.dark_mode = !self.dark_mode;
        self.theme_changed = true;
    }

    /// Returns the new theme once after each toggle, for persisting.
    pub const fn take_theme_change(&mut self) -> Option<bool> {
        if self.theme_changed {
            self.theme_changed = false;
            Some(self.dark_mode)
        } else {
            None
        }
    }

    /// Releases the guards taken for a command that was never sent.
    pub fn abandon(&mut self, command: &SyncCommand) {
        match command {
            SyncCommand::LoadBoards(ticket) => {
                self.store.boards_failed(*ticket, "Failed to load boards");
            }
            SyncCommand::LoadTasks(ticket) => {
                self.store.tasks_failed(*ticket, "Failed to load tasks");
            }
            SyncCommand::CreateBoard(_) | SyncCommand::UpdateBoard(_) => self.board_form_failed(),
            SyncCommand::CreateTask(_) | SyncCommand::UpdateTask { .. } => self.task_form_failed(),
            SyncCommand::DeleteBoard(id) => {
                self.deleting_boards.remove(id);
            }
            SyncCommand::DeleteTask(id) => {
                self.deleting_tasks.remove(id);
            }
            SyncCommand::MoveTask { task, .. } => self.drag.finish(*task),
            SyncCommand::Shutdown => {}
        }
    }

    // --- outcomes ---

    fn close_task_form(&mut self) {
        if matches!(self.modal, Some(Modal::Task(_))) {
            self.modal = None;
        }
    }

    fn close_board_form(&mut self) {
        if matches!(self.modal, Some(Modal::Board(_))) {
            self.modal = None;
        }
    }

    fn task_form_failed(&mut self) {
        if let Some(Modal::Task(form)) = &mut self.modal {
            form.submit_failed();
        }
    }

    fn board_form_failed(&mut self) {
        if let Some(Modal::Board(form)) = &mut self.modal {
            form.submit_failed();
        }
    }

    fn clamp_row(&mut self) {
        let len = self.focused_column_tasks().len();
        self.row = self.row.min(len.saturating_sub(1));
    }

    /// Applies the outcome of a sync command.
    ///
    /// Remote errors were already reported by the record client; only
    /// negative success flags and successes are notified here. Returns a
    /// follow-up command when the outcome requires one: a task fetch for a
    /// newly selected board, or a refetch of a list that changed locally
    /// while its fetch was in flight.
    pub fn apply_event(&mut self, event: SyncEvent) -> Option<SyncCommand> {
        let follow_up = match event {
            SyncEvent::BoardsLoaded {
                ticket,
                result: Ok(boards),
            } => match self.store.boards_loaded(ticket, boards) {
                FetchOutcome::Applied => {
                    self.sync_sidebar_cursor();
                    self.ensure_tasks()
                }
                FetchOutcome::Outdated => Some(self.load_boards()),
                FetchOutcome::Superseded => None,
            },
            SyncEvent::BoardsLoaded {
                ticket,
                result: Err(error),
            } => {
                self.store.boards_failed(ticket, error.to_string());
                None
            }
            SyncEvent::TasksLoaded {
                ticket,
                result: Ok(tasks),
            } => match self.store.tasks_loaded(ticket, tasks) {
                FetchOutcome::Outdated => Some(SyncCommand::LoadTasks(
                    self.store.begin_tasks_fetch(ticket.board_id),
                )),
                FetchOutcome::Applied | FetchOutcome::Superseded => None,
            },
            SyncEvent::TasksLoaded {
                ticket,
                result: Err(error),
            } => {
                self.store.tasks_failed(ticket, error.to_string());
                None
            }
            SyncEvent::BoardCreated(Ok(board)) => {
                self.close_board_form();
                let id = board.id;
                self.store.add_board(board);
                self.notifications.success("Board created successfully");
                self.select_board(id)
            }
            SyncEvent::BoardUpdated(Ok(board)) => {
                self.close_board_form();
                self.store.update_board(board);
                self.notifications.success("Board updated successfully");
                None
            }
            SyncEvent::BoardCreated(Err(_)) | SyncEvent::BoardUpdated(Err(_)) => {
                self.board_form_failed();
                None
            }
            SyncEvent::BoardDeleted { id, result } => {
                self.deleting_boards.remove(&id);
                match result {
                    Ok(true) => {
                        self.store.remove_board(id);
                        self.notifications.success("Board deleted successfully");
                        self.sync_sidebar_cursor();
                        self.row = 0;
                        self.ensure_tasks()
                    }
                    Ok(false) => {
                        self.notifications.error("Failed to delete board");
                        None
                    }
                    Err(_) => None,
                }
            }
            SyncEvent::TaskCreated(Ok(task)) => {
                self.close_task_form();
                self.store.add_task(task);
                self.notifications.success("Task created successfully");
                None
            }
            SyncEvent::TaskUpdated(Ok(task)) => {
                self.close_task_form();
                if !self.store.update_task(task.clone()) {
                    self.store.add_task(task);
                }
                self.notifications.success("Task updated successfully");
                None
            }
            SyncEvent::TaskCreated(Err(_)) | SyncEvent::TaskUpdated(Err(_)) => {
                self.task_form_failed();
                None
            }
            SyncEvent::TaskDeleted { id, result } => {
                self.deleting_tasks.remove(&id);
                match result {
                    Ok(true) => {
                        self.store.remove_task(id);
                        self.notifications.success("Task deleted");
                    }
                    Ok(false) => self.notifications.error("Failed to delete task"),
                    Err(_) => {}
                }
                None
            }
            SyncEvent::TaskMoved { task, to, result } => {
                self.drag.finish(task);
                match result {
                    Ok(true) => {
                        self.store.set_task_status(task, to);
                        self.notifications
                            .info(format!("Task moved to {}", to.label()));
                    }
                    Ok(false) => self.notifications.error("Failed to update task status"),
                    Err(_) => {}
                }
                None
            }
        };
        self.clamp_row();
        follow_up
    }
}
