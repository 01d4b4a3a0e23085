//! Local cache of remote boards and tasks.
//!
//! [`CacheStore`] is owned by the application state and only touched by the
//! UI loop. Fetches go through `begin_* → *_loaded | *_failed`; mutations are
//! applied directly, after the remote call has succeeded.
//!
//! Every fetch carries a ticket ([`BoardsTicket`], [`FetchTicket`]) drawn from
//! one sequence that mutations also advance. A response is applied only if
//! its ticket is the newest for that list and no mutation of the list landed
//! after the ticket was issued; otherwise it is dropped, and in the second
//! case the list is fetched again.

use std::collections::HashMap;

use taskflow_proto::{Board, BoardId, Task, TaskId, TaskStatus};

use crate::tasks::{FilterUpdate, TaskFilter, filter_and_sort, group_by_status};

/// Fetch lifecycle of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Never fetched.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// Last fetch succeeded.
    Success,
    /// Last fetch failed with this message.
    Error(String),
}

impl LoadState {
    /// Error message, if the last fetch failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// A cached collection and its fetch state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection<T> {
    /// Cached records, newest first.
    pub items: Vec<T>,
    /// Fetch state.
    pub state: LoadState,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            state: LoadState::Idle,
        }
    }
}

/// Identifies one board-list fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardsTicket {
    /// Sequence number, increasing per store.
    pub seq: u64,
}

/// Identifies one task-list fetch for a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    /// Board whose tasks are fetched.
    pub board_id: BoardId,
    /// Sequence number, increasing per store.
    pub seq: u64,
}

/// What became of a fetched list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the cached list.
    Applied,
    /// A newer fetch of the same list was issued; the response was dropped.
    Superseded,
    /// The list changed locally after the fetch was issued; the response was
    /// dropped and the list needs a new fetch.
    Outdated,
}

#[derive(Debug, Default)]
struct BoardTasks {
    tasks: Collection<Task>,
    latest_seq: u64,
    mutated_seq: u64,
}

/// Cache of boards, their tasks, the selected board, and the filter.
#[derive(Debug, Default)]
pub struct CacheStore {
    boards: Collection<Board>,
    boards_seq: u64,
    boards_mutated_seq: u64,
    tasks: HashMap<BoardId, BoardTasks>,
    selected: Option<BoardId>,
    filter: TaskFilter,
    next_seq: u64,
}

impl CacheStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- boards ---

    /// Cached boards.
    #[must_use]
    pub const fn boards(&self) -> &Collection<Board> {
        &self.boards
    }

    const fn issue_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Marks the board list as loading, clears its error and issues a new
    /// ticket.
    pub fn begin_boards_fetch(&mut self) -> BoardsTicket {
        let seq = self.issue_seq();
        self.boards_seq = seq;
        self.boards.state = LoadState::Loading;
        BoardsTicket { seq }
    }

    /// Replaces the board list and re-establishes the selection invariant.
    pub fn boards_loaded(&mut self, ticket: BoardsTicket, boards: Vec<Board>) -> FetchOutcome {
        if ticket.seq != self.boards_seq {
            tracing::debug!(seq = ticket.seq, "discarding stale board list");
            return FetchOutcome::Superseded;
        }
        if self.boards_mutated_seq > ticket.seq {
            tracing::debug!(seq = ticket.seq, "board list predates a local change");
            return FetchOutcome::Outdated;
        }
        self.boards.items = boards;
        self.boards.state = LoadState::Success;
        let keep = self
            .selected
            .is_some_and(|id| self.boards.items.iter().any(|b| b.id == id));
        if !keep {
            self.selected = self.boards.items.first().map(|b| b.id);
        }
        FetchOutcome::Applied
    }

    /// Records a failed board fetch. Cached boards are kept. Returns `false`
    /// if the ticket is stale.
    pub fn boards_failed(&mut self, ticket: BoardsTicket, message: impl Into<String>) -> bool {
        if ticket.seq != self.boards_seq {
            return false;
        }
        self.boards.state = LoadState::Error(message.into());
        true
    }

    const fn mark_boards_mutated(&mut self) {
        self.boards_mutated_seq = self.issue_seq();
    }

    /// Adds a board at the front, or replaces one with the same id.
    pub fn add_board(&mut self, board: Board) {
        self.mark_boards_mutated();
        if let Some(existing) = self.boards.items.iter_mut().find(|b| b.id == board.id) {
            *existing = board;
        } else {
            self.boards.items.insert(0, board);
        }
    }

    /// Replaces a cached board. Returns `false` if it is not cached.
    pub fn update_board(&mut self, board: Board) -> bool {
        self.mark_boards_mutated();
        match self.boards.items.iter_mut().find(|b| b.id == board.id) {
            Some(existing) => {
                *existing = board;
                true
            }
            None => false,
        }
    }

    /// Removes a board and its cached tasks.
    ///
    /// If the removed board was selected, the first remaining board becomes
    /// selected. Removing an absent board is a no-op.
    pub fn remove_board(&mut self, id: BoardId) -> bool {
        self.mark_boards_mutated();
        let before = self.boards.items.len();
        self.boards.items.retain(|b| b.id != id);
        self.tasks.remove(&id);
        if self.selected == Some(id) {
            self.selected = self.boards.items.first().map(|b| b.id);
        }
        self.boards.items.len() != before
    }

    /// Selects a cached board. Returns `false` if the id is unknown.
    pub fn select_board(&mut self, id: BoardId) -> bool {
        if self.boards.items.iter().any(|b| b.id == id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    /// Id of the selected board.
    #[must_use]
    pub const fn selected_board_id(&self) -> Option<BoardId> {
        self.selected
    }

    /// The selected board.
    #[must_use]
    pub fn selected_board(&self) -> Option<&Board> {
        let id = self.selected?;
        self.boards.items.iter().find(|b| b.id == id)
    }

    // --- tasks ---

    /// Cached task collection of a board.
    #[must_use]
    pub fn tasks(&self, board_id: BoardId) -> Option<&Collection<Task>> {
        self.tasks.get(&board_id).map(|b| &b.tasks)
    }

    /// Whether the board's tasks were never fetched or the last fetch failed.
    #[must_use]
    pub fn needs_task_fetch(&self, board_id: BoardId) -> bool {
        self.tasks.get(&board_id).is_none_or(|b| {
            matches!(b.tasks.state, LoadState::Idle | LoadState::Error(_))
        })
    }

    /// Marks the board's tasks as loading and issues a new ticket.
    pub fn begin_tasks_fetch(&mut self, board_id: BoardId) -> FetchTicket {
        let seq = self.issue_seq();
        let entry = self.tasks.entry(board_id).or_default();
        entry.latest_seq = seq;
        entry.tasks.state = LoadState::Loading;
        FetchTicket { board_id, seq }
    }

    fn is_current(&self, ticket: FetchTicket) -> bool {
        self.tasks
            .get(&ticket.board_id)
            .is_some_and(|b| b.latest_seq == ticket.seq)
    }

    /// Applies a task-list fetch.
    pub fn tasks_loaded(&mut self, ticket: FetchTicket, tasks: Vec<Task>) -> FetchOutcome {
        let Some(entry) = self
            .tasks
            .get_mut(&ticket.board_id)
            .filter(|b| b.latest_seq == ticket.seq)
        else {
            tracing::debug!(board_id = %ticket.board_id, seq = ticket.seq, "discarding stale task list");
            return FetchOutcome::Superseded;
        };
        if entry.mutated_seq > ticket.seq {
            tracing::debug!(board_id = %ticket.board_id, seq = ticket.seq, "task list predates a local change");
            return FetchOutcome::Outdated;
        }
        entry.tasks.items = tasks;
        entry.tasks.state = LoadState::Success;
        FetchOutcome::Applied
    }

    /// Records a failed task-list fetch. Returns `false` if the ticket is stale.
    pub fn tasks_failed(&mut self, ticket: FetchTicket, message: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        if let Some(entry) = self.tasks.get_mut(&ticket.board_id) {
            entry.tasks.state = LoadState::Error(message.into());
        }
        true
    }

    fn mark_tasks_mutated(&mut self, board_id: BoardId) {
        let seq = self.issue_seq();
        self.tasks.entry(board_id).or_default().mutated_seq = seq;
    }

    /// Adds a task at the front of its board, or replaces one with the same id.
    pub fn add_task(&mut self, task: Task) {
        self.mark_tasks_mutated(task.board_id);
        let items = &mut self.tasks.entry(task.board_id).or_default().tasks.items;
        if let Some(existing) = items.iter_mut().find(|t| t.id == task.id) {
            *existing = task;
        } else {
            items.insert(0, task);
        }
    }

    /// Replaces a cached task. A task whose board changed moves to the new
    /// board's list. Returns `false` if it is not cached.
    pub fn update_task(&mut self, task: Task) -> bool {
        let Some(old_board) = self.find_task(task.id).map(|t| t.board_id) else {
            return false;
        };
        if old_board == task.board_id {
            self.mark_tasks_mutated(old_board);
            if let Some(existing) = self.task_mut(task.id) {
                *existing = task;
            }
        } else {
            self.remove_task(task.id);
            self.add_task(task);
        }
        true
    }

    /// Sets the status of a cached task.
    pub fn set_task_status(&mut self, id: TaskId, status: TaskStatus) -> bool {
        let Some(task) = self.task_mut(id) else {
            return false;
        };
        task.status = status;
        let board_id = task.board_id;
        self.mark_tasks_mutated(board_id);
        true
    }

    /// Removes a task from whichever board holds it. Absent tasks are a no-op.
    pub fn remove_task(&mut self, id: TaskId) -> bool {
        let seq = self.next_seq + 1;
        let mut removed = false;
        for entry in self.tasks.values_mut() {
            let before = entry.tasks.items.len();
            entry.tasks.items.retain(|t| t.id != id);
            if entry.tasks.items.len() != before {
                entry.mutated_seq = seq;
                removed = true;
            }
        }
        if removed {
            self.next_seq = seq;
        }
        removed
    }

    /// Looks up a cached task by id.
    #[must_use]
    pub fn find_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks
            .values()
            .flat_map(|b| b.tasks.items.iter())
            .find(|t| t.id == id)
    }

    fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks
            .values_mut()
            .flat_map(|b| b.tasks.items.iter_mut())
            .find(|t| t.id == id)
    }

    // --- filter ---

    /// Current filter state.
    #[must_use]
    pub const fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    /// Applies a partial filter change.
    pub fn update_filter(&mut self, update: FilterUpdate) {
        self.filter.apply(update);
    }

    /// Filtered, sorted tasks of the selected board split into columns.
    #[must_use]
    pub fn visible_columns(&self) -> [Vec<&Task>; 3] {
        let tasks = self
            .selected
            .and_then(|id| self.tasks.get(&id))
            .map_or(&[][..], |b| b.tasks.items.as_slice());
        group_by_status(&filter_and_sort(tasks, &self.filter))
    }
}
