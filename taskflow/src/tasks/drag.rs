//! Drag-and-drop state machine for moving tasks between status columns.
//!
//! ```text
//! Idle ──start──▶ Dragging ──over──▶ OverColumn ──drop──▶ Dropping ──finish──▶ Idle
//!                    │                   │  ▲ over          │
//!                    └──────cancel───────┴──┘               └─ (same column) ─▶ Idle
//! ```
//!
//! The machine never talks to the service. A successful [`DragMachine::drop`]
//! returns a [`DropOutcome::Move`] which the caller turns into a status
//! update; the machine stays in `Dropping` until [`DragMachine::finish`] is
//! called with the outcome of that update.

use taskflow_proto::{TaskId, TaskStatus};

/// Where the drag interaction currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    /// Nothing is being dragged.
    #[default]
    Idle,
    /// A task is picked up but not over any column yet.
    Dragging {
        /// Dragged task.
        task: TaskId,
        /// Column it was picked up from.
        from: TaskStatus,
    },
    /// A task is hovering over a column.
    OverColumn {
        /// Dragged task.
        task: TaskId,
        /// Column it was picked up from.
        from: TaskStatus,
        /// Column under the pointer.
        column: TaskStatus,
    },
    /// A drop was accepted and the status update is in flight.
    Dropping {
        /// Dropped task.
        task: TaskId,
        /// Destination column.
        column: TaskStatus,
    },
}

/// What a drop produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Not hovering over a column; nothing happens.
    Ignored,
    /// Dropped onto the column it came from; no update is needed.
    Unchanged,
    /// The task should move to another column.
    Move {
        /// Task to update.
        task: TaskId,
        /// Previous status.
        from: TaskStatus,
        /// New status.
        to: TaskStatus,
    },
}

/// Drag-and-drop controller.
#[derive(Debug, Clone, Default)]
pub struct DragMachine {
    state: DragState,
}

impl DragMachine {
    /// Creates an idle machine.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> DragState {
        self.state
    }

    /// Whether a drag is active (picked up or hovering).
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(
            self.state,
            DragState::Dragging { .. } | DragState::OverColumn { .. }
        )
    }

    /// Picks up `task` from column `from`.
    ///
    /// Returns `false` while a previous drop is still in flight.
    pub fn start(&mut self, task: TaskId, from: TaskStatus) -> bool {
        if matches!(self.state, DragState::Dropping { .. }) {
            return false;
        }
        self.state = DragState::Dragging { task, from };
        true
    }

    /// Moves the dragged task over `column`. Ignored when nothing is dragged.
    pub fn over(&mut self, column: TaskStatus) {
        self.state = match self.state {
            DragState::Dragging { task, from } | DragState::OverColumn { task, from, .. } => {
                DragState::OverColumn { task, from, column }
            }
            other => other,
        };
    }

    /// Drops the dragged task on the hovered column.
    pub fn drop(&mut self) -> DropOutcome {
        match self.state {
            DragState::OverColumn { from, column, .. } if column == from => {
                self.state = DragState::Idle;
                DropOutcome::Unchanged
            }
            DragState::OverColumn { task, from, column } => {
                self.state = DragState::Dropping { task, column };
                DropOutcome::Move {
                    task,
                    from,
                    to: column,
                }
            }
            DragState::Dragging { .. } => {
                self.state = DragState::Idle;
                DropOutcome::Ignored
            }
            DragState::Idle | DragState::Dropping { .. } => DropOutcome::Ignored,
        }
    }

    /// Completes an in-flight drop of `task`, returning to idle.
    ///
    /// A completion for a different task is ignored.
    pub fn finish(&mut self, task: TaskId) {
        if matches!(self.state, DragState::Dropping { task: current, .. } if current == task) {
            self.state = DragState::Idle;
        }
    }

    /// Abandons an active drag. An in-flight drop is not affected.
    pub fn cancel(&mut self) {
        if self.is_dragging() {
            self.state = DragState::Idle;
        }
    }

    /// Column to highlight as a drop target.
    #[must_use]
    pub const fn highlighted_column(&self) -> Option<TaskStatus> {
        match self.state {
            DragState::OverColumn { column, .. } => Some(column),
            _ => None,
        }
    }

    /// Task currently being dragged or dropped.
    #[must_use]
    pub const fn dragged_task(&self) -> Option<TaskId> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { task, .. }
            | DragState::OverColumn { task, .. }
            | DragState::Dropping { task, .. } => Some(task),
        }
    }
}
