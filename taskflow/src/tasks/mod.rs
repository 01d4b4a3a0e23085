//! Task board logic that runs entirely on the client.
//!
//! Filtering and sorting of a board's tasks, the drag-and-drop state
//! machine for status changes, and the create/edit forms with their local
//! validation. None of this talks to the record service directly.

pub mod drag;
pub mod filter;
pub mod form;

pub use drag::{DragMachine, DragState, DropOutcome};
pub use filter::{
    FilterUpdate, PriorityFilter, SortDirection, SortKey, TaskFilter, column_counts,
    filter_and_sort, group_by_status,
};
pub use form::{BoardField, BoardForm, FormMode, TaskField, TaskForm};

use thiserror::Error;

/// Local precondition failures, raised before any remote call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Task title is empty or blank.
    #[error("Task title is required")]
    EmptyTitle,
    /// Task title exceeds the configured maximum.
    #[error("Task title must be at most {max} characters")]
    TitleTooLong {
        /// Configured maximum, in characters.
        max: usize,
    },
    /// Due date is not a `YYYY-MM-DD` date.
    #[error("Invalid due date: {0}")]
    InvalidDueDate(String),
    /// Board name is empty or blank.
    #[error("Board name cannot be empty")]
    EmptyBoardName,
    /// Deleting would leave no boards.
    #[error("Cannot delete the only board")]
    LastBoard,
}
