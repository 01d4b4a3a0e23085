//! Shared types for `TaskFlow`: boards, tasks, the record-service wire
//! contract and the normalisation step between the two.

pub mod board;
pub mod normalize;
pub mod record;
pub mod task;

pub use board::{Board, BoardDraft, BoardId};
pub use normalize::NormalizeError;
pub use record::{Record, Resource};
pub use task::{Priority, Task, TaskDraft, TaskId, TaskStatus};
