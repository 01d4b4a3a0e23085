//! Board types for `TaskFlow`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned board identifier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BoardId(u64);

impl BoardId {
    /// Wraps a raw record id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw record id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BoardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named container of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Server-assigned identifier, unique within the boards collection.
    pub id: BoardId,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// When the board was created.
    pub created_at: DateTime<Utc>,
    /// Owner reference as reported by the service.
    pub owner: Option<String>,
}

/// Input for creating a board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardDraft {
    /// Display name (validated non-empty before reaching the service).
    pub name: String,
    /// Description, stored as an empty string when absent.
    pub description: Option<String>,
    /// Tags, default to empty.
    pub tags: Vec<String>,
}

impl BoardDraft {
    /// Creates a draft from a name and description.
    #[must_use]
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            tags: Vec::new(),
        }
    }
}
