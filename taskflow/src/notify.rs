//! User-visible notifications.
//!
//! A shared, bounded log of short messages ("Task created successfully",
//! "Failed to load boards"). The record client adapter pushes failures from
//! worker tasks while the UI loop pushes outcomes of user actions, so the
//! log is cloneable and guarded by a `parking_lot` mutex.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

/// Number of notifications retained before the oldest is dropped.
const MAX_RETAINED: usize = 50;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// An action completed.
    Success,
    /// Neutral information.
    Info,
    /// Something failed.
    Error,
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: Level,
    /// Message shown to the user.
    pub message: String,
}

/// Shared notification log.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    inner: Arc<Mutex<VecDeque<Notification>>>,
}

impl Notifications {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a notification, dropping the oldest beyond the retention cap.
    pub fn push(&self, level: Level, message: impl Into<String>) {
        let message = message.into();
        match level {
            Level::Error => tracing::debug!(%message, "error notification"),
            Level::Success | Level::Info => tracing::debug!(%message, "notification"),
        }
        let mut log = self.inner.lock();
        log.push_back(Notification { level, message });
        while log.len() > MAX_RETAINED {
            log.pop_front();
        }
    }

    /// Shorthand for a [`Level::Success`] notification.
    pub fn success(&self, message: impl Into<String>) {
        self.push(Level::Success, message);
    }

    /// Shorthand for a [`Level::Info`] notification.
    pub fn info(&self, message: impl Into<String>) {
        self.push(Level::Info, message);
    }

    /// Shorthand for a [`Level::Error`] notification.
    pub fn error(&self, message: impl Into<String>) {
        self.push(Level::Error, message);
    }

    /// Most recent notification, if any.
    #[must_use]
    pub fn latest(&self) -> Option<Notification> {
        self.inner.lock().back().cloned()
    }

    /// Removes and returns every retained notification, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Notification> {
        self.inner.lock().drain(..).collect()
    }

    /// Messages currently retained, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.inner.lock().iter().map(|n| n.message.clone()).collect()
    }

    /// Number of retained notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
