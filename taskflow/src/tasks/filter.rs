//! Filtering and sorting of a board's tasks.
//!
//! [`filter_and_sort`] is a pure function of the task slice and a
//! [`TaskFilter`]: priority filter first, then the search term, then a
//! stable sort on the chosen key.

use std::cmp::Ordering;

use taskflow_proto::{Priority, Task, TaskStatus};

/// Which priorities to keep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    /// Keep every task.
    #[default]
    All,
    /// Keep only tasks with exactly this priority.
    Only(Priority),
}

impl PriorityFilter {
    /// Whether a task with `priority` passes.
    #[must_use]
    pub fn matches(self, priority: Priority) -> bool {
        match self {
            Self::All => true,
            Self::Only(p) => p == priority,
        }
    }

    /// Cycles `all → low → medium → high → urgent → all`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::All => Self::Only(Priority::Low),
            Self::Only(Priority::Urgent) => Self::All,
            Self::Only(p) => Self::Only(p.next()),
        }
    }

    /// Display name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(p) => p.label(),
        }
    }
}

/// Sort key for the task columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Creation time.
    #[default]
    CreatedAt,
    /// Due date; tasks without one count as infinitely late.
    DueDate,
    /// Priority rank, urgent first.
    Priority,
}

impl SortKey {
    /// Cycles through the keys.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::CreatedAt => Self::DueDate,
            Self::DueDate => Self::Priority,
            Self::Priority => Self::CreatedAt,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreatedAt => "Created",
            Self::DueDate => "Due date",
            Self::Priority => "Priority",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Volatile filter and sort state shared by every board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Priority filter.
    pub priority: PriorityFilter,
    /// Case-insensitive search term; empty disables search.
    pub search: String,
    /// Sort key.
    pub sort_key: SortKey,
    /// Sort direction.
    pub direction: SortDirection,
}

/// A partial filter change. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    /// New priority filter.
    pub priority: Option<PriorityFilter>,
    /// New search term.
    pub search: Option<String>,
    /// New sort key.
    pub sort_key: Option<SortKey>,
    /// New sort direction.
    pub direction: Option<SortDirection>,
}

impl TaskFilter {
    /// Applies the provided fields of `update`, leaving the rest untouched.
    pub fn apply(&mut self, update: FilterUpdate) {
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(search) = update.search {
            self.search = search;
        }
        if let Some(sort_key) = update.sort_key {
            self.sort_key = sort_key;
        }
        if let Some(direction) = update.direction {
            self.direction = direction;
        }
    }

    /// Whether this is the default filter state.
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

fn matches_search(task: &Task, needle: &str) -> bool {
    task.title.to_lowercase().contains(needle)
        || task
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || task.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

fn compare(a: &Task, b: &Task, key: SortKey) -> Ordering {
    match key {
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::DueDate => match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
    }
}

/// Filters `tasks` by priority and search term, then sorts them stably.
///
/// The result borrows from `tasks` and is a reordered subset of it.
#[must_use]
pub fn filter_and_sort<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    let needle = filter.search.to_lowercase();
    let mut kept: Vec<&Task> = tasks
        .iter()
        .filter(|t| filter.priority.matches(t.priority))
        .filter(|t| needle.is_empty() || matches_search(t, &needle))
        .collect();
    kept.sort_by(|a, b| {
        let ord = compare(a, b, filter.sort_key);
        match filter.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    kept
}

/// Splits tasks into the three status columns, preserving order.
#[must_use]
pub fn group_by_status<'a>(tasks: &[&'a Task]) -> [Vec<&'a Task>; 3] {
    let mut columns: [Vec<&Task>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for task in tasks {
        columns[task.status.column_index()].push(task);
    }
    columns
}

/// Post-filter task count per column.
#[must_use]
pub fn column_counts(tasks: &[&Task]) -> [usize; 3] {
    let mut counts = [0; 3];
    for task in tasks {
        counts[task.status.column_index()] += 1;
    }
    counts
}

/// Tasks of one column, filtered and sorted.
#[must_use]
pub fn column<'a>(tasks: &'a [Task], filter: &TaskFilter, status: TaskStatus) -> Vec<&'a Task> {
    filter_and_sort(tasks, filter)
        .into_iter()
        .filter(|t| t.status == status)
        .collect()
}
