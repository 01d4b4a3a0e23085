//! Property-based tests for task filtering and sorting.
//!
//! Uses proptest to verify:
//! 1. The result is exactly the matching subset of the input.
//! 2. The result is ordered by the sort key in the chosen direction.
//! 3. Tasks with equal sort keys keep their input order.
//! 4. Filtering an already filtered list changes nothing.
//! 5. Grouping by status partitions the filtered list.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use proptest::prelude::*;
use taskflow::tasks::{
    PriorityFilter, SortDirection, SortKey, TaskFilter, column_counts, filter_and_sort,
    group_by_status,
};
use taskflow_proto::{BoardId, Priority, Task, TaskId, TaskStatus};

// --- Strategies ---

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::ALL.to_vec())
}

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::ALL.to_vec())
}

fn arb_due() -> impl Strategy<Value = Option<NaiveDate>> {
    prop::option::of((0u64..60).prop_filter_map("date in range", |d| {
        NaiveDate::from_ymd_opt(2026, 1, 1)?.checked_add_days(Days::new(d))
    }))
}

/// Task fields without the id; ids are assigned by position.
fn arb_fields() -> impl Strategy<
    Value = (
        String,
        Option<String>,
        TaskStatus,
        Priority,
        Option<NaiveDate>,
        Vec<String>,
        i64,
    ),
> {
    (
        "[a-zA-Z ]{1,12}",
        prop::option::of("[a-z ]{0,12}"),
        arb_status(),
        arb_priority(),
        arb_due(),
        prop::collection::vec("[a-z]{1,5}", 0..3),
        0i64..20,
    )
}

fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(arb_fields(), 0..40).prop_map(|rows| {
        rows.into_iter()
            .zip(1u64..)
            .map(
                |((title, description, status, priority, due_date, tags, created), id)| {
                    let created_at =
                        DateTime::<Utc>::from_timestamp(created * 3600, 0).unwrap_or_default();
                    Task {
                        id: TaskId::new(id),
                        board_id: BoardId::new(1),
                        title,
                        description,
                        status,
                        priority,
                        due_date,
                        tags,
                        created_at,
                        updated_at: created_at,
                    }
                },
            )
            .collect()
    })
}

fn arb_filter() -> impl Strategy<Value = TaskFilter> {
    (
        prop_oneof![
            Just(PriorityFilter::All),
            arb_priority().prop_map(PriorityFilter::Only),
        ],
        prop::sample::select(vec!["", "a", "E", "fix", "  o  ", "zz"]),
        prop::sample::select(vec![SortKey::CreatedAt, SortKey::DueDate, SortKey::Priority]),
        prop::sample::select(vec![SortDirection::Asc, SortDirection::Desc]),
    )
        .prop_map(|(priority, search, sort_key, direction)| TaskFilter {
            priority,
            search: search.to_string(),
            sort_key,
            direction,
        })
}

// --- Reference predicates ---

fn matches(task: &Task, filter: &TaskFilter) -> bool {
    let needle = filter.search.to_lowercase();
    let text_hit = needle.is_empty()
        || task.title.to_lowercase().contains(&needle)
        || task
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
        || task.tags.iter().any(|t| t.to_lowercase().contains(&needle));
    filter.priority.matches(task.priority) && text_hit
}

/// Ascending key; a missing due date sorts after every present one.
fn sort_key(task: &Task, key: SortKey) -> (i64, i64) {
    match key {
        SortKey::CreatedAt => (0, task.created_at.timestamp()),
        SortKey::DueDate => task
            .due_date
            .map_or((1, 0), |d| (0, i64::from(d.num_days_from_ce()))),
        SortKey::Priority => (0, i64::from(task.priority.rank())),
    }
}

fn ids(tasks: &[&Task]) -> Vec<TaskId> {
    tasks.iter().map(|t| t.id).collect()
}

// --- Properties ---

proptest! {
    #[test]
    fn result_is_the_matching_subset(tasks in arb_tasks(), filter in arb_filter()) {
        let result = filter_and_sort(&tasks, &filter);
        let mut got = ids(&result);
        got.sort();
        let mut want: Vec<TaskId> = tasks
            .iter()
            .filter(|t| matches(t, &filter))
            .map(|t| t.id)
            .collect();
        want.sort();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn result_is_ordered(tasks in arb_tasks(), filter in arb_filter()) {
        let result = filter_and_sort(&tasks, &filter);
        for pair in result.windows(2) {
            let a = sort_key(pair[0], filter.sort_key);
            let b = sort_key(pair[1], filter.sort_key);
            match filter.direction {
                SortDirection::Asc => prop_assert!(a <= b, "{a:?} > {b:?}"),
                SortDirection::Desc => prop_assert!(a >= b, "{a:?} < {b:?}"),
            }
        }
    }

    #[test]
    fn equal_keys_keep_input_order(tasks in arb_tasks(), filter in arb_filter()) {
        let result = filter_and_sort(&tasks, &filter);
        for pair in result.windows(2) {
            if sort_key(pair[0], filter.sort_key) == sort_key(pair[1], filter.sort_key) {
                // Ids were assigned in input order.
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
    }

    #[test]
    fn filtering_is_idempotent(tasks in arb_tasks(), filter in arb_filter()) {
        let once: Vec<Task> = filter_and_sort(&tasks, &filter).into_iter().cloned().collect();
        let twice = filter_and_sort(&once, &filter);
        prop_assert_eq!(ids(&twice), once.iter().map(|t| t.id).collect::<Vec<_>>());
    }

    #[test]
    fn grouping_partitions_by_status(tasks in arb_tasks(), filter in arb_filter()) {
        let result = filter_and_sort(&tasks, &filter);
        let columns = group_by_status(&result);
        let counts = column_counts(&result);

        prop_assert_eq!(counts.iter().sum::<usize>(), result.len());
        for (index, column) in columns.iter().enumerate() {
            prop_assert_eq!(column.len(), counts[index]);
            prop_assert!(column.iter().all(|t| t.status.column_index() == index));
            let in_result: Vec<TaskId> = result
                .iter()
                .filter(|t| t.status.column_index() == index)
                .map(|t| t.id)
                .collect();
            prop_assert_eq!(ids(column), in_result);
        }
    }
}
