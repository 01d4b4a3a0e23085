//! Property-based tests for record normalisation.
//!
//! Uses proptest to verify:
//! 1. Ids are accepted as numbers, numeric strings, and lookup objects.
//! 2. A task encoded for the service and echoed back with an `Id`
//!    normalises to the drafted values.
//! 3. Unknown status and priority text falls back to the defaults.
//! 4. Arbitrary field values never cause a panic during normalisation.
//! 5. Due dates in `YYYY-MM-DD` form always parse to the same date.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use serde_json::{Value, json};
use taskflow_proto::normalize::{
    board_from_record, parse_due_date, parse_id, task_from_record, task_record,
};
use taskflow_proto::record::fields;
use taskflow_proto::{BoardId, Priority, Record, TaskDraft, TaskId, TaskStatus};

// --- Strategies ---

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..20_000).prop_filter_map("date in range", |d| {
        NaiveDate::from_ymd_opt(1990, 1, 1)?.checked_add_days(Days::new(d))
    })
}

fn arb_draft() -> impl Strategy<Value = TaskDraft> {
    (
        1u64..1_000_000,
        "[a-zA-Z0-9][a-zA-Z0-9 ]{0,30}[a-zA-Z0-9]",
        prop::option::of("[a-z]{1,20}"),
        prop::option::of(prop::sample::select(TaskStatus::ALL.to_vec())),
        prop::option::of(prop::sample::select(Priority::ALL.to_vec())),
        prop::option::of(arb_date()),
        prop::option::of(prop::collection::vec("[a-z]{1,8}", 0..4)),
    )
        .prop_map(
            |(board, title, description, status, priority, due_date, tags)| TaskDraft {
                board_id: BoardId::new(board),
                title,
                description,
                status,
                priority,
                due_date,
                tags,
            },
        )
}

/// Any JSON scalar, plus small arrays and lookup objects.
fn arb_value() -> impl Strategy<Value = Value> {
    let scalar = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<f64>().prop_map(|f| json!(f)),
        ".{0,16}".prop_map(Value::from),
    ];
    scalar.prop_recursive(2, 8, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            inner.prop_map(|id| json!({ "Id": id, "Name": "x" })),
        ]
    })
}

fn arb_record() -> impl Strategy<Value = Record> {
    let names = prop::sample::select(vec![
        fields::ID,
        fields::NAME,
        fields::TITLE,
        fields::DESCRIPTION,
        fields::STATUS,
        fields::PRIORITY,
        fields::DUE_DATE,
        fields::TAGS,
        fields::BOARD,
        fields::OWNER,
        fields::CREATED_ON,
        fields::MODIFIED_ON,
    ]);
    prop::collection::vec((names, arb_value()), 0..12).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    })
}

// --- Properties ---

proptest! {
    #[test]
    fn ids_accept_every_numeric_form(id in any::<u64>()) {
        prop_assert_eq!(parse_id(&json!(id)), Ok(id));
        prop_assert_eq!(parse_id(&json!(id.to_string())), Ok(id));
        prop_assert_eq!(parse_id(&json!(format!(" {id} "))), Ok(id));
        prop_assert_eq!(parse_id(&json!({ "Id": id, "Name": "lookup" })), Ok(id));
    }

    #[test]
    fn echoed_task_keeps_drafted_values(draft in arb_draft(), id in 1u64..1_000_000) {
        let mut record = task_record(&draft, None);
        record.insert(fields::ID.into(), json!(id));

        let task = task_from_record(&record).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(task.id, TaskId::new(id));
        prop_assert_eq!(task.board_id, draft.board_id);
        prop_assert_eq!(&task.title, &draft.title);
        prop_assert_eq!(task.description, draft.description);
        prop_assert_eq!(task.status, draft.status.unwrap_or_default());
        prop_assert_eq!(task.priority, draft.priority.unwrap_or_default());
        prop_assert_eq!(task.due_date, draft.due_date);
        prop_assert_eq!(task.tags, draft.tags.unwrap_or_default());
    }

    #[test]
    fn unknown_enum_text_falls_back(status in "[a-z_]{0,12}", priority in "[a-z]{0,12}") {
        let record: Record = [
            (fields::ID.to_string(), json!(1)),
            (fields::TITLE.to_string(), json!("t")),
            (fields::BOARD.to_string(), json!(1)),
            (fields::STATUS.to_string(), json!(status)),
            (fields::PRIORITY.to_string(), json!(priority)),
        ]
        .into_iter()
        .collect();

        let task = task_from_record(&record).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let want_status = TaskStatus::parse(&status).unwrap_or_default();
        let want_priority = Priority::parse(&priority).unwrap_or_default();
        prop_assert_eq!(task.status, want_status);
        prop_assert_eq!(task.priority, want_priority);
    }

    #[test]
    fn arbitrary_records_never_panic(record in arb_record()) {
        let _ = task_from_record(&record);
        let _ = board_from_record(&record);
    }

    #[test]
    fn normalised_boards_have_a_name(record in arb_record()) {
        if let Ok(board) = board_from_record(&record) {
            prop_assert!(!board.name.trim().is_empty());
        }
        if let Ok(task) = task_from_record(&record) {
            prop_assert!(!task.title.trim().is_empty());
            prop_assert!(task.tags.iter().all(|t| !t.trim().is_empty()));
        }
    }

    #[test]
    fn plain_dates_parse_exactly(date in arb_date()) {
        let text = date.format("%Y-%m-%d").to_string();
        prop_assert_eq!(parse_due_date(&text), Ok(Some(date)));
        prop_assert_eq!(parse_due_date(&format!("  {text}\t")), Ok(Some(date)));
    }

    #[test]
    fn due_date_text_never_panics(text in ".{0,40}") {
        let _ = parse_due_date(&text);
    }
}
