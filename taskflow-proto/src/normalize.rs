//! Conversion between raw service records and canonical domain types.
//!
//! This is the only place that knows about the service's loose field
//! encodings. Everything read back from the service passes through
//! [`board_from_record`] or [`task_from_record`] exactly once, and every
//! write is built by one of the `*_record` encoders.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::board::{Board, BoardDraft, BoardId};
use crate::record::{Record, fields};
use crate::task::{Priority, Task, TaskDraft, TaskId, TaskStatus};

/// Error produced when a raw record cannot be turned into a domain value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    /// The record carries no `Id`.
    #[error("record has no Id")]
    MissingId,
    /// The `Id` is neither an unsigned number nor a numeric string.
    #[error("invalid record Id: {0}")]
    InvalidId(String),
    /// A required field is absent or empty.
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),
    /// A field is present but cannot be interpreted.
    #[error("invalid value for field `{field}`: {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// Renders a field value as the text an exact-match filter compares
/// against. Lookup objects (`{"Id": .., "Name": ..}`) render as their `Id`.
#[must_use]
pub fn match_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => map.get(fields::ID).map(match_text).unwrap_or_default(),
        Value::Array(items) => items.iter().map(match_text).collect::<Vec<_>>().join(","),
    }
}

/// Parses a record id from a number or a numeric string.
///
/// # Errors
///
/// Returns [`NormalizeError::InvalidId`] for anything else.
pub fn parse_id(value: &Value) -> Result<u64, NormalizeError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| NormalizeError::InvalidId(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| NormalizeError::InvalidId(s.clone())),
        Value::Object(map) => map
            .get(fields::ID)
            .ok_or(NormalizeError::MissingId)
            .and_then(parse_id),
        other => Err(NormalizeError::InvalidId(other.to_string())),
    }
}

fn record_id(record: &Record) -> Result<u64, NormalizeError> {
    match record.get(fields::ID) {
        None | Some(Value::Null) => Err(NormalizeError::MissingId),
        Some(value) => parse_id(value),
    }
}

fn non_empty_str<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn tags(record: &Record) -> Vec<String> {
    match record.get(fields::TAGS) {
        Some(Value::Array(items)) => items
            .iter()
            .map(match_text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn owner(record: &Record) -> Option<String> {
    match record.get(fields::OWNER)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map
            .get(fields::NAME)
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| map.get(fields::ID).map(match_text)),
        _ => None,
    }
}

fn timestamp(record: &Record, field: &'static str) -> Result<DateTime<Utc>, NormalizeError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(DateTime::<Utc>::UNIX_EPOCH),
        Some(Value::String(s)) if s.is_empty() => Ok(DateTime::<Utc>::UNIX_EPOCH),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| NormalizeError::InvalidField {
                field,
                reason: e.to_string(),
            }),
        Some(other) => Err(NormalizeError::InvalidField {
            field,
            reason: format!("expected a timestamp string, got {other}"),
        }),
    }
}

/// Parses a due date written as `YYYY-MM-DD` or as an RFC 3339 timestamp.
/// Blank input means no due date.
///
/// # Errors
///
/// Returns [`NormalizeError::InvalidField`] when the text is neither form.
pub fn parse_due_date(text: &str) -> Result<Option<NaiveDate>, NormalizeError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(text)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| NormalizeError::InvalidField {
            field: fields::DUE_DATE,
            reason: format!("`{text}` is not a date"),
        })
}

fn due_date(record: &Record) -> Result<Option<NaiveDate>, NormalizeError> {
    match record.get(fields::DUE_DATE) {
        Some(Value::String(s)) => parse_due_date(s),
        None | Some(Value::Null) => Ok(None),
        Some(other) => Err(NormalizeError::InvalidField {
            field: fields::DUE_DATE,
            reason: format!("expected a date string, got {other}"),
        }),
    }
}

/// Builds a [`Board`] from a raw `board` record.
///
/// # Errors
///
/// Fails when the record has no usable `Id` or `Name`, or carries a
/// malformed timestamp.
pub fn board_from_record(record: &Record) -> Result<Board, NormalizeError> {
    let id = BoardId::new(record_id(record)?);
    let name = non_empty_str(record, fields::NAME)
        .ok_or(NormalizeError::MissingField(fields::NAME))?
        .to_string();
    Ok(Board {
        id,
        name,
        description: non_empty_str(record, fields::DESCRIPTION).map(str::to_string),
        tags: tags(record),
        created_at: timestamp(record, fields::CREATED_ON)?,
        owner: owner(record),
    })
}

/// Builds a [`Task`] from a raw `task` record.
///
/// `title` falls back to `Name`; unknown status and priority values fall
/// back to their defaults.
///
/// # Errors
///
/// Fails when the record has no usable `Id`, `board` or title, or carries
/// a malformed timestamp or due date.
pub fn task_from_record(record: &Record) -> Result<Task, NormalizeError> {
    let id = TaskId::new(record_id(record)?);
    let board_id = match record.get(fields::BOARD) {
        None | Some(Value::Null) => return Err(NormalizeError::MissingField(fields::BOARD)),
        Some(value) => BoardId::new(parse_id(value).map_err(|e| NormalizeError::InvalidField {
            field: fields::BOARD,
            reason: e.to_string(),
        })?),
    };
    let title = non_empty_str(record, fields::TITLE)
        .or_else(|| non_empty_str(record, fields::NAME))
        .ok_or(NormalizeError::MissingField(fields::TITLE))?
        .to_string();
    let status = record
        .get(fields::STATUS)
        .and_then(Value::as_str)
        .and_then(TaskStatus::parse)
        .unwrap_or_default();
    let priority = record
        .get(fields::PRIORITY)
        .and_then(Value::as_str)
        .and_then(Priority::parse)
        .unwrap_or_default();
    Ok(Task {
        id,
        board_id,
        title,
        description: non_empty_str(record, fields::DESCRIPTION).map(str::to_string),
        status,
        priority,
        due_date: due_date(record)?,
        tags: tags(record),
        created_at: timestamp(record, fields::CREATED_ON)?,
        updated_at: timestamp(record, fields::MODIFIED_ON)?,
    })
}

fn tag_values(tags: &[String]) -> Value {
    Value::Array(tags.iter().cloned().map(Value::String).collect())
}

/// Encodes a board draft for a create call. An absent description is sent
/// as an empty string.
#[must_use]
pub fn board_record(draft: &BoardDraft) -> Record {
    let mut record = Record::new();
    record.insert(fields::NAME.into(), Value::String(draft.name.clone()));
    record.insert(
        fields::DESCRIPTION.into(),
        Value::String(draft.description.clone().unwrap_or_default()),
    );
    record.insert(fields::TAGS.into(), tag_values(&draft.tags));
    record
}

/// Encodes an existing board for an update call.
#[must_use]
pub fn board_update_record(board: &Board) -> Record {
    let mut record = board_record(&BoardDraft {
        name: board.name.clone(),
        description: board.description.clone(),
        tags: board.tags.clone(),
    });
    record.insert(fields::ID.into(), Value::from(board.id.get()));
    record
}

/// Encodes a task draft for a create (`id == None`) or full update call.
///
/// `Name` mirrors `title`. Absent fields are filled with their defaults:
/// status `todo`, priority `medium`, due date null, no tags.
#[must_use]
pub fn task_record(draft: &TaskDraft, id: Option<TaskId>) -> Record {
    let mut record = Record::new();
    if let Some(id) = id {
        record.insert(fields::ID.into(), Value::from(id.get()));
    }
    record.insert(fields::NAME.into(), Value::String(draft.title.clone()));
    record.insert(fields::TITLE.into(), Value::String(draft.title.clone()));
    record.insert(
        fields::DESCRIPTION.into(),
        Value::String(draft.description.clone().unwrap_or_default()),
    );
    record.insert(
        fields::STATUS.into(),
        Value::String(draft.status.unwrap_or_default().as_str().into()),
    );
    record.insert(
        fields::PRIORITY.into(),
        Value::String(draft.priority.unwrap_or_default().as_str().into()),
    );
    record.insert(
        fields::DUE_DATE.into(),
        draft.due_date.map_or(Value::Null, |d| {
            Value::String(d.format("%Y-%m-%d").to_string())
        }),
    );
    record.insert(
        fields::TAGS.into(),
        tag_values(draft.tags.as_deref().unwrap_or_default()),
    );
    record.insert(fields::BOARD.into(), Value::from(draft.board_id.get()));
    record
}

/// Encodes a partial update touching only the status field.
#[must_use]
pub fn status_patch(id: TaskId, status: TaskStatus) -> Record {
    let mut record = Record::new();
    record.insert(fields::ID.into(), Value::from(id.get()));
    record.insert(fields::STATUS.into(), Value::String(status.as_str().into()));
    record
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rec(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn id_accepts_number_and_numeric_string() {
        assert_eq!(parse_id(&json!(12)).unwrap(), 12);
        assert_eq!(parse_id(&json!("12")).unwrap(), 12);
        assert!(matches!(
            parse_id(&json!("abc")),
            Err(NormalizeError::InvalidId(_))
        ));
        assert!(parse_id(&json!(-1)).is_err());
    }

    #[test]
    fn board_from_full_record() {
        let board = board_from_record(&rec(json!({
            "Id": 1,
            "Name": "Roadmap",
            "description": "Q3 plans",
            "Tags": "planning, q3",
            "Owner": {"Id": 9, "Name": "dana"},
            "CreatedOn": "2024-03-01T10:00:00Z"
        })))
        .unwrap();
        assert_eq!(board.id, BoardId::new(1));
        assert_eq!(board.name, "Roadmap");
        assert_eq!(board.description.as_deref(), Some("Q3 plans"));
        assert_eq!(board.tags, vec!["planning", "q3"]);
        assert_eq!(board.owner.as_deref(), Some("dana"));
        assert_eq!(board.created_at.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn board_without_id_is_rejected() {
        let err = board_from_record(&rec(json!({"Name": "x"}))).unwrap_err();
        assert_eq!(err, NormalizeError::MissingId);
    }

    #[test]
    fn board_empty_description_is_none() {
        let board = board_from_record(&rec(json!({"Id": "3", "Name": "x", "description": ""})))
            .unwrap();
        assert!(board.description.is_none());
        assert_eq!(board.created_at, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn task_title_falls_back_to_name() {
        let task = task_from_record(&rec(json!({
            "Id": 5, "Name": "From name", "board": 1
        })))
        .unwrap();
        assert_eq!(task.title, "From name");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.tags.is_empty());
        assert!(task.due_date.is_none());
    }

    #[test]
    fn task_unknown_enums_fall_back() {
        let task = task_from_record(&rec(json!({
            "Id": 5, "title": "t", "board": "1",
            "status": "blocked", "priority": "critical"
        })))
        .unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.board_id, BoardId::new(1));
    }

    #[test]
    fn task_board_lookup_object() {
        let task = task_from_record(&rec(json!({
            "Id": 5, "title": "t", "board": {"Id": 8, "Name": "Ops"}
        })))
        .unwrap();
        assert_eq!(task.board_id, BoardId::new(8));
    }

    #[test]
    fn task_due_date_forms() {
        let plain = task_from_record(&rec(json!({
            "Id": 1, "title": "t", "board": 1, "dueDate": "2024-01-05"
        })))
        .unwrap();
        let stamped = task_from_record(&rec(json!({
            "Id": 2, "title": "t", "board": 1, "dueDate": "2024-01-05T00:00:00Z"
        })))
        .unwrap();
        assert_eq!(plain.due_date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(plain.due_date, stamped.due_date);

        let bad = task_from_record(&rec(json!({
            "Id": 3, "title": "t", "board": 1, "dueDate": "soon"
        })));
        assert!(matches!(
            bad,
            Err(NormalizeError::InvalidField { field: "dueDate", .. })
        ));
    }

    #[test]
    fn task_without_board_is_rejected() {
        let err = task_from_record(&rec(json!({"Id": 1, "title": "t"}))).unwrap_err();
        assert_eq!(err, NormalizeError::MissingField("board"));
    }

    #[test]
    fn task_record_applies_defaults() {
        let draft = TaskDraft::new(BoardId::new(7), "Ship it");
        let record = task_record(&draft, None);
        assert_eq!(
            Value::Object(record),
            json!({
                "Name": "Ship it",
                "title": "Ship it",
                "description": "",
                "status": "todo",
                "priority": "medium",
                "dueDate": null,
                "Tags": [],
                "board": 7
            })
        );
    }

    #[test]
    fn task_record_with_id_and_fields() {
        let draft = TaskDraft {
            board_id: BoardId::new(7),
            title: "Ship it".into(),
            description: Some("now".into()),
            status: Some(TaskStatus::Done),
            priority: Some(Priority::Urgent),
            due_date: NaiveDate::from_ymd_opt(2024, 2, 29),
            tags: Some(vec!["release".into()]),
        };
        let record = task_record(&draft, Some(TaskId::new(11)));
        assert_eq!(record.get("Id"), Some(&json!(11)));
        assert_eq!(record.get("status"), Some(&json!("done")));
        assert_eq!(record.get("priority"), Some(&json!("urgent")));
        assert_eq!(record.get("dueDate"), Some(&json!("2024-02-29")));
        assert_eq!(record.get("Tags"), Some(&json!(["release"])));
    }

    #[test]
    fn status_patch_has_only_id_and_status() {
        let patch = status_patch(TaskId::new(4), TaskStatus::InProgress);
        assert_eq!(
            Value::Object(patch),
            json!({"Id": 4, "status": "in_progress"})
        );
    }

    #[test]
    fn board_record_defaults_description() {
        let record = board_record(&BoardDraft::new("Ops", None));
        assert_eq!(
            Value::Object(record),
            json!({"Name": "Ops", "description": "", "Tags": []})
        );
    }

    #[test]
    fn match_text_renders_scalars_and_lookups() {
        assert_eq!(match_text(&json!(7)), "7");
        assert_eq!(match_text(&json!("7")), "7");
        assert_eq!(match_text(&json!({"Id": 7, "Name": "x"})), "7");
        assert_eq!(match_text(&json!(null)), "");
    }
}
