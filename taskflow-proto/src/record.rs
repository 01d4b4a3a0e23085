//! Wire contract of the hosted record service.
//!
//! The service stores schemaless records grouped by [`Resource`]. Four calls
//! make up the contract: fetch, create, update and delete. The request and
//! response shapes here mirror the service's JSON exactly, including its
//! mixed capitalisation (`Fields`, `RecordIds`, `pagingInfo`).
//!
//! Raw [`Record`]s never leave the adapter layer; see [`crate::normalize`].

use serde::{Deserialize, Serialize};

/// A raw record: a JSON object keyed by field name.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Fixed page size used for every list fetch. There is no automatic
/// pagination beyond it.
pub const PAGE_SIZE: usize = 100;

/// Request header carrying the project identifier.
pub const PROJECT_ID_HEADER: &str = "x-project-id";

/// Request header carrying the public API key.
pub const PUBLIC_KEY_HEADER: &str = "x-public-key";

/// Field names used by the `board` and `task` resources.
pub mod fields {
    /// Server-assigned numeric identifier.
    pub const ID: &str = "Id";
    /// Display name.
    pub const NAME: &str = "Name";
    /// Free-text description.
    pub const DESCRIPTION: &str = "description";
    /// Tag list.
    pub const TAGS: &str = "Tags";
    /// Owner reference (boards).
    pub const OWNER: &str = "Owner";
    /// Creation timestamp.
    pub const CREATED_ON: &str = "CreatedOn";
    /// Creator reference.
    pub const CREATED_BY: &str = "CreatedBy";
    /// Last modification timestamp.
    pub const MODIFIED_ON: &str = "ModifiedOn";
    /// Task title.
    pub const TITLE: &str = "title";
    /// Task status.
    pub const STATUS: &str = "status";
    /// Task priority.
    pub const PRIORITY: &str = "priority";
    /// Task due date.
    pub const DUE_DATE: &str = "dueDate";
    /// Task → board foreign key.
    pub const BOARD: &str = "board";
}

/// Fields requested when listing boards.
pub const BOARD_FIELDS: [&str; 7] = [
    fields::ID,
    fields::NAME,
    fields::DESCRIPTION,
    fields::TAGS,
    fields::OWNER,
    fields::CREATED_ON,
    fields::CREATED_BY,
];

/// Fields requested when listing tasks.
pub const TASK_FIELDS: [&str; 11] = [
    fields::ID,
    fields::NAME,
    fields::TITLE,
    fields::DESCRIPTION,
    fields::STATUS,
    fields::PRIORITY,
    fields::DUE_DATE,
    fields::TAGS,
    fields::BOARD,
    fields::CREATED_ON,
    fields::MODIFIED_ON,
];

/// A record collection on the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Boards.
    Board,
    /// Tasks.
    Task,
}

impl Resource {
    /// Name used in request paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Task => "task",
        }
    }

    /// Parses a resource name from a request path.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "board" => Some(Self::Board),
            "task" => Some(Self::Task),
            _ => None,
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{"Field": {"Name": "..."}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// The wrapped field name.
    #[serde(rename = "Field")]
    pub field: FieldName,
}

/// `{"Name": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldName {
    /// Field name.
    #[serde(rename = "Name")]
    pub name: String,
}

/// Comparison applied by a where clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// The stringified field value equals one of the listed values.
    ExactMatch,
}

/// A single filter condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhereClause {
    /// Field to compare.
    #[serde(rename = "fieldName")]
    pub field_name: String,
    /// Comparison operator.
    #[serde(rename = "Operator")]
    pub operator: Operator,
    /// Accepted values.
    pub values: Vec<String>,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// A sort criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Field to sort by.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
}

/// Offset/limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingInfo {
    /// Maximum number of records to return.
    pub limit: usize,
    /// Number of records to skip.
    pub offset: usize,
}

/// Parameters of a fetch call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchParams {
    /// Fields to return. Empty means all fields.
    #[serde(rename = "Fields", default)]
    pub fields: Vec<FieldSpec>,
    /// Filter conditions, all of which must hold.
    #[serde(rename = "where", default, skip_serializing_if = "Vec::is_empty")]
    pub where_clauses: Vec<WhereClause>,
    /// Sort criteria, applied in order.
    #[serde(rename = "orderBy", default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    /// Paging window.
    #[serde(rename = "pagingInfo", default, skip_serializing_if = "Option::is_none")]
    pub paging_info: Option<PagingInfo>,
}

impl FetchParams {
    /// Creates empty parameters (all fields, no filter, no order).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests only the given fields.
    #[must_use]
    pub fn with_fields(mut self, names: &[&str]) -> Self {
        self.fields = names
            .iter()
            .map(|name| FieldSpec {
                field: FieldName {
                    name: (*name).to_string(),
                },
            })
            .collect();
        self
    }

    /// Adds an exact-match condition on `field`.
    #[must_use]
    pub fn exact_match(mut self, field: &str, value: impl Into<String>) -> Self {
        self.where_clauses.push(WhereClause {
            field_name: field.to_string(),
            operator: Operator::ExactMatch,
            values: vec![value.into()],
        });
        self
    }

    /// Adds a sort criterion.
    #[must_use]
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by.push(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    /// Sets the paging window.
    #[must_use]
    pub const fn paging(mut self, limit: usize, offset: usize) -> Self {
        self.paging_info = Some(PagingInfo { limit, offset });
        self
    }

    /// Iterates over the requested field names.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|spec| spec.field.name.as_str())
    }
}

/// Response of a fetch call. `data` is absent when the service has nothing
/// usable to return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    /// Matching records.
    #[serde(default)]
    pub data: Option<Vec<Record>>,
}

/// Body of a create or update call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordsParams {
    /// Records to create or update.
    pub records: Vec<Record>,
}

impl RecordsParams {
    /// Wraps a single record.
    #[must_use]
    pub fn single(record: Record) -> Self {
        Self {
            records: vec![record],
        }
    }
}

/// Per-record outcome of a create or update call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordResult {
    /// Whether this record was written.
    #[serde(default)]
    pub success: bool,
    /// The stored record, when written.
    #[serde(default)]
    pub data: Option<Record>,
}

/// Response of a create or update call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationResponse {
    /// Whether every record was written.
    #[serde(default)]
    pub success: bool,
    /// Per-record outcomes, in request order.
    #[serde(default)]
    pub results: Vec<RecordResult>,
}

impl MutationResponse {
    /// Takes the stored record of the first result, if any.
    #[must_use]
    pub fn into_first_record(self) -> Option<Record> {
        self.results.into_iter().next().and_then(|r| r.data)
    }
}

/// Body of a delete call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteParams {
    /// Ids of the records to delete.
    #[serde(rename = "RecordIds")]
    pub record_ids: Vec<u64>,
}

/// Response of a delete call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Whether anything was deleted.
    #[serde(default)]
    pub success: bool,
}
