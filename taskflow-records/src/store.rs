//! In-memory record tables implementing the record-service contract.
//!
//! The [`RecordStore`] keeps one table per [`Resource`]. Ids are assigned
//! from a per-table counter and never reused. Every row carries the
//! service-managed fields (`Id`, `CreatedOn`, `ModifiedOn`, `CreatedBy`);
//! board rows also get an `Owner`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use taskflow_proto::normalize::{match_text, parse_id};
use taskflow_proto::record::{
    DeleteParams, DeleteResponse, Direction, FetchParams, FetchResponse, MutationResponse,
    OrderBy, RecordResult, RecordsParams, fields,
};
use taskflow_proto::{Record, Resource};
use tokio::sync::RwLock;

/// Owner recorded on new rows when none is configured.
pub const DEFAULT_OWNER: &str = "taskflow";

/// Service-managed fields that callers cannot overwrite.
const MANAGED_FIELDS: [&str; 4] = [
    fields::ID,
    fields::CREATED_ON,
    fields::CREATED_BY,
    fields::MODIFIED_ON,
];

#[derive(Debug, Default)]
struct Table {
    next_id: u64,
    rows: BTreeMap<u64, Record>,
}

impl Table {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Thread-safe in-memory record tables.
///
/// All four contract calls take the table lock for their whole duration, so
/// each call observes and produces a consistent snapshot.
#[derive(Debug)]
pub struct RecordStore {
    tables: RwLock<HashMap<Resource, Table>>,
    owner: String,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new(DEFAULT_OWNER)
    }
}

fn now_stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), Some(_)) => Ordering::Less,
        (Some(_), None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => match_text(x).cmp(&match_text(y)),
    }
}

fn compare_rows(a: &Record, b: &Record, order: &[OrderBy]) -> Ordering {
    let by_fields = order.iter().fold(Ordering::Equal, |acc, criterion| {
        acc.then_with(|| {
            let ord = compare_values(a.get(&criterion.field), b.get(&criterion.field));
            match criterion.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        })
    });
    let id_order = compare_values(a.get(fields::ID), b.get(fields::ID));
    let id_order = match order.first().map(|c| c.direction) {
        Some(Direction::Desc) => id_order.reverse(),
        _ => id_order,
    };
    by_fields.then(id_order)
}

fn project(row: &Record, params: &FetchParams) -> Record {
    if params.fields.is_empty() {
        return row.clone();
    }
    row.iter()
        .filter(|(name, _)| {
            name.as_str() == fields::ID || params.field_names().any(|f| f == name.as_str())
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

impl RecordStore {
    /// Creates empty tables stamping new rows with `owner`.
    #[must_use]
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            owner: owner.into(),
        }
    }

    /// Owner recorded on new rows.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the rows matching `params`, filtered, ordered, paged and
    /// projected in that order.
    pub async fn fetch(&self, resource: Resource, params: &FetchParams) -> FetchResponse {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(&resource) else {
            return FetchResponse {
                data: Some(Vec::new()),
            };
        };

        let mut rows: Vec<&Record> = table
            .rows
            .values()
            .filter(|row| {
                params.where_clauses.iter().all(|clause| {
                    let text = row.get(&clause.field_name).map(match_text).unwrap_or_default();
                    clause.values.iter().any(|v| *v == text)
                })
            })
            .collect();
        rows.sort_by(|a, b| compare_rows(a, b, &params.order_by));

        let (offset, limit) = params
            .paging_info
            .map_or((0, usize::MAX), |p| (p.offset, p.limit));
        let data = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| project(row, params))
            .collect();
        drop(tables);

        FetchResponse { data: Some(data) }
    }

    /// Inserts each record as a new row with a fresh `Id`. Any `Id` or
    /// managed field supplied by the caller is ignored.
    pub async fn create(&self, resource: Resource, params: RecordsParams) -> MutationResponse {
        let mut tables = self.tables.write().await;
        let table = tables.entry(resource).or_default();
        let stamp = now_stamp();

        let results: Vec<RecordResult> = params
            .records
            .into_iter()
            .map(|mut row| {
                for managed in MANAGED_FIELDS {
                    row.remove(managed);
                }
                let id = table.allocate_id();
                row.insert(fields::ID.into(), Value::from(id));
                row.insert(fields::CREATED_ON.into(), Value::String(stamp.clone()));
                row.insert(fields::MODIFIED_ON.into(), Value::String(stamp.clone()));
                row.insert(fields::CREATED_BY.into(), Value::String(self.owner.clone()));
                if resource == Resource::Board && !row.contains_key(fields::OWNER) {
                    row.insert(fields::OWNER.into(), Value::String(self.owner.clone()));
                }
                table.rows.insert(id, row.clone());
                tracing::debug!(%resource, id, "record created");
                RecordResult {
                    success: true,
                    data: Some(row),
                }
            })
            .collect();
        drop(tables);

        MutationResponse {
            success: !results.is_empty(),
            results,
        }
    }

    /// Merges each record's fields into the existing row with the same `Id`
    /// and bumps `ModifiedOn`. Records naming an unknown or missing `Id`
    /// fail individually and make the whole response unsuccessful.
    pub async fn update(&self, resource: Resource, params: RecordsParams) -> MutationResponse {
        let mut tables = self.tables.write().await;
        let table = tables.entry(resource).or_default();
        let stamp = now_stamp();

        let results: Vec<RecordResult> = params
            .records
            .into_iter()
            .map(|patch| {
                let Some(id) = patch.get(fields::ID).and_then(|v| parse_id(v).ok()) else {
                    return RecordResult::default();
                };
                let Some(row) = table.rows.get_mut(&id) else {
                    tracing::debug!(%resource, id, "update of unknown record");
                    return RecordResult::default();
                };
                for (name, value) in patch {
                    if !MANAGED_FIELDS.contains(&name.as_str()) {
                        row.insert(name, value);
                    }
                }
                row.insert(fields::MODIFIED_ON.into(), Value::String(stamp.clone()));
                RecordResult {
                    success: true,
                    data: Some(row.clone()),
                }
            })
            .collect();
        drop(tables);

        MutationResponse {
            success: !results.is_empty() && results.iter().all(|r| r.success),
            results,
        }
    }

    /// Deletes the listed rows. Succeeds when at least one existed.
    pub async fn delete(&self, resource: Resource, params: &DeleteParams) -> DeleteResponse {
        let mut tables = self.tables.write().await;
        let removed = tables.get_mut(&resource).map_or(0, |table| {
            params
                .record_ids
                .iter()
                .filter(|id| table.rows.remove(*id).is_some())
                .count()
        });
        drop(tables);

        tracing::debug!(%resource, removed, "records deleted");
        DeleteResponse {
            success: removed > 0,
        }
    }

    /// Number of rows currently stored for `resource`.
    pub async fn len(&self, resource: Resource) -> usize {
        let tables = self.tables.read().await;
        tables.get(&resource).map_or(0, |t| t.rows.len())
    }
}
