//! In-process record service.
//!
//! Wraps a shared [`RecordStore`] so the client can run without a remote
//! service (demo mode) and so tests can drive the full client stack. Faults
//! can be queued with [`LocalService::inject`]; each queued fault replaces
//! the outcome of exactly one subsequent call.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use taskflow_proto::normalize::{board_record, parse_id, task_record};
use taskflow_proto::record::{
    DeleteParams, DeleteResponse, FetchParams, FetchResponse, MutationResponse, RecordsParams,
    fields,
};
use taskflow_proto::{BoardDraft, BoardId, Priority, Resource, TaskDraft, TaskStatus};
use taskflow_records::store::RecordStore;

use super::{RecordService, ServiceError};

/// A simulated failure for the next service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The call fails at the transport level.
    Unavailable,
    /// The call succeeds but carries no payload (`data` absent, or no
    /// result records).
    EmptyPayload,
    /// The service answers with `success: false`.
    Rejected,
}

/// Record service backed by in-process tables.
#[derive(Debug)]
pub struct LocalService {
    store: Arc<RecordStore>,
    faults: Mutex<VecDeque<Fault>>,
    calls: AtomicUsize,
}

impl Default for LocalService {
    fn default() -> Self {
        Self::new(Arc::new(RecordStore::default()))
    }
}

const DEMO_TASKS: [(&str, TaskStatus, Priority, &[&str]); 4] = [
    (
        "Explore the board",
        TaskStatus::Todo,
        Priority::High,
        &["welcome"],
    ),
    (
        "Drag a task to another column",
        TaskStatus::InProgress,
        Priority::Medium,
        &["welcome", "drag"],
    ),
    (
        "Create a board of your own",
        TaskStatus::Todo,
        Priority::Low,
        &[],
    ),
    (
        "Open TaskFlow",
        TaskStatus::Done,
        Priority::Urgent,
        &["welcome"],
    ),
];

/// Seeds `store` with a demo board and a handful of tasks.
pub async fn seed_demo(store: &RecordStore) {
    let draft = BoardDraft::new("Getting Started", Some("A short tour of TaskFlow".into()));
    let created = store
        .create(Resource::Board, RecordsParams::single(board_record(&draft)))
        .await;
    let Some(board_id) = created
        .into_first_record()
        .and_then(|r| r.get(fields::ID).and_then(|id| parse_id(id).ok()))
    else {
        tracing::warn!("demo board was not created");
        return;
    };

    for (title, status, priority, tags) in DEMO_TASKS {
        let draft = TaskDraft {
            status: Some(status),
            priority: Some(priority),
            tags: Some(tags.iter().map(|t| (*t).to_string()).collect()),
            ..TaskDraft::new(BoardId::new(board_id), title)
        };
        store
            .create(Resource::Task, RecordsParams::single(task_record(&draft, None)))
            .await;
    }
}

impl LocalService {
    /// Creates a service over shared tables.
    #[must_use]
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self {
            store,
            faults: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Creates a service over fresh tables seeded with demo data.
    pub async fn with_demo_data() -> Self {
        let store = Arc::new(RecordStore::default());
        seed_demo(&store).await;
        Self::new(store)
    }

    /// Backing tables.
    #[must_use]
    pub const fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Queues a fault for a subsequent call.
    pub fn inject(&self, fault: Fault) {
        self.faults.lock().push_back(fault);
    }

    /// Number of calls received so far, including faulted ones.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> Option<Fault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.faults.lock().pop_front()
    }
}

fn unavailable() -> ServiceError {
    ServiceError::Unreachable("local service unavailable".to_string())
}

impl RecordService for LocalService {
    async fn fetch(
        &self,
        resource: Resource,
        params: FetchParams,
    ) -> Result<FetchResponse, ServiceError> {
        match self.begin_call() {
            Some(Fault::Unavailable) => Err(unavailable()),
            Some(Fault::EmptyPayload | Fault::Rejected) => Ok(FetchResponse { data: None }),
            None => Ok(self.store.fetch(resource, &params).await),
        }
    }

    async fn create(
        &self,
        resource: Resource,
        params: RecordsParams,
    ) -> Result<MutationResponse, ServiceError> {
        match self.begin_call() {
            Some(Fault::Unavailable) => Err(unavailable()),
            Some(Fault::EmptyPayload) => Ok(MutationResponse {
                success: true,
                results: Vec::new(),
            }),
            Some(Fault::Rejected) => Ok(MutationResponse::default()),
            None => Ok(self.store.create(resource, params).await),
        }
    }

    async fn update(
        &self,
        resource: Resource,
        params: RecordsParams,
    ) -> Result<MutationResponse, ServiceError> {
        match self.begin_call() {
            Some(Fault::Unavailable) => Err(unavailable()),
            Some(Fault::EmptyPayload) => Ok(MutationResponse {
                success: true,
                results: Vec::new(),
            }),
            Some(Fault::Rejected) => Ok(MutationResponse::default()),
            None => Ok(self.store.update(resource, params).await),
        }
    }

    async fn delete(
        &self,
        resource: Resource,
        params: DeleteParams,
    ) -> Result<DeleteResponse, ServiceError> {
        match self.begin_call() {
            Some(Fault::Unavailable) => Err(unavailable()),
            Some(Fault::EmptyPayload | Fault::Rejected) => Ok(DeleteResponse { success: false }),
            None => Ok(self.store.delete(resource, &params).await),
        }
    }
}
