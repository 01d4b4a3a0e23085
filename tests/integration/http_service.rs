//! Integration tests for the HTTP record service.
//!
//! Each test starts a `taskflow-records` server on an ephemeral port and
//! talks to it through [`HttpService`] and [`RecordClient`].

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use taskflow::notify::Notifications;
use taskflow::records::{RecordClient, RemoteError};
use taskflow::service::ServiceError;
use taskflow::service::http::HttpService;
use taskflow_proto::{BoardDraft, BoardId, Priority, TaskDraft, TaskId, TaskStatus};
use taskflow_records::server::{ServerState, start_server, start_server_with_state};
use taskflow_records::store::RecordStore;

const TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn client() -> RecordClient<HttpService> {
    let (addr, _handle) = start_server("127.0.0.1:0").await.unwrap();
    let service = HttpService::new(&format!("http://{addr}"), TIMEOUT).unwrap();
    RecordClient::new(service, Notifications::new())
}

async fn board(client: &RecordClient<HttpService>, name: &str) -> BoardId {
    client
        .create_board(&BoardDraft::new(name, None))
        .await
        .unwrap()
        .id
}

// ===========================================================================
// Boards
// ===========================================================================

#[tokio::test]
async fn create_and_list_boards() {
    let client = client().await;
    let draft = BoardDraft {
        tags: vec!["ops".into()],
        ..BoardDraft::new("Operations", Some("on-call work".into()))
    };

    let created = client.create_board(&draft).await.unwrap();
    assert_eq!(created.name, "Operations");
    assert_eq!(created.description.as_deref(), Some("on-call work"));
    assert_eq!(created.tags, vec!["ops".to_string()]);

    let boards = client.list_boards().await.unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0].id, created.id);
    assert!(client.notifications().is_empty());
}

#[tokio::test]
async fn update_and_delete_board() {
    let client = client().await;
    let mut created = client
        .create_board(&BoardDraft::new("Draft", None))
        .await
        .unwrap();

    created.name = "Final".into();
    let updated = client.update_board(&created).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Final");

    assert!(client.delete_board(created.id).await.unwrap());
    assert!(client.list_boards().await.unwrap().is_empty());
    assert!(!client.delete_board(created.id).await.unwrap());
}

// ===========================================================================
// Tasks
// ===========================================================================

#[tokio::test]
async fn tasks_are_scoped_to_their_board() {
    let client = client().await;
    let a = board(&client, "A").await;
    let b = board(&client, "B").await;

    client.create_task(&TaskDraft::new(a, "in a")).await.unwrap();
    client.create_task(&TaskDraft::new(b, "in b")).await.unwrap();
    client.create_task(&TaskDraft::new(a, "also a")).await.unwrap();

    let tasks = client.list_tasks(a).await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.board_id == a));
    assert_eq!(client.list_tasks(b).await.unwrap().len(), 1);
}

#[tokio::test]
async fn created_task_gets_defaults() {
    let client = client().await;
    let board_id = board(&client, "Defaults").await;

    let task = client
        .create_task(&TaskDraft::new(board_id, "bare"))
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(task.priority, Priority::Medium);
    assert!(task.description.is_none());
    assert!(task.due_date.is_none());
    assert!(task.tags.is_empty());
}

#[tokio::test]
async fn full_update_then_status_move() {
    let client = client().await;
    let board_id = board(&client, "Work").await;
    let task = client
        .create_task(&TaskDraft::new(board_id, "write report"))
        .await
        .unwrap();

    let due = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let draft = TaskDraft {
        description: Some("quarterly".into()),
        priority: Some(Priority::Urgent),
        due_date: Some(due),
        tags: Some(vec!["finance".into()]),
        ..TaskDraft::new(board_id, "write Q1 report")
    };
    let updated = client.update_task(task.id, &draft).await.unwrap();
    assert_eq!(updated.id, task.id);
    assert_eq!(updated.title, "write Q1 report");
    assert_eq!(updated.priority, Priority::Urgent);
    assert_eq!(updated.due_date, Some(due));
    assert_eq!(updated.tags, vec!["finance".to_string()]);

    assert!(
        client
            .update_task_status(task.id, TaskStatus::InProgress)
            .await
            .unwrap()
    );
    let listed = client.list_tasks(board_id).await.unwrap();
    assert_eq!(listed[0].status, TaskStatus::InProgress);
    assert_eq!(listed[0].title, "write Q1 report");
}

#[tokio::test]
async fn deleting_unknown_task_reports_false() {
    let client = client().await;
    assert!(!client.delete_task(TaskId::new(424_242)).await.unwrap());
    assert!(client.notifications().is_empty());
}

// ===========================================================================
// Failures
// ===========================================================================

#[tokio::test]
async fn wrong_credentials_are_rejected_and_notified() {
    let state = ServerState::new(RecordStore::default())
        .with_credentials(Some("proj-1".into()), Some("pk-live".into()));
    let (addr, _handle) = start_server_with_state("127.0.0.1:0", Arc::new(state))
        .await
        .unwrap();
    let url = format!("http://{addr}");

    let good = RecordClient::new(
        HttpService::new(&url, TIMEOUT)
            .unwrap()
            .with_credentials(Some("proj-1".into()), Some("pk-live".into())),
        Notifications::new(),
    );
    assert!(good.list_boards().await.unwrap().is_empty());

    let bad = RecordClient::new(
        HttpService::new(&url, TIMEOUT)
            .unwrap()
            .with_credentials(Some("proj-1".into()), Some("wrong".into())),
        Notifications::new(),
    );
    let err = bad.list_boards().await.unwrap_err();
    assert!(matches!(
        err,
        RemoteError::Service(ServiceError::Status { status: 401, .. })
    ));
    assert_eq!(bad.notifications().messages(), vec!["Failed to load boards"]);
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RecordClient::new(
        HttpService::new(&format!("http://{addr}"), TIMEOUT).unwrap(),
        Notifications::new(),
    );
    let err = client.list_boards().await.unwrap_err();
    assert!(matches!(err, RemoteError::Service(ServiceError::Unreachable(_))));
    assert_eq!(client.notifications().len(), 1);
}

#[test]
fn non_http_urls_are_refused() {
    assert!(matches!(
        HttpService::new("ftp://example.com", TIMEOUT),
        Err(ServiceError::InvalidUrl(_))
    ));
    assert!(matches!(
        HttpService::new("not a url", TIMEOUT),
        Err(ServiceError::InvalidUrl(_))
    ));
}
