//! Integration tests for board and task management.
//!
//! Drives [`App`] intents through [`execute`] against an in-process
//! [`LocalService`], applying every outcome the way the UI loop does.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use taskflow::app::{App, Modal};
use taskflow::notify::Notifications;
use taskflow::records::RecordClient;
use taskflow::service::local::{Fault, LocalService};
use taskflow::sync::{SyncCommand, execute};
use taskflow_proto::{BoardId, Resource, TaskStatus};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    app: App,
    client: RecordClient<LocalService>,
}

impl Harness {
    async fn demo() -> Self {
        Self::with_service(LocalService::with_demo_data().await)
    }

    fn empty() -> Self {
        Self::with_service(LocalService::default())
    }

    fn with_service(service: LocalService) -> Self {
        let notifications = Notifications::new();
        Self {
            app: App::new(notifications.clone()),
            client: RecordClient::new(service, notifications),
        }
    }

    fn service(&self) -> &LocalService {
        self.client.service()
    }

    /// Runs a command and every follow-up it triggers.
    async fn run(&mut self, command: Option<SyncCommand>) {
        let mut next = command;
        while let Some(command) = next.take() {
            let Some(event) = execute(&self.client, command).await else {
                break;
            };
            next = self.app.apply_event(event);
        }
    }

    async fn start(&mut self) {
        let command = self.app.load_boards();
        self.run(Some(command)).await;
    }

    async fn key(&mut self, code: KeyCode) {
        let command = self.app.handle_key_event(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        });
        self.run(command).await;
    }

    async fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.key(KeyCode::Char(c)).await;
        }
    }

    fn latest(&self) -> Option<String> {
        self.app.notifications().latest().map(|n| n.message)
    }

    fn board_names(&self) -> Vec<String> {
        self.app
            .store
            .boards()
            .items
            .iter()
            .map(|b| b.name.clone())
            .collect()
    }
}

// ===========================================================================
// Loading
// ===========================================================================

#[tokio::test]
async fn startup_selects_first_board_and_loads_its_tasks() {
    let mut h = Harness::demo().await;
    h.start().await;

    assert_eq!(h.board_names(), vec!["Getting Started".to_string()]);
    let selected = h.app.store.selected_board_id().unwrap();
    let tasks = h.app.store.tasks(selected).unwrap();
    assert_eq!(tasks.items.len(), 4);

    let [todo, doing, done] = h.app.store.visible_columns();
    assert_eq!((todo.len(), doing.len(), done.len()), (2, 1, 1));
    assert!(h.app.notifications().is_empty());
}

#[tokio::test]
async fn failed_board_load_shows_error_then_recovers_on_reload() {
    let mut h = Harness::demo().await;
    h.service().inject(Fault::Unavailable);
    h.start().await;

    assert!(h.app.store.boards().state.error().is_some());
    assert_eq!(h.app.notifications().len(), 1);
    assert_eq!(h.latest().as_deref(), Some("Failed to load boards"));

    h.key(KeyCode::Char('r')).await;
    assert!(h.app.store.boards().state.error().is_none());
    assert_eq!(h.board_names().len(), 1);
}

#[tokio::test]
async fn empty_task_payload_marks_only_that_board_failed() {
    let mut h = Harness::demo().await;
    let command = h.app.load_boards();
    let event = execute(&h.client, command).await.unwrap();
    let follow_up = h.app.apply_event(event);
    assert!(matches!(follow_up, Some(SyncCommand::LoadTasks(_))));
    h.service().inject(Fault::EmptyPayload);
    h.run(follow_up).await;

    let selected = h.app.store.selected_board_id().unwrap();
    assert!(h.app.store.tasks(selected).unwrap().state.error().is_some());
    assert!(h.app.store.boards().state.error().is_none());
    assert_eq!(h.latest().as_deref(), Some("Failed to load tasks"));
}

#[tokio::test]
async fn reload_recovers_a_failed_task_list() {
    let mut h = Harness::demo().await;
    let command = h.app.load_boards();
    let event = execute(&h.client, command).await.unwrap();
    let follow_up = h.app.apply_event(event);
    h.service().inject(Fault::EmptyPayload);
    h.run(follow_up).await;
    let selected = h.app.store.selected_board_id().unwrap();
    assert!(h.app.store.tasks(selected).unwrap().state.error().is_some());

    h.key(KeyCode::Char('r')).await;
    let tasks = h.app.store.tasks(selected).unwrap();
    assert!(tasks.state.error().is_none());
    assert_eq!(tasks.items.len(), 4);
}

// ===========================================================================
// Boards
// ===========================================================================

#[tokio::test]
async fn creating_a_board_via_keys_selects_it() {
    let mut h = Harness::demo().await;
    h.start().await;

    h.key(KeyCode::Char('b')).await;
    assert!(matches!(h.app.modal, Some(Modal::Board(_))));
    h.type_text("Sprint 12").await;
    h.key(KeyCode::Enter).await;

    assert!(h.app.modal.is_none());
    assert_eq!(h.board_names()[0], "Sprint 12");
    assert_eq!(
        h.app.store.selected_board().map(|b| b.name.as_str()),
        Some("Sprint 12")
    );
    assert_eq!(h.latest().as_deref(), Some("Board created successfully"));
    // The new board's (empty) task list was fetched on selection.
    let selected = h.app.store.selected_board_id().unwrap();
    assert!(h.app.store.tasks(selected).unwrap().items.is_empty());
    assert_eq!(h.service().store().len(Resource::Board).await, 2);
}

#[tokio::test]
async fn blank_board_name_is_rejected_locally() {
    let mut h = Harness::demo().await;
    h.start().await;
    let calls = h.service().call_count();

    h.key(KeyCode::Char('b')).await;
    h.type_text("   ").await;
    h.key(KeyCode::Enter).await;

    assert_eq!(h.service().call_count(), calls);
    assert_eq!(h.latest().as_deref(), Some("Board name cannot be empty"));
    assert!(matches!(h.app.modal, Some(Modal::Board(_))));
}

#[tokio::test]
async fn renaming_a_board_updates_the_cache() {
    let mut h = Harness::demo().await;
    h.start().await;

    h.key(KeyCode::Char('B')).await;
    for _ in 0.."Getting Started".len() {
        h.key(KeyCode::Backspace).await;
    }
    h.type_text("Onboarding").await;
    h.key(KeyCode::Enter).await;

    assert_eq!(h.board_names(), vec!["Onboarding".to_string()]);
    assert_eq!(h.latest().as_deref(), Some("Board updated successfully"));
}

#[tokio::test]
async fn only_board_is_never_sent_for_deletion() {
    let mut h = Harness::demo().await;
    h.start().await;
    let calls = h.service().call_count();

    h.key(KeyCode::Char('D')).await;

    assert_eq!(h.service().call_count(), calls);
    assert_eq!(h.latest().as_deref(), Some("Cannot delete the only board"));
    assert_eq!(h.board_names().len(), 1);
}

#[tokio::test]
async fn deleting_the_selected_board_falls_back_to_the_next() {
    let mut h = Harness::demo().await;
    h.start().await;
    let original = h.app.store.selected_board_id().unwrap();

    h.key(KeyCode::Char('b')).await;
    h.type_text("Scratch").await;
    h.key(KeyCode::Enter).await;
    let scratch = h.app.store.selected_board_id().unwrap();
    assert_ne!(scratch, original);

    h.key(KeyCode::Char('D')).await;

    assert_eq!(h.app.store.selected_board_id(), Some(original));
    assert!(h.app.store.tasks(scratch).is_none());
    assert_eq!(h.latest().as_deref(), Some("Board deleted successfully"));
}

#[tokio::test]
async fn rejected_board_delete_keeps_the_board() {
    let mut h = Harness::demo().await;
    h.start().await;
    h.key(KeyCode::Char('b')).await;
    h.type_text("Keep me").await;
    h.key(KeyCode::Enter).await;

    h.service().inject(Fault::Rejected);
    h.key(KeyCode::Char('D')).await;

    assert_eq!(h.board_names().len(), 2);
    assert_eq!(h.latest().as_deref(), Some("Failed to delete board"));
}

#[tokio::test]
async fn first_board_on_empty_service() {
    let mut h = Harness::empty();
    h.start().await;
    assert!(h.app.store.selected_board_id().is_none());

    h.key(KeyCode::Char('n')).await;
    assert!(h.app.modal.is_none());

    let command = {
        h.app.open_board_form();
        if let Some(Modal::Board(form)) = &mut h.app.modal {
            form.name = "Inbox".into();
        }
        h.app.submit_board_form()
    };
    h.run(command).await;
    assert!(h.app.store.selected_board_id().is_some());
}

// ===========================================================================
// Tasks
// ===========================================================================

#[tokio::test]
async fn creating_a_task_via_keys() {
    let mut h = Harness::demo().await;
    h.start().await;
    let board = h.app.store.selected_board_id().unwrap();

    h.key(KeyCode::Char('n')).await;
    h.type_text("Ship release").await;
    h.key(KeyCode::Enter).await;

    assert!(h.app.modal.is_none());
    assert_eq!(h.latest().as_deref(), Some("Task created successfully"));
    let tasks = &h.app.store.tasks(board).unwrap().items;
    assert_eq!(tasks.len(), 5);
    assert_eq!(tasks[0].title, "Ship release");
    assert_eq!(tasks[0].status, TaskStatus::Todo);
}

#[tokio::test]
async fn empty_title_keeps_form_open_without_a_call() {
    let mut h = Harness::demo().await;
    h.start().await;
    let calls = h.service().call_count();

    h.key(KeyCode::Char('n')).await;
    h.key(KeyCode::Enter).await;

    assert_eq!(h.service().call_count(), calls);
    assert_eq!(h.latest().as_deref(), Some("Task title is required"));
    assert!(matches!(h.app.modal, Some(Modal::Task(_))));
}

#[tokio::test]
async fn failed_task_create_allows_resubmit() {
    let mut h = Harness::demo().await;
    h.start().await;

    h.key(KeyCode::Char('n')).await;
    h.type_text("Flaky").await;
    h.service().inject(Fault::Unavailable);
    h.key(KeyCode::Enter).await;

    assert_eq!(h.latest().as_deref(), Some("Failed to create task"));
    assert!(matches!(h.app.modal, Some(Modal::Task(ref f)) if !f.is_submitting()));

    h.key(KeyCode::Enter).await;
    assert!(h.app.modal.is_none());
    assert_eq!(h.latest().as_deref(), Some("Task created successfully"));
}

#[tokio::test]
async fn editing_a_task_replaces_it_in_place() {
    let mut h = Harness::demo().await;
    h.start().await;
    let id = h.app.focused_task().unwrap().id;

    h.key(KeyCode::Char('e')).await;
    h.type_text("!").await;
    h.key(KeyCode::Enter).await;

    let task = h.app.store.find_task(id).unwrap();
    assert!(task.title.ends_with('!'));
    assert_eq!(h.latest().as_deref(), Some("Task updated successfully"));
}

#[tokio::test]
async fn deleting_a_task_removes_it() {
    let mut h = Harness::demo().await;
    h.start().await;
    let board = h.app.store.selected_board_id().unwrap();
    let id = h.app.focused_task().unwrap().id;

    h.key(KeyCode::Char('x')).await;

    assert!(h.app.store.find_task(id).is_none());
    assert_eq!(h.app.store.tasks(board).unwrap().items.len(), 3);
    assert_eq!(h.latest().as_deref(), Some("Task deleted"));
}

#[tokio::test]
async fn switching_boards_fetches_tasks_once() {
    let mut h = Harness::demo().await;
    h.start().await;
    let demo = h.app.store.selected_board_id().unwrap();
    h.key(KeyCode::Char('b')).await;
    h.type_text("Other").await;
    h.key(KeyCode::Enter).await;

    let calls = h.service().call_count();
    let command = h.app.select_board(demo);
    assert!(command.is_none(), "demo board tasks are already cached");
    h.run(command).await;
    assert_eq!(h.service().call_count(), calls);
    assert_eq!(h.app.store.selected_board_id(), Some(demo));
    assert!(h.app.select_board(BoardId::new(9999)).is_none());
}
