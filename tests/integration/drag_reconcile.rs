//! Integration tests for optimistic drag-and-drop reconciliation.
//!
//! Drives `ProjectBoard` against the in-memory backend with paused tokio
//! time, so request latency and the refetch quiet interval are virtual.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::mpsc;
use tokio::time::Instant;

use taskboard::api::ApiError;
use taskboard::api::memory::MemoryApi;
use taskboard::board::ProjectBoard;
use taskboard::board::reconciler::{DragOutcome, IgnoreReason, MoveHandle, MoveOutcome};
use taskboard::notice::{self, Notice};
use taskboard_proto::board::Board;
use taskboard_proto::id::{BoardId, EntityRef, ProjectId, TaskId};
use taskboard_proto::project::Project;
use taskboard_proto::task::Task;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

const QUIET: Duration = Duration::from_millis(1000);
const LATENCY: Duration = Duration::from_millis(100);

fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn project() -> Project {
    Project {
        id: ProjectId::from("p1"),
        name: "Launch".to_string(),
        description: None,
        owner: None,
        members: Vec::new(),
        created_at: Some(epoch()),
    }
}

fn board(id: &str, title: &str, offset_secs: i64) -> Board {
    Board {
        id: BoardId::from(id),
        title: title.to_string(),
        description: None,
        project: Some(EntityRef::from(ProjectId::from("p1"))),
        owner: None,
        created_at: Some(epoch() + TimeDelta::seconds(offset_secs)),
    }
}

/// A task whose board is embedded as an object, as the backend sends it.
fn task(id: &str, board: &str) -> Task {
    serde_json::from_value(serde_json::json!({
        "_id": id,
        "title": format!("Card {id}"),
        "board": { "_id": board, "title": board },
    }))
    .unwrap()
}

/// Backend with boards `b1` ("Todo"), `b2` ("Doing"), `b3` ("Done") and
/// the given tasks.
fn backend(latency: Duration, tasks: &[(&str, &str)]) -> Arc<MemoryApi> {
    let api = MemoryApi::new().with_latency(latency);
    api.insert_project(project());
    api.insert_board(board("b1", "Todo", 0));
    api.insert_board(board("b2", "Doing", 1));
    api.insert_board(board("b3", "Done", 2));
    for (id, board) in tasks {
        api.insert_task(task(id, board));
    }
    Arc::new(api)
}

async fn open(
    api: &Arc<MemoryApi>,
) -> (ProjectBoard<MemoryApi>, mpsc::Receiver<Notice>) {
    let (notices, rx) = notice::channel(32);
    let board = ProjectBoard::new(Arc::clone(api), ProjectId::from("p1"), QUIET, notices);
    board.load().await.unwrap();
    (board, rx)
}

fn started(outcome: DragOutcome) -> MoveHandle {
    match outcome {
        DragOutcome::Started(handle) => handle,
        DragOutcome::Ignored(reason) => panic!("drop was ignored: {reason:?}"),
    }
}

fn local_board(board: &ProjectBoard<MemoryApi>, task: &str) -> Option<String> {
    board
        .state()
        .lock()
        .tasks
        .board_of(&TaskId::from(task))
        .map(ToString::to_string)
}

fn drain(rx: &mut mpsc::Receiver<Notice>) -> Vec<Notice> {
    let mut out = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        out.push(notice);
    }
    out
}

async fn settle(duration: Duration) {
    tokio::time::sleep(duration).await;
    tokio::task::yield_now().await;
}

// ===========================================================================
// Guards
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn second_drag_while_pending_sends_no_request() {
    let api = backend(LATENCY, &[("t1", "b1")]);
    let (board, _rx) = open(&api).await;
    let reconciler = board.reconciler();

    let first = started(reconciler.on_drag_end("t1", "b2"));
    assert_eq!(
        reconciler.on_drag_end("t1", "b3").ignored(),
        Some(IgnoreReason::AlreadyPending)
    );
    assert_eq!(
        reconciler.on_drag_end("t1", "b1").ignored(),
        Some(IgnoreReason::AlreadyPending)
    );

    first.outcome().await.unwrap();
    assert_eq!(api.calls().update_task, 1);
    assert_eq!(api.task(&TaskId::from("t1")).unwrap().board_id().as_str(), "b2");
}

#[tokio::test(start_paused = true)]
async fn drop_on_own_board_is_a_byte_identical_noop() {
    let api = backend(Duration::ZERO, &[("t1", "b1"), ("t2", "b1")]);
    let (board, mut rx) = open(&api).await;
    let before = serde_json::to_string(board.state().lock().tasks.as_slice()).unwrap();

    let reconciler = board.reconciler();
    assert_eq!(
        reconciler.on_drag_end("t1", "b1").ignored(),
        Some(IgnoreReason::SameBoard)
    );
    // Dropping onto a sibling card resolves to the same board.
    assert_eq!(
        reconciler.on_drag_end("t1", "t2").ignored(),
        Some(IgnoreReason::SameBoard)
    );

    settle(QUIET * 2).await;
    let after = serde_json::to_string(board.state().lock().tasks.as_slice()).unwrap();
    assert_eq!(before, after);
    assert_eq!(api.calls().update_task, 0);
    assert!(reconciler.pending().lock().is_empty());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn unknown_task_or_destination_is_ignored() {
    let api = backend(Duration::ZERO, &[("t1", "b1")]);
    let (board, mut rx) = open(&api).await;
    let reconciler = board.reconciler();

    assert_eq!(
        reconciler.on_drag_end("ghost", "b2").ignored(),
        Some(IgnoreReason::UnknownTask)
    );
    assert_eq!(
        reconciler.on_drag_end("t1", "nowhere").ignored(),
        Some(IgnoreReason::UnknownDestination)
    );
    assert_eq!(local_board(&board, "t1").as_deref(), Some("b1"));
    assert_eq!(api.calls().update_task, 0);
    assert!(drain(&mut rx).is_empty());
}

// ===========================================================================
// Optimistic application and confirmation
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn move_is_visible_before_the_request_resolves() {
    let api = backend(LATENCY, &[("t1", "b1")]);
    let (board, _rx) = open(&api).await;

    let handle = started(board.reconciler().on_drag_end("t1", "b2"));
    assert_eq!(local_board(&board, "t1").as_deref(), Some("b2"));
    assert_eq!(api.task(&TaskId::from("t1")).unwrap().board_id().as_str(), "b1");
    assert_eq!(board.snapshot().pending, vec![TaskId::from("t1")]);

    let outcome = handle.outcome().await.unwrap();
    assert_eq!(
        outcome,
        MoveOutcome::Confirmed {
            task: TaskId::from("t1"),
            board: BoardId::from("b2"),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn drop_on_card_moves_to_that_cards_board() {
    let api = backend(Duration::ZERO, &[("t1", "b1"), ("t9", "b3")]);
    let (board, _rx) = open(&api).await;

    let handle = started(board.reconciler().on_drag_end("t1", "t9"));
    assert_eq!(handle.to.as_str(), "b3");
    handle.outcome().await.unwrap();
    assert_eq!(api.task(&TaskId::from("t1")).unwrap().board_id().as_str(), "b3");
}

#[tokio::test(start_paused = true)]
async fn different_tasks_move_concurrently() {
    let api = backend(LATENCY, &[("t1", "b1"), ("t2", "b1")]);
    let (board, _rx) = open(&api).await;
    let reconciler = board.reconciler();

    let first = started(reconciler.on_drag_end("t1", "b2"));
    let second = started(reconciler.on_drag_end("t2", "b3"));
    assert_eq!(reconciler.pending().lock().len(), 2);

    assert!(matches!(
        first.outcome().await,
        Some(MoveOutcome::Confirmed { .. })
    ));
    assert!(matches!(
        second.outcome().await,
        Some(MoveOutcome::Confirmed { .. })
    ));
    assert_eq!(api.calls().update_task, 2);
    assert!(reconciler.pending().lock().is_empty());
}

// ===========================================================================
// Debounced refetch
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn end_to_end_single_move() {
    let api = backend(Duration::ZERO, &[("t1", "b1")]);
    let (board, mut rx) = open(&api).await;
    let loads = api.calls().get_project;

    let handle = started(board.reconciler().on_drag_end("t1", "b2"));
    assert!(board.reconciler().pending().lock().contains(&TaskId::from("t1")));
    assert_eq!(local_board(&board, "t1").as_deref(), Some("b2"));

    handle.outcome().await.unwrap();
    assert!(!board.reconciler().pending().lock().contains(&TaskId::from("t1")));
    assert_eq!(
        drain(&mut rx),
        vec![Notice::Success("Task \"Card t1\" moved to Doing".to_string())]
    );
    assert!(board.batcher().is_scheduled());
    assert_eq!(api.calls().get_project, loads);

    settle(QUIET + Duration::from_millis(1)).await;
    assert_eq!(api.calls().get_project, loads + 1);
    assert_eq!(local_board(&board, "t1").as_deref(), Some("b2"));

    settle(QUIET * 3).await;
    assert_eq!(api.calls().get_project, loads + 1);
}

#[tokio::test(start_paused = true)]
async fn burst_of_moves_coalesces_into_one_refetch() {
    let api = backend(Duration::ZERO, &[("t1", "b1"), ("t2", "b1"), ("t3", "b1")]);
    let (board, _rx) = open(&api).await;
    let loads = api.calls().list_boards;

    for id in ["t1", "t2", "t3"] {
        let handle = started(board.reconciler().on_drag_end(id, "b2"));
        handle.outcome().await.unwrap();
        settle(Duration::from_millis(400)).await;
    }
    // 1200ms since the first move, 400ms since the last.
    assert_eq!(api.calls().list_boards, loads);

    settle(Duration::from_millis(599)).await;
    assert_eq!(api.calls().list_boards, loads);

    settle(Duration::from_millis(2)).await;
    assert_eq!(api.calls().list_boards, loads + 1);

    settle(QUIET * 3).await;
    assert_eq!(api.calls().list_boards, loads + 1);
}

#[tokio::test(start_paused = true)]
async fn refetch_waits_for_all_pending_moves() {
    let api = backend(LATENCY, &[("t1", "b1"), ("t2", "b1")]);
    let (board, _rx) = open(&api).await;
    let loads = api.calls().list_boards;

    let first = started(board.reconciler().on_drag_end("t1", "b2"));
    settle(Duration::from_millis(50)).await;
    let second = started(board.reconciler().on_drag_end("t2", "b2"));

    first.outcome().await.unwrap();
    // t2 is still in flight, so nothing is scheduled yet.
    assert!(!board.batcher().is_scheduled());

    second.outcome().await.unwrap();
    assert!(board.batcher().is_scheduled());
    settle(QUIET + Duration::from_millis(1)).await;
    assert_eq!(api.calls().list_boards, loads + 1);
}

// ===========================================================================
// Rollback
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn failed_move_refetches_immediately() {
    let api = backend(Duration::ZERO, &[("t1", "b1")]);
    let (board, mut rx) = open(&api).await;
    let loads = api.calls().get_project;
    api.fail_next_task_update(ApiError::Status {
        status: 500,
        message: None,
    });

    let started_at = Instant::now();
    let handle = started(board.reconciler().on_drag_end("t1", "b2"));
    let outcome = handle.outcome().await.unwrap();

    assert!(matches!(outcome, MoveOutcome::RolledBack { .. }));
    assert!(started_at.elapsed() < QUIET);
    assert_eq!(api.calls().get_project, loads + 1);
    assert_eq!(
        drain(&mut rx),
        vec![Notice::Error("Failed to move task".to_string())]
    );
    assert_eq!(local_board(&board, "t1").as_deref(), Some("b1"));
    assert!(!board.batcher().is_scheduled());
}

#[tokio::test(start_paused = true)]
async fn rollback_lands_on_server_truth() {
    let api = backend(LATENCY, &[("t1", "b1")]);
    let (board, mut rx) = open(&api).await;
    api.fail_next_task_update(ApiError::status(403, "You are not a member of this project"));

    let handle = started(board.reconciler().on_drag_end("t1", "b2"));
    // Another client moves the card while our request is in flight.
    api.insert_task(task("t1", "b3"));

    handle.outcome().await.unwrap();
    assert_eq!(local_board(&board, "t1").as_deref(), Some("b3"));
    assert_eq!(
        drain(&mut rx),
        vec![Notice::Error("You are not a member of this project".to_string())]
    );
    assert!(board.reconciler().pending().lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn rollback_restores_locally_when_backend_is_down() {
    let api = backend(Duration::ZERO, &[("t1", "b1")]);
    let (board, mut rx) = open(&api).await;
    api.fail_next_task_update(ApiError::Network("connection refused".to_string()));
    api.fail_board_listing(Some(ApiError::Network("connection refused".to_string())));

    let handle = started(board.reconciler().on_drag_end("t1", "b2"));
    handle.outcome().await.unwrap();

    assert_eq!(local_board(&board, "t1").as_deref(), Some("b1"));
    assert_eq!(
        drain(&mut rx),
        vec![
            Notice::Error("Failed to move task".to_string()),
            Notice::Error("Failed to load project".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn failure_supersedes_scheduled_refetch() {
    let api = backend(Duration::ZERO, &[("t1", "b1"), ("t2", "b1")]);
    let (board, _rx) = open(&api).await;
    let loads = api.calls().get_project;

    started(board.reconciler().on_drag_end("t1", "b2"))
        .outcome()
        .await
        .unwrap();
    assert!(board.batcher().is_scheduled());

    api.fail_next_task_update(ApiError::status(500, "boom"));
    started(board.reconciler().on_drag_end("t2", "b3"))
        .outcome()
        .await
        .unwrap();
    assert!(!board.batcher().is_scheduled());
    assert_eq!(api.calls().get_project, loads + 1);

    settle(QUIET * 2).await;
    assert_eq!(api.calls().get_project, loads + 1);
    assert_eq!(local_board(&board, "t1").as_deref(), Some("b2"));
    assert_eq!(local_board(&board, "t2").as_deref(), Some("b1"));
}
