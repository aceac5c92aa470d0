//! Integration tests for project loading, the project overview and board
//! CRUD against the in-memory backend.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use taskboard::api::memory::MemoryApi;
use taskboard::api::{ApiError, BoardApi};
use taskboard::board::ProjectBoard;
use taskboard::notice::{self, Notice};
use taskboard::projects::load_with_stats;
use taskboard::session::Answer;
use taskboard_proto::board::Board;
use taskboard_proto::id::{BoardId, EntityRef, ProjectId, TaskId};
use taskboard_proto::project::{Project, ProjectStats};
use taskboard_proto::task::{Task, TaskForm};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

const QUIET: Duration = Duration::from_millis(1000);

fn project(id: &str, name: &str) -> Project {
    Project {
        id: ProjectId::from(id),
        name: name.to_string(),
        description: None,
        owner: None,
        members: Vec::new(),
        created_at: None,
    }
}

fn board(id: &str, project: &str, created: Option<i64>) -> Board {
    Board {
        id: BoardId::from(id),
        title: id.to_uppercase(),
        description: None,
        project: Some(EntityRef::from(ProjectId::from(project))),
        owner: None,
        created_at: created.map(|offset| {
            DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + TimeDelta::seconds(offset)
        }),
    }
}

fn task(id: &str, board: &str, status: &str) -> Task {
    serde_json::from_value(serde_json::json!({
        "_id": id,
        "title": id,
        "board": board,
        "status": status,
    }))
    .unwrap()
}

/// Project `p1` with boards created out of order relative to insertion.
fn backend() -> Arc<MemoryApi> {
    let api = MemoryApi::new();
    api.insert_project(project("p1", "Launch"));
    api.insert_board(board("late", "p1", Some(30)));
    api.insert_board(board("early", "p1", Some(10)));
    api.insert_board(board("undated", "p1", None));
    api.insert_board(board("middle", "p1", Some(20)));
    api.insert_task(task("t1", "early", "todo"));
    api.insert_task(task("t2", "late", "completed"));
    api.insert_task(task("t3", "middle", "in_progress"));
    Arc::new(api)
}

fn open(api: &Arc<MemoryApi>) -> (ProjectBoard<MemoryApi>, mpsc::Receiver<Notice>) {
    let (notices, rx) = notice::channel(16);
    (
        ProjectBoard::new(Arc::clone(api), ProjectId::from("p1"), QUIET, notices),
        rx,
    )
}

fn board_order(board: &ProjectBoard<MemoryApi>) -> Vec<String> {
    board
        .snapshot()
        .boards
        .iter()
        .map(|b| b.id.to_string())
        .collect()
}

// ===========================================================================
// Loading
// ===========================================================================

#[tokio::test]
async fn load_sorts_boards_and_flattens_tasks() {
    let api = backend();
    let (board, _rx) = open(&api);
    board.load().await.unwrap();

    assert_eq!(board_order(&board), ["undated", "early", "middle", "late"]);
    let snapshot = board.snapshot();
    assert_eq!(snapshot.project_name, "Launch");
    assert_eq!(snapshot.tasks.len(), 3);
    assert_eq!(api.calls().list_tasks, 4);
}

#[tokio::test]
async fn failing_board_contributes_no_tasks() {
    let api = backend();
    api.fail_task_listing(BoardId::from("late"), ApiError::Network("reset".to_string()));
    let (board, mut rx) = open(&api);
    board.load().await.unwrap();

    let ids: Vec<String> = board
        .snapshot()
        .tasks
        .iter()
        .map(|t| t.id.to_string())
        .collect();
    assert!(!ids.contains(&"t2".to_string()));
    assert_eq!(ids.len(), 2);
    assert_eq!(board_order(&board).len(), 4);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn failed_reload_keeps_stale_state() {
    let api = backend();
    let (board, mut rx) = open(&api);
    board.load().await.unwrap();
    let before = board.snapshot();

    api.insert_task(task("t4", "early", "todo"));
    api.fail_board_listing(Some(ApiError::status(500, "db down")));
    let err = board.load().await.unwrap_err();

    assert_eq!(err, ApiError::status(500, "db down"));
    assert_eq!(
        rx.try_recv().unwrap(),
        Notice::Error("Failed to load project".to_string())
    );
    let after = board.snapshot();
    assert_eq!(after.tasks, before.tasks);
    assert_eq!(after.boards, before.boards);

    api.fail_board_listing(None);
    board.load().await.unwrap();
    assert_eq!(board.snapshot().tasks.len(), 4);
}

#[tokio::test]
async fn unknown_project_reports_not_found() {
    let api = backend();
    let (notices, mut rx) = notice::channel(4);
    let board = ProjectBoard::new(Arc::clone(&api), ProjectId::from("nope"), QUIET, notices);

    let err = board.load().await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, .. }));
    assert!(rx.try_recv().unwrap().is_error());
    assert!(board.snapshot().boards.is_empty());
}

// ===========================================================================
// Project overview
// ===========================================================================

#[tokio::test]
async fn overview_counts_boards_tasks_and_completed() {
    let api = backend();
    api.insert_project(project("p2", "Empty"));

    let mut overviews = load_with_stats(Arc::clone(&api)).await.unwrap();
    overviews.sort_by(|a, b| a.project.id.cmp(&b.project.id));

    assert_eq!(
        overviews[0].stats,
        ProjectStats {
            boards: 4,
            tasks: 3,
            completed: 1,
        }
    );
    assert_eq!(overviews[1].stats, ProjectStats::default());
}

#[tokio::test]
async fn overview_counts_failures_as_zero() {
    let api = backend();
    api.fail_task_listing(BoardId::from("late"), ApiError::Network("reset".to_string()));

    let overviews = load_with_stats(Arc::clone(&api)).await.unwrap();
    assert_eq!(
        overviews[0].stats,
        ProjectStats {
            boards: 4,
            tasks: 2,
            completed: 0,
        }
    );
}

// ===========================================================================
// Board session
// ===========================================================================

#[tokio::test]
async fn create_task_notifies_and_reloads() {
    let api = backend();
    let (board, mut rx) = open(&api);
    board.load().await.unwrap();

    let created = board
        .session()
        .create_task(TaskForm::new_task("Write changelog", BoardId::from("middle")))
        .await
        .unwrap();

    assert_eq!(
        rx.try_recv().unwrap(),
        Notice::Success("Task created successfully".to_string())
    );
    assert!(board.snapshot().tasks.iter().any(|t| t.id == created.id));
}

#[tokio::test]
async fn failed_create_surfaces_backend_message_without_reload() {
    let api = backend();
    let (board, mut rx) = open(&api);
    board.load().await.unwrap();
    let loads = api.calls().get_project;

    let err = board
        .session()
        .create_task(TaskForm::new_task("Lost", BoardId::from("gone")))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 404, .. }));
    assert_eq!(
        rx.try_recv().unwrap(),
        Notice::Error("Board not found".to_string())
    );
    assert_eq!(api.calls().get_project, loads);
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let api = backend();
    let (board, mut rx) = open(&api);
    board.load().await.unwrap();

    let deleted = board
        .session()
        .delete_task(&TaskId::from("t1"), &Answer(false))
        .await
        .unwrap();
    assert!(!deleted);
    assert!(api.task(&TaskId::from("t1")).is_some());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn confirmed_board_delete_removes_its_tasks() {
    let api = backend();
    let (board, mut rx) = open(&api);
    board.load().await.unwrap();

    let asked = Mutex::new(String::new());
    let confirm = |prompt: &str| {
        *asked.lock() = prompt.to_string();
        true
    };
    let deleted = board
        .session()
        .delete_board(&BoardId::from("early"), &confirm)
        .await
        .unwrap();

    assert!(deleted);
    assert!(asked.lock().contains("All tasks in this board will be deleted"));
    assert_eq!(
        rx.try_recv().unwrap(),
        Notice::Success("Board deleted successfully".to_string())
    );
    assert!(api.task(&TaskId::from("t1")).is_none());
    assert_eq!(board_order(&board), ["undated", "middle", "late"]);
    assert!(
        api.list_tasks(&BoardId::from("early"))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn board_create_and_rename_round_trip() {
    let api = backend();
    let (board, mut rx) = open(&api);
    board.load().await.unwrap();

    let created = board.session().create_board("Review", "").await.unwrap();
    assert_eq!(
        rx.try_recv().unwrap(),
        Notice::Success("Board created successfully".to_string())
    );
    assert_eq!(board_order(&board).last(), Some(&created.id.to_string()));

    let renamed = board
        .session()
        .rename_board(&created.id, "QA", "Ready for testing")
        .await
        .unwrap();
    assert_eq!(renamed.title, "QA");
    assert_eq!(
        rx.try_recv().unwrap(),
        Notice::Success("Board updated successfully".to_string())
    );
}
