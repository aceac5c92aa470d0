//! Integration tests for the REST client against an in-process axum stub.
//!
//! The stub records what it receives so tests can check headers and
//! multipart fields, and answers with the backend's JSON shapes.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::json;

use taskboard::api::http::HttpApi;
use taskboard::api::{ApiError, BoardApi};
use taskboard::session::{StaticToken, TokenProvider};
use taskboard_proto::auth::Credentials;
use taskboard_proto::id::{BoardId, ProjectId, TaskId};
use taskboard_proto::task::{Priority, TaskForm};

// ---------------------------------------------------------------------------
// Stub backend
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct Seen {
    auth: Arc<Mutex<Vec<Option<String>>>>,
    fields: Arc<Mutex<Vec<(String, String)>>>,
}

impl Seen {
    fn record_auth(&self, headers: &HeaderMap) {
        let value = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        self.auth.lock().push(value);
    }
}

async fn get_project(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    seen.record_auth(&headers);
    Json(json!({
        "_id": id,
        "name": "Launch",
        "members": [{ "user": { "_id": "u1", "name": "Ada Lovelace" }, "role": "admin" }],
    }))
    .into_response()
}

async fn list_boards(State(seen): State<Seen>, headers: HeaderMap) -> Response {
    seen.record_auth(&headers);
    if headers.get("authorization").is_some_and(|v| v == "Bearer stale") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "msg": "Token is not valid" })))
            .into_response();
    }
    Json(json!([
        { "_id": "b2", "title": "Doing", "createdAt": "2024-01-02T00:00:00Z" },
        { "_id": "b1", "title": "Todo", "createdAt": "2024-01-01T00:00:00Z" },
    ]))
    .into_response()
}

async fn list_tasks(State(seen): State<Seen>, headers: HeaderMap, Path(board): Path<String>) -> Response {
    seen.record_auth(&headers);
    Json(json!({
        "tasks": [
            { "_id": 101, "title": "Numeric id", "board": board },
            { "_id": "t2", "title": "Embedded", "board": { "_id": board, "title": "Todo" } },
            { "_id": "t3", "title": null, "board": board, "priority": null, "assignedTo": null },
            { "_id": "t4", "title": "Blank priority", "board": board, "priority": "" },
        ]
    }))
    .into_response()
}

async fn update_task(
    State(seen): State<Seen>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let mut board = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap();
        if name == "board" {
            board = Some(value.clone());
        }
        seen.fields.lock().push((name, value));
    }
    Json(json!({ "_id": id, "title": "Moved", "board": board })).into_response()
}

async fn delete_board() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "msg": "Only project admins can delete boards" })),
    )
        .into_response()
}

async fn delete_task() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "not json").into_response()
}

async fn login() -> Response {
    Json(json!({
        "token": "fresh",
        "user": { "_id": "u1", "name": "Ada Lovelace", "email": "ada@example.com", "role": "owner" },
    }))
    .into_response()
}

async fn spawn_stub() -> (String, Seen) {
    let seen = Seen::default();
    let router = Router::new()
        .route("/api/projects/{id}", get(get_project))
        .route("/api/boards/project/{id}", get(list_boards))
        .route("/api/boards/{id}", delete(delete_board))
        .route("/api/tasks/board/{id}", get(list_tasks))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
        .route("/api/auth/login", post(login))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

fn client(base: &str, token: Option<&str>) -> (HttpApi, Arc<StaticToken>) {
    let tokens = Arc::new(StaticToken::new(token.map(ToString::to_string)));
    let api = HttpApi::new(base, Duration::from_secs(5), tokens.clone()).unwrap();
    (api, tokens)
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn sends_bearer_token_and_decodes_project() {
    let (base, seen) = spawn_stub().await;
    let (api, _tokens) = client(&base, Some("abc"));

    let project = api.get_project(&ProjectId::from("p1")).await.unwrap();
    assert_eq!(project.name, "Launch");
    assert_eq!(project.members.len(), 1);
    assert_eq!(seen.auth.lock().as_slice(), [Some("Bearer abc".to_string())]);
}

#[tokio::test]
async fn no_token_means_no_authorization_header() {
    let (base, seen) = spawn_stub().await;
    let (api, _tokens) = client(&base, None);

    api.get_project(&ProjectId::from("p1")).await.unwrap();
    assert_eq!(seen.auth.lock().as_slice(), [None::<String>]);
}

#[tokio::test]
async fn base_url_with_api_suffix_is_accepted() {
    let (base, _seen) = spawn_stub().await;
    let (api, _tokens) = client(&format!("{base}/api/"), Some("abc"));

    let boards = api.list_boards(&ProjectId::from("p1")).await.unwrap();
    assert_eq!(boards.len(), 2);
}

#[tokio::test]
async fn unauthorized_clears_token() {
    let (base, _seen) = spawn_stub().await;
    let (api, tokens) = client(&base, Some("stale"));

    let err = api.list_boards(&ProjectId::from("p1")).await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert!(tokens.token().is_none());
}

#[tokio::test]
async fn wrapped_task_list_normalizes_ids_and_odd_records() {
    let (base, _seen) = spawn_stub().await;
    let (api, _tokens) = client(&base, Some("abc"));

    let tasks = api.list_tasks(&BoardId::from("b1")).await.unwrap();
    assert_eq!(tasks.len(), 4);
    assert_eq!(tasks[0].id.as_str(), "101");
    assert!(tasks.iter().all(|t| t.board_id().as_str() == "b1"));
    assert!(tasks.iter().all(|t| t.priority == Priority::Medium));
    assert!(tasks[2].assigned_to.is_empty());
}

#[tokio::test]
async fn move_sends_only_the_board_field() {
    let (base, seen) = spawn_stub().await;
    let (api, _tokens) = client(&base, Some("abc"));

    let task = api
        .update_task(&TaskId::from("t1"), TaskForm::move_to(BoardId::from("b2")))
        .await
        .unwrap();
    assert_eq!(task.board_id().as_str(), "b2");
    assert_eq!(
        seen.fields.lock().as_slice(),
        [("board".to_string(), "b2".to_string())]
    );
}

#[tokio::test]
async fn error_body_message_is_surfaced() {
    let (base, _seen) = spawn_stub().await;
    let (api, _tokens) = client(&base, Some("abc"));

    let err = api.delete_board(&BoardId::from("b1")).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::status(403, "Only project admins can delete boards")
    );
    assert_eq!(
        err.user_message("Failed to delete board"),
        "Only project admins can delete boards"
    );
}

#[tokio::test]
async fn non_json_error_body_falls_back() {
    let (base, _seen) = spawn_stub().await;
    let (api, _tokens) = client(&base, Some("abc"));

    let err = api.delete_task(&TaskId::from("t1")).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 500,
            message: None,
        }
    );
    assert_eq!(err.user_message("Failed to delete task"), "Failed to delete task");
}

#[tokio::test]
async fn login_stores_token() {
    let (base, _seen) = spawn_stub().await;
    let (api, tokens) = client(&base, None);

    let user = api
        .login(&Credentials {
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(user.name, "Ada Lovelace");
    assert!(user.role.is_privileged());
    assert_eq!(tokens.token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let (api, _tokens) = client("http://127.0.0.1:9", None);
    let err = api.get_project(&ProjectId::from("p1")).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}
