//! Backend API abstraction for `Taskboard`.
//!
//! Defines the [`BoardApi`] trait the board core talks to. Concrete
//! implementations:
//! - [`http::HttpApi`]: the REST backend over HTTP
//! - [`memory::MemoryApi`]: in-process backend for tests and offline mode

pub mod http;
pub mod memory;

use std::future::Future;

use taskboard_proto::board::{Board, BoardForm};
use taskboard_proto::id::{BoardId, ProjectId, TaskId};
use taskboard_proto::project::Project;
use taskboard_proto::task::{Task, TaskForm};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The session token is missing, expired, or was rejected.
    #[error("not authenticated")]
    Unauthorized,

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The `msg` field of the error body, if the backend sent one.
        message: Option<String>,
    },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The configured base URL is not a valid URL.
    #[error("invalid API base URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Message to show the user: the backend's own message, else `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Convenience constructor for a status error carrying a message.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: Some(message.into()),
        }
    }
}

/// Async interface to the project/board/task endpoints.
///
/// Everything the board view needs goes through this trait so the
/// reconciliation logic can be exercised against [`memory::MemoryApi`]
/// without a network.
pub trait BoardApi: Send + Sync {
    /// `GET /projects`
    fn list_projects(&self) -> impl Future<Output = Result<Vec<Project>, ApiError>> + Send;

    /// `GET /projects/{id}`
    fn get_project(
        &self,
        project: &ProjectId,
    ) -> impl Future<Output = Result<Project, ApiError>> + Send;

    /// `GET /boards/project/{id}`, in server order.
    fn list_boards(
        &self,
        project: &ProjectId,
    ) -> impl Future<Output = Result<Vec<Board>, ApiError>> + Send;

    /// `GET /tasks/board/{id}`
    fn list_tasks(&self, board: &BoardId)
    -> impl Future<Output = Result<Vec<Task>, ApiError>> + Send;

    /// `POST /boards`
    fn create_board(&self, form: &BoardForm)
    -> impl Future<Output = Result<Board, ApiError>> + Send;

    /// `PUT /boards/{id}`
    fn update_board(
        &self,
        board: &BoardId,
        form: &BoardForm,
    ) -> impl Future<Output = Result<Board, ApiError>> + Send;

    /// `DELETE /boards/{id}`. The backend deletes the board's tasks too.
    fn delete_board(&self, board: &BoardId) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /tasks`
    fn create_task(&self, form: TaskForm) -> impl Future<Output = Result<Task, ApiError>> + Send;

    /// `PUT /tasks/{id}`. Also the column move, with only `board` set.
    fn update_task(
        &self,
        task: &TaskId,
        form: TaskForm,
    ) -> impl Future<Output = Result<Task, ApiError>> + Send;

    /// `DELETE /tasks/{id}`
    fn delete_task(&self, task: &TaskId) -> impl Future<Output = Result<(), ApiError>> + Send;
}
