//! Board and task CRUD for the open project.
//!
//! Each call follows the same shape: send the request, report the outcome
//! as a notice, and reload the board when it succeeded.

use std::sync::Arc;

use taskboard_proto::board::{Board, BoardForm};
use taskboard_proto::id::{BoardId, ProjectId, TaskId};
use taskboard_proto::task::{Task, TaskForm};

use super::batcher::RefetchBatcher;
use super::loader::ProjectLoader;
use crate::api::{ApiError, BoardApi};
use crate::notice::{NoticeSender, with_notice};
use crate::session::Confirm;

/// Prompt shown before deleting a board.
pub const DELETE_BOARD_PROMPT: &str =
    "Are you sure you want to delete this board? All tasks in this board will be deleted.";

/// Prompt shown before deleting a task.
pub const DELETE_TASK_PROMPT: &str = "Are you sure you want to delete this task?";

const OPERATION_FAILED: &str = "Operation failed";

/// Mutations of the open project's boards and tasks.
pub struct BoardSession<A> {
    api: Arc<A>,
    project: ProjectId,
    batcher: Arc<RefetchBatcher<ProjectLoader<A>>>,
    notices: NoticeSender,
}

impl<A: BoardApi + 'static> BoardSession<A> {
    /// Creates a session for `project`.
    #[must_use]
    pub const fn new(
        api: Arc<A>,
        project: ProjectId,
        batcher: Arc<RefetchBatcher<ProjectLoader<A>>>,
        notices: NoticeSender,
    ) -> Self {
        Self {
            api,
            project,
            batcher,
            notices,
        }
    }

    async fn refetch_on_success<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if result.is_ok() {
            self.batcher.refetch_now().await;
        }
        result
    }

    /// Adds a column to the project.
    ///
    /// # Errors
    ///
    /// Returns the backend's [`ApiError`].
    pub async fn create_board(&self, title: &str, description: &str) -> Result<Board, ApiError> {
        let form = BoardForm {
            title: title.to_string(),
            description: description.to_string(),
            project_id: Some(self.project.clone()),
        };
        let result = with_notice(
            &self.notices,
            self.api.create_board(&form),
            "Board created successfully",
            OPERATION_FAILED,
        )
        .await;
        self.refetch_on_success(result).await
    }

    /// Renames a column and replaces its description.
    ///
    /// # Errors
    ///
    /// Returns the backend's [`ApiError`].
    pub async fn rename_board(
        &self,
        board: &BoardId,
        title: &str,
        description: &str,
    ) -> Result<Board, ApiError> {
        let form = BoardForm {
            title: title.to_string(),
            description: description.to_string(),
            project_id: None,
        };
        let result = with_notice(
            &self.notices,
            self.api.update_board(board, &form),
            "Board updated successfully",
            OPERATION_FAILED,
        )
        .await;
        self.refetch_on_success(result).await
    }

    /// Deletes a column and its tasks once `confirm` agrees.
    ///
    /// Returns `Ok(false)` without a request if the user declined.
    ///
    /// # Errors
    ///
    /// Returns the backend's [`ApiError`].
    pub async fn delete_board(
        &self,
        board: &BoardId,
        confirm: &impl Confirm,
    ) -> Result<bool, ApiError> {
        if !confirm.confirm(DELETE_BOARD_PROMPT) {
            tracing::debug!(board = %board, "board deletion declined");
            return Ok(false);
        }
        let result = with_notice(
            &self.notices,
            self.api.delete_board(board),
            "Board deleted successfully",
            "Failed to delete board",
        )
        .await;
        self.refetch_on_success(result).await.map(|()| true)
    }

    /// Creates a task.
    ///
    /// # Errors
    ///
    /// Returns the backend's [`ApiError`].
    pub async fn create_task(&self, form: TaskForm) -> Result<Task, ApiError> {
        let result = with_notice(
            &self.notices,
            self.api.create_task(form),
            "Task created successfully",
            OPERATION_FAILED,
        )
        .await;
        self.refetch_on_success(result).await
    }

    /// Updates the fields set in `form`.
    ///
    /// # Errors
    ///
    /// Returns the backend's [`ApiError`].
    pub async fn update_task(&self, task: &TaskId, form: TaskForm) -> Result<Task, ApiError> {
        let result = with_notice(
            &self.notices,
            self.api.update_task(task, form),
            "Task updated successfully",
            OPERATION_FAILED,
        )
        .await;
        self.refetch_on_success(result).await
    }

    /// Deletes a task once `confirm` agrees.
    ///
    /// Returns `Ok(false)` without a request if the user declined.
    ///
    /// # Errors
    ///
    /// Returns the backend's [`ApiError`].
    pub async fn delete_task(&self, task: &TaskId, confirm: &impl Confirm) -> Result<bool, ApiError> {
        if !confirm.confirm(DELETE_TASK_PROMPT) {
            tracing::debug!(task = %task, "task deletion declined");
            return Ok(false);
        }
        let result = with_notice(
            &self.notices,
            self.api.delete_task(task),
            "Task deleted successfully",
            "Failed to delete task",
        )
        .await;
        self.refetch_on_success(result).await.map(|()| true)
    }
}
