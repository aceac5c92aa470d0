//! Full project load: project, boards, then every board's tasks.

use std::sync::Arc;

use futures_util::future::join_all;

use taskboard_proto::board::sort_boards;
use taskboard_proto::id::ProjectId;
use taskboard_proto::task::Task;

use super::SharedState;
use super::batcher::Refetch;
use crate::api::{ApiError, BoardApi};
use crate::notice::NoticeSender;

/// Shown when the project or its boards cannot be fetched.
pub const LOAD_FAILED: &str = "Failed to load project";

/// Loads one project into the shared board state.
///
/// Every load replaces the task list wholesale; there is no incremental
/// merge.
pub struct ProjectLoader<A> {
    api: Arc<A>,
    project: ProjectId,
    state: SharedState,
    notices: NoticeSender,
}

impl<A: BoardApi + 'static> ProjectLoader<A> {
    /// Creates a loader for `project`.
    #[must_use]
    pub const fn new(
        api: Arc<A>,
        project: ProjectId,
        state: SharedState,
        notices: NoticeSender,
    ) -> Self {
        Self {
            api,
            project,
            state,
            notices,
        }
    }

    /// The project this loader fetches.
    #[must_use]
    pub const fn project(&self) -> &ProjectId {
        &self.project
    }

    /// Fetches the project and replaces the shared state.
    ///
    /// A board whose tasks cannot be fetched contributes no tasks. If the
    /// project or its board list cannot be fetched, an error notice is
    /// sent and the previous state is kept.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] from the project or board listing.
    pub async fn load(&self) -> Result<(), ApiError> {
        let fetched = tokio::try_join!(
            self.api.get_project(&self.project),
            self.api.list_boards(&self.project),
        );
        let (project, mut boards) = match fetched {
            Ok(fetched) => fetched,
            Err(error) => {
                tracing::warn!(project = %self.project, error = %error, "project load failed");
                self.notices.error(LOAD_FAILED);
                return Err(error);
            }
        };
        sort_boards(&mut boards);

        let lists = join_all(boards.iter().map(|board| {
            let api = Arc::clone(&self.api);
            let board = board.id.clone();
            async move {
                match api.list_tasks(&board).await {
                    Ok(tasks) => tasks,
                    Err(error) => {
                        tracing::warn!(board = %board, error = %error, "task fetch failed, showing board empty");
                        Vec::new()
                    }
                }
            }
        }))
        .await;
        let tasks: Vec<Task> = lists.into_iter().flatten().collect();

        tracing::info!(
            project = %self.project,
            boards = boards.len(),
            tasks = tasks.len(),
            "project loaded"
        );
        self.state.lock().replace(project, boards, tasks);
        Ok(())
    }
}

impl<A: BoardApi + 'static> Refetch for ProjectLoader<A> {
    async fn refetch(&self) {
        // Failures were already reported to the user by `load`.
        let _ = self.load().await;
    }
}
