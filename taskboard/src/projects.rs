//! Project overview with per-project counts.

use std::sync::Arc;

use futures_util::future::join_all;

use taskboard_proto::project::{Project, ProjectStats};
use taskboard_proto::task::TaskStatus;

use crate::api::{ApiError, BoardApi};

/// A project together with its board and task counts.
#[derive(Debug, Clone)]
pub struct ProjectOverview {
    /// The project.
    pub project: Project,
    /// Its counts.
    pub stats: ProjectStats,
}

async fn stats_for<A: BoardApi>(api: &A, project: &Project) -> ProjectStats {
    let boards = match api.list_boards(&project.id).await {
        Ok(boards) => boards,
        Err(error) => {
            tracing::warn!(project = %project.id, error = %error, "board count unavailable");
            return ProjectStats::default();
        }
    };
    let mut stats = ProjectStats {
        boards: boards.len(),
        ..ProjectStats::default()
    };
    for board in &boards {
        match api.list_tasks(&board.id).await {
            Ok(tasks) => {
                stats.tasks += tasks.len();
                stats.completed += tasks
                    .iter()
                    .filter(|t| t.status == TaskStatus::Completed)
                    .count();
            }
            Err(error) => {
                tracing::warn!(board = %board.id, error = %error, "task count unavailable");
            }
        }
    }
    stats
}

/// Lists every project with its counts.
///
/// Counting failures count as zero for the affected part.
///
/// # Errors
///
/// Returns the [`ApiError`] if the project list itself cannot be fetched.
pub async fn load_with_stats<A: BoardApi + 'static>(
    api: Arc<A>,
) -> Result<Vec<ProjectOverview>, ApiError> {
    let projects = api.list_projects().await?;
    let overviews = join_all(projects.into_iter().map(|project| {
        let api = Arc::clone(&api);
        async move {
            let stats = stats_for(api.as_ref(), &project).await;
            ProjectOverview { project, stats }
        }
    }))
    .await;
    tracing::info!(projects = overviews.len(), "project overview loaded");
    Ok(overviews)
}
