//! Drag-and-drop reconciliation.
//!
//! A drop is applied to the local [`TaskStore`](super::store::TaskStore)
//! at once and persisted in the background. Each task moves through
//! `Idle -> Pending -> {Confirmed | RolledBack}`:
//!
//! - **Confirmed**: the pending entry is cleared, a success notice is sent,
//!   and once no other move is in flight a debounced refetch is scheduled.
//! - **RolledBack**: the pending entry is cleared, an error notice is sent,
//!   the previous board is restored locally and a refetch runs at once.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use taskboard_proto::id::{BoardId, EntityRef, TaskId};
use taskboard_proto::task::TaskForm;

use super::SharedState;
use super::batcher::RefetchBatcher;
use super::loader::ProjectLoader;
use super::pending::{PendingMove, PendingMoves};
use crate::api::{ApiError, BoardApi};
use crate::notice::NoticeSender;

/// Shown when a move fails and the backend sent no message.
pub const MOVE_FAILED: &str = "Failed to move task";

/// Why a drop did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The task already has a move in flight.
    AlreadyPending,
    /// The dragged id is not a known task.
    UnknownTask,
    /// The drop target is neither a board nor a task on a known board.
    UnknownDestination,
    /// The task already sits on the destination board.
    SameBoard,
}

/// How a move ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The backend accepted the move.
    Confirmed {
        /// Moved task.
        task: TaskId,
        /// Its new board.
        board: BoardId,
    },
    /// The backend rejected the move and the board was reloaded.
    RolledBack {
        /// Task whose move failed.
        task: TaskId,
        /// The failure.
        error: ApiError,
    },
}

/// A move that is being persisted.
#[derive(Debug)]
pub struct MoveHandle {
    /// Moved task.
    pub task: TaskId,
    /// Destination board.
    pub to: BoardId,
    handle: JoinHandle<MoveOutcome>,
}

impl MoveHandle {
    /// Waits for the move to resolve.
    ///
    /// Returns `None` if the background task was aborted by runtime
    /// shutdown.
    pub async fn outcome(self) -> Option<MoveOutcome> {
        self.handle.await.ok()
    }
}

/// Result of a drop.
#[derive(Debug)]
pub enum DragOutcome {
    /// Nothing changed and no request was sent.
    Ignored(IgnoreReason),
    /// The move was applied locally and is being persisted.
    Started(MoveHandle),
}

impl DragOutcome {
    /// The ignore reason, if the drop was ignored.
    #[must_use]
    pub const fn ignored(&self) -> Option<IgnoreReason> {
        match self {
            Self::Ignored(reason) => Some(*reason),
            Self::Started(_) => None,
        }
    }
}

/// Turns drops into optimistic board reassignments.
///
/// Lock order is pending moves, then board state.
pub struct DragReconciler<A> {
    api: Arc<A>,
    state: SharedState,
    pending: Arc<Mutex<PendingMoves>>,
    batcher: Arc<RefetchBatcher<ProjectLoader<A>>>,
    notices: NoticeSender,
}

impl<A> Clone for DragReconciler<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
            pending: Arc::clone(&self.pending),
            batcher: Arc::clone(&self.batcher),
            notices: self.notices.clone(),
        }
    }
}

impl<A: BoardApi + 'static> DragReconciler<A> {
    /// Creates a reconciler over `state`.
    #[must_use]
    pub fn new(
        api: Arc<A>,
        state: SharedState,
        batcher: Arc<RefetchBatcher<ProjectLoader<A>>>,
        notices: NoticeSender,
    ) -> Self {
        Self {
            api,
            state,
            pending: Arc::new(Mutex::new(PendingMoves::new())),
            batcher,
            notices,
        }
    }

    /// Shared pending-move tracker.
    #[must_use]
    pub const fn pending(&self) -> &Arc<Mutex<PendingMoves>> {
        &self.pending
    }

    /// Handles a drop of task `active` onto `over`.
    ///
    /// `over` is a board id, or the id of a task whose board becomes the
    /// destination. On acceptance the task is marked pending and moved
    /// locally before this returns; persistence runs on a spawned task.
    /// Must be called from within a tokio runtime.
    pub fn on_drag_end(&self, active: &str, over: &str) -> DragOutcome {
        let task_id = TaskId::from(active);
        let mut pending = self.pending.lock();
        if pending.contains(&task_id) {
            tracing::debug!(task = %task_id, "move already pending, ignoring drop");
            return DragOutcome::Ignored(IgnoreReason::AlreadyPending);
        }

        let mut state = self.state.lock();
        let Some(task) = state.tasks.get(&task_id) else {
            tracing::debug!(task = %task_id, "dropped unknown task");
            return DragOutcome::Ignored(IgnoreReason::UnknownTask);
        };
        let task_title = task.title.clone();
        let current = task.board_id().clone();

        let Some(destination) = state.resolve_destination(over) else {
            tracing::debug!(task = %task_id, over, "drop target did not resolve to a board");
            return DragOutcome::Ignored(IgnoreReason::UnknownDestination);
        };
        let to = destination.id.clone();
        let to_title = destination.title.clone();

        if current == to {
            tracing::debug!(task = %task_id, board = %to, "dropped on its own board");
            return DragOutcome::Ignored(IgnoreReason::SameBoard);
        }

        let Some(from) = state.tasks.set_board(&task_id, EntityRef::from(to.clone())) else {
            return DragOutcome::Ignored(IgnoreReason::UnknownTask);
        };
        pending.insert(
            task_id.clone(),
            PendingMove {
                from,
                to: to.clone(),
                to_title,
                task_title,
            },
        );
        drop(state);
        drop(pending);

        tracing::debug!(task = %task_id, from = %current, to = %to, "move applied locally");
        let this = self.clone();
        let handle = {
            let task = task_id.clone();
            let to = to.clone();
            tokio::spawn(async move { this.persist(task, to).await })
        };
        DragOutcome::Started(MoveHandle {
            task: task_id,
            to,
            handle,
        })
    }

    async fn persist(&self, task: TaskId, to: BoardId) -> MoveOutcome {
        match self
            .api
            .update_task(&task, TaskForm::move_to(to.clone()))
            .await
        {
            Ok(_) => {
                let (entry, idle) = {
                    let mut pending = self.pending.lock();
                    let entry = pending.remove(&task);
                    (entry, pending.is_empty())
                };
                if let Some(entry) = entry {
                    self.notices.success(format!(
                        "Task \"{}\" moved to {}",
                        entry.task_title, entry.to_title
                    ));
                }
                tracing::debug!(task = %task, board = %to, idle, "move confirmed");
                if idle {
                    self.batcher.schedule();
                }
                MoveOutcome::Confirmed { task, board: to }
            }
            Err(error) => {
                let entry = self.pending.lock().remove(&task);
                tracing::warn!(task = %task, board = %to, error = %error, "move failed, rolling back");
                self.notices.error(error.user_message(MOVE_FAILED));
                if let Some(entry) = entry {
                    self.state
                        .lock()
                        .tasks
                        .revert_board(&task, &to, entry.from);
                }
                self.batcher.refetch_now().await;
                MoveOutcome::RolledBack { task, error }
            }
        }
    }
}
