//! Board view core: local state and its reconciliation with the backend.
//!
//! [`ProjectBoard`] wires the pieces together for one open project:
//!
//! ```text
//!  drop ──► DragReconciler ──► TaskStore (optimistic)
//!                │
//!                └─► BoardApi::update_task ──► PendingMoves cleared
//!                                               │
//!                       RefetchBatcher ◄────────┘
//!                             │
//!                       ProjectLoader ──► TaskStore (server truth)
//! ```

pub mod batcher;
pub mod loader;
pub mod pending;
pub mod reconciler;
pub mod session;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use taskboard_proto::board::Board;
use taskboard_proto::id::{BoardId, ProjectId, TaskId};
use taskboard_proto::project::Project;
use taskboard_proto::task::Task;

use crate::api::{ApiError, BoardApi};
use crate::notice::NoticeSender;
use batcher::RefetchBatcher;
use loader::ProjectLoader;
use reconciler::DragReconciler;
use session::BoardSession;
use store::TaskStore;

/// Everything the board view shows for the open project.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    /// The project, once loaded.
    pub project: Option<Project>,
    /// Columns, oldest first.
    pub boards: Vec<Board>,
    /// All tasks across the columns.
    pub tasks: TaskStore,
}

impl BoardState {
    /// Looks up a board by id.
    #[must_use]
    pub fn board(&self, id: &BoardId) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == *id)
    }

    /// Resolves a drop target to a board.
    ///
    /// `over` is tried as a board id first, then as a task id whose board
    /// is used. Returns `None` when neither names a known board.
    #[must_use]
    pub fn resolve_destination(&self, over: &str) -> Option<&Board> {
        let board_id = BoardId::from(over);
        if let Some(board) = self.board(&board_id) {
            return Some(board);
        }
        let task_board = self.tasks.board_of(&TaskId::from(over))?;
        self.board(task_board)
    }

    /// Replaces everything with freshly fetched data.
    pub fn replace(&mut self, project: Project, boards: Vec<Board>, tasks: Vec<Task>) {
        self.project = Some(project);
        self.boards = boards;
        self.tasks.replace(tasks);
    }
}

/// Board state shared between the event loop and background tasks.
pub type SharedState = Arc<Mutex<BoardState>>;

/// A point-in-time copy of the board for rendering.
#[derive(Debug, Clone, Default)]
pub struct BoardSnapshot {
    /// Project name, empty until loaded.
    pub project_name: String,
    /// Columns, oldest first.
    pub boards: Vec<Board>,
    /// All tasks.
    pub tasks: Vec<Task>,
    /// Tasks with a move in flight.
    pub pending: Vec<TaskId>,
}

/// One open project: state, loader, debounce, reconciler and CRUD session.
pub struct ProjectBoard<A> {
    state: SharedState,
    loader: Arc<ProjectLoader<A>>,
    batcher: Arc<RefetchBatcher<ProjectLoader<A>>>,
    reconciler: DragReconciler<A>,
    session: BoardSession<A>,
}

impl<A: BoardApi + 'static> ProjectBoard<A> {
    /// Wires up a board for `project`. Nothing is fetched until
    /// [`load`](Self::load).
    #[must_use]
    pub fn new(api: Arc<A>, project: ProjectId, quiet: Duration, notices: NoticeSender) -> Self {
        let state = SharedState::default();
        let loader = Arc::new(ProjectLoader::new(
            Arc::clone(&api),
            project.clone(),
            Arc::clone(&state),
            notices.clone(),
        ));
        let batcher = Arc::new(RefetchBatcher::new(Arc::clone(&loader), quiet));
        let reconciler = DragReconciler::new(
            Arc::clone(&api),
            Arc::clone(&state),
            Arc::clone(&batcher),
            notices.clone(),
        );
        let session = BoardSession::new(api, project, Arc::clone(&batcher), notices);
        Self {
            state,
            loader,
            batcher,
            reconciler,
            session,
        }
    }

    /// Initial load.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] if the project or its boards cannot be fetched.
    pub async fn load(&self) -> Result<(), ApiError> {
        self.loader.load().await
    }

    /// Reloads immediately, superseding a scheduled refetch.
    pub async fn refresh(&self) {
        self.batcher.refetch_now().await;
    }

    /// Copies the current state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        let pending = self.reconciler.pending().lock().ids();
        let state = self.state.lock();
        BoardSnapshot {
            project_name: state
                .project
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            boards: state.boards.clone(),
            tasks: state.tasks.as_slice().to_vec(),
            pending,
        }
    }

    /// Shared state handle.
    #[must_use]
    pub const fn state(&self) -> &SharedState {
        &self.state
    }

    /// The drag reconciler.
    #[must_use]
    pub const fn reconciler(&self) -> &DragReconciler<A> {
        &self.reconciler
    }

    /// Board and task CRUD.
    #[must_use]
    pub const fn session(&self) -> &BoardSession<A> {
        &self.session
    }

    /// The debounced refetch.
    #[must_use]
    pub fn batcher(&self) -> &RefetchBatcher<ProjectLoader<A>> {
        &self.batcher
    }
}
