//! In-process backend for tests and offline mode.
//!
//! Keeps projects, boards and tasks in memory and answers [`BoardApi`]
//! calls the way the REST backend would. Optional latency and one-shot
//! fault injection let tests observe requests while they are in flight.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

use taskboard_proto::board::{Board, BoardForm, BoardSummary};
use taskboard_proto::id::{BoardId, EntityRef, ProjectId, TaskId};
use taskboard_proto::project::{Project, ProjectSummary};
use taskboard_proto::task::{Priority, Task, TaskForm, TaskStatus};

use super::{ApiError, BoardApi};

/// Snapshot of how many times each endpoint was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `get_project` calls.
    pub get_project: usize,
    /// `list_boards` calls.
    pub list_boards: usize,
    /// `list_tasks` calls.
    pub list_tasks: usize,
    /// `update_task` calls, counted when the request starts.
    pub update_task: usize,
}

#[derive(Debug, Default)]
struct Counters {
    get_project: AtomicUsize,
    list_boards: AtomicUsize,
    list_tasks: AtomicUsize,
    update_task: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

#[derive(Debug, Default)]
struct Store {
    projects: Vec<Project>,
    boards: Vec<Board>,
    tasks: Vec<Task>,
    task_update_faults: VecDeque<ApiError>,
    board_list_fault: Option<ApiError>,
    task_list_faults: HashMap<BoardId, ApiError>,
}

impl Store {
    fn board_exists(&self, board: &BoardId) -> bool {
        self.boards.iter().any(|b| b.id == *board)
    }
}

fn not_found(entity: &str) -> ApiError {
    ApiError::status(404, format!("{entity} not found"))
}

fn new_id() -> String {
    uuid::Uuid::now_v7().simple().to_string()
}

/// In-memory [`BoardApi`] implementation.
#[derive(Debug, Default)]
pub struct MemoryApi {
    store: Mutex<Store>,
    latency: Duration,
    counters: Counters,
}

impl MemoryApi {
    /// Creates an empty backend that answers immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency` before it touches the store.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// A backend seeded with one demo project, three columns and a few cards.
    #[must_use]
    pub fn demo() -> Self {
        let api = Self::new();
        let project = ProjectId::from("demo");
        api.insert_project(Project {
            id: project.clone(),
            name: "Demo project".to_string(),
            description: Some("Offline sample data".to_string()),
            owner: None,
            members: Vec::new(),
            created_at: Some(Utc::now()),
        });

        let start = Utc::now();
        let columns = [("todo", "Todo"), ("doing", "In Progress"), ("done", "Done")];
        for (offset, (id, title)) in (0_i64..).zip(columns) {
            api.insert_board(Board {
                id: BoardId::from(id),
                title: title.to_string(),
                description: None,
                project: Some(EntityRef::from(project.clone())),
                owner: None,
                created_at: Some(start + TimeDelta::seconds(offset)),
            });
        }

        let cards = [
            ("todo", "Sketch the landing page", TaskStatus::Todo, Priority::High),
            ("todo", "Write onboarding email", TaskStatus::Todo, Priority::Low),
            ("doing", "Wire up login", TaskStatus::InProgress, Priority::Medium),
            ("done", "Set up repository", TaskStatus::Completed, Priority::Medium),
        ];
        for (board, title, status, priority) in cards {
            api.insert_task(Task {
                id: TaskId::new(new_id()),
                title: title.to_string(),
                description: None,
                board: EntityRef::Embedded(BoardSummary {
                    id: BoardId::from(board),
                    title: None,
                }),
                status,
                priority,
                assigned_to: Vec::new(),
                attachment: None,
                due_date: None,
                created_at: Some(start),
            });
        }
        api
    }

    /// Adds or replaces a project.
    pub fn insert_project(&self, project: Project) {
        let mut store = self.store.lock();
        store.projects.retain(|p| p.id != project.id);
        store.projects.push(project);
    }

    /// Adds or replaces a board.
    pub fn insert_board(&self, board: Board) {
        let mut store = self.store.lock();
        store.boards.retain(|b| b.id != board.id);
        store.boards.push(board);
    }

    /// Adds or replaces a task.
    pub fn insert_task(&self, task: Task) {
        let mut store = self.store.lock();
        store.tasks.retain(|t| t.id != task.id);
        store.tasks.push(task);
    }

    /// The backend's current copy of a task.
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<Task> {
        self.store.lock().tasks.iter().find(|t| t.id == *id).cloned()
    }

    /// Makes the next `update_task` call fail with `error`.
    ///
    /// Faults queue up; each call consumes one.
    pub fn fail_next_task_update(&self, error: ApiError) {
        self.store.lock().task_update_faults.push_back(error);
    }

    /// Makes `list_boards` fail with `error` until cleared with `None`.
    pub fn fail_board_listing(&self, error: Option<ApiError>) {
        self.store.lock().board_list_fault = error;
    }

    /// Makes `list_tasks` for `board` fail with `error`.
    pub fn fail_task_listing(&self, board: BoardId, error: ApiError) {
        self.store.lock().task_list_faults.insert(board, error);
    }

    /// Call counts so far.
    #[must_use]
    pub fn calls(&self) -> CallCounts {
        CallCounts {
            get_project: self.counters.get_project.load(Ordering::SeqCst),
            list_boards: self.counters.list_boards.load(Ordering::SeqCst),
            list_tasks: self.counters.list_tasks.load(Ordering::SeqCst),
            update_task: self.counters.update_task.load(Ordering::SeqCst),
        }
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn created_now() -> Option<DateTime<Utc>> {
    Some(Utc::now())
}

impl BoardApi for MemoryApi {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.delay().await;
        Ok(self.store.lock().projects.clone())
    }

    async fn get_project(&self, project: &ProjectId) -> Result<Project, ApiError> {
        bump(&self.counters.get_project);
        self.delay().await;
        self.store
            .lock()
            .projects
            .iter()
            .find(|p| p.id == *project)
            .cloned()
            .ok_or_else(|| not_found("Project"))
    }

    async fn list_boards(&self, project: &ProjectId) -> Result<Vec<Board>, ApiError> {
        bump(&self.counters.list_boards);
        self.delay().await;
        let store = self.store.lock();
        if let Some(error) = &store.board_list_fault {
            return Err(error.clone());
        }
        Ok(store
            .boards
            .iter()
            .filter(|b| b.project.as_ref().is_some_and(|p| p.id() == project))
            .cloned()
            .collect())
    }

    async fn list_tasks(&self, board: &BoardId) -> Result<Vec<Task>, ApiError> {
        bump(&self.counters.list_tasks);
        self.delay().await;
        let store = self.store.lock();
        if let Some(error) = store.task_list_faults.get(board) {
            return Err(error.clone());
        }
        Ok(store
            .tasks
            .iter()
            .filter(|t| t.board_id() == board)
            .cloned()
            .collect())
    }

    async fn create_board(&self, form: &BoardForm) -> Result<Board, ApiError> {
        self.delay().await;
        let Some(project) = form.project_id.clone() else {
            return Err(ApiError::status(400, "Project is required"));
        };
        let mut store = self.store.lock();
        if !store.projects.iter().any(|p| p.id == project) {
            return Err(not_found("Project"));
        }
        let board = Board {
            id: BoardId::new(new_id()),
            title: form.title.clone(),
            description: (!form.description.is_empty()).then(|| form.description.clone()),
            project: Some(EntityRef::Embedded(ProjectSummary {
                id: project,
                name: None,
            })),
            owner: None,
            created_at: created_now(),
        };
        store.boards.push(board.clone());
        Ok(board)
    }

    async fn update_board(&self, board: &BoardId, form: &BoardForm) -> Result<Board, ApiError> {
        self.delay().await;
        let mut store = self.store.lock();
        let existing = store
            .boards
            .iter_mut()
            .find(|b| b.id == *board)
            .ok_or_else(|| not_found("Board"))?;
        existing.title.clone_from(&form.title);
        existing.description = (!form.description.is_empty()).then(|| form.description.clone());
        Ok(existing.clone())
    }

    async fn delete_board(&self, board: &BoardId) -> Result<(), ApiError> {
        self.delay().await;
        let mut store = self.store.lock();
        if !store.board_exists(board) {
            return Err(not_found("Board"));
        }
        store.boards.retain(|b| b.id != *board);
        store.tasks.retain(|t| t.board_id() != board);
        Ok(())
    }

    async fn create_task(&self, form: TaskForm) -> Result<Task, ApiError> {
        self.delay().await;
        let Some(board) = form.board.clone() else {
            return Err(ApiError::status(400, "Board is required"));
        };
        let mut store = self.store.lock();
        if !store.board_exists(&board) {
            return Err(not_found("Board"));
        }
        let mut task = Task {
            id: TaskId::new(new_id()),
            title: String::new(),
            description: None,
            board: EntityRef::from(board),
            status: TaskStatus::default(),
            priority: Priority::default(),
            assigned_to: Vec::new(),
            attachment: None,
            due_date: None,
            created_at: created_now(),
        };
        form.apply_to(&mut task);
        store.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, task: &TaskId, form: TaskForm) -> Result<Task, ApiError> {
        bump(&self.counters.update_task);
        self.delay().await;
        let mut store = self.store.lock();
        if let Some(error) = store.task_update_faults.pop_front() {
            return Err(error);
        }
        if let Some(board) = &form.board
            && !store.board_exists(board)
        {
            return Err(not_found("Board"));
        }
        let existing = store
            .tasks
            .iter_mut()
            .find(|t| t.id == *task)
            .ok_or_else(|| not_found("Task"))?;
        form.apply_to(existing);
        Ok(existing.clone())
    }

    async fn delete_task(&self, task: &TaskId) -> Result<(), ApiError> {
        self.delay().await;
        let mut store = self.store.lock();
        let before = store.tasks.len();
        store.tasks.retain(|t| t.id != *task);
        if store.tasks.len() == before {
            return Err(not_found("Task"));
        }
        Ok(())
    }
}
