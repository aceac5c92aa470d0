//! The authoritative local list of tasks for the open project.

use taskboard_proto::board::BoardRef;
use taskboard_proto::id::{BoardId, TaskId};
use taskboard_proto::task::Task;

/// Every task of the open project, flattened across boards.
///
/// Column membership is derived, never stored: a task is on whichever
/// board its `board` reference names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Creates a store holding `tasks`.
    #[must_use]
    pub const fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Replaces the whole list, as a refetch does.
    pub fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    /// Normalized board id of a task.
    #[must_use]
    pub fn board_of(&self, id: &TaskId) -> Option<&BoardId> {
        self.get(id).map(Task::board_id)
    }

    /// Rewrites a task's board reference, returning the previous one.
    ///
    /// Returns `None` and changes nothing if the task is unknown.
    pub fn set_board(&mut self, id: &TaskId, board: BoardRef) -> Option<BoardRef> {
        let task = self.tasks.iter_mut().find(|t| t.id == *id)?;
        Some(std::mem::replace(&mut task.board, board))
    }

    /// Puts `previous` back, but only if the task still sits on `expected`.
    ///
    /// A refetch that landed in between already replaced the task with
    /// server truth; that copy is left alone.
    pub fn revert_board(&mut self, id: &TaskId, expected: &BoardId, previous: BoardRef) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == *id) {
            Some(task) if task.board_id() == expected => {
                task.board = previous;
                true
            }
            _ => false,
        }
    }

    /// Tasks currently on `board`, in list order.
    pub fn tasks_on<'a>(&'a self, board: &'a BoardId) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks.iter().filter(move |t| t.board_id() == board)
    }

    /// All tasks in list order.
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The tasks as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }
}
