//! Tracks moves that have been applied locally but not yet confirmed.

use std::collections::HashMap;

use taskboard_proto::board::BoardRef;
use taskboard_proto::id::{BoardId, TaskId};

/// A move waiting for the backend's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    /// Board reference the task had before the move.
    pub from: BoardRef,
    /// Destination board.
    pub to: BoardId,
    /// Destination title, for the success notice.
    pub to_title: String,
    /// Task title, for the success notice.
    pub task_title: String,
}

/// Per-task move state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState<'a> {
    /// No move in flight.
    Idle,
    /// A move is in flight.
    Pending(&'a PendingMove),
}

/// Set of tasks with a move in flight. At most one entry per task.
#[derive(Debug, Default)]
pub struct PendingMoves {
    moves: HashMap<TaskId, PendingMove>,
}

impl PendingMoves {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a move. Returns `false` and keeps the existing entry if the
    /// task already has one in flight.
    pub fn insert(&mut self, task: TaskId, pending: PendingMove) -> bool {
        match self.moves.entry(task) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(pending);
                true
            }
        }
    }

    /// Whether `task` has a move in flight.
    #[must_use]
    pub fn contains(&self, task: &TaskId) -> bool {
        self.moves.contains_key(task)
    }

    /// Clears the entry for `task`, returning it.
    pub fn remove(&mut self, task: &TaskId) -> Option<PendingMove> {
        self.moves.remove(task)
    }

    /// Move state of `task`.
    #[must_use]
    pub fn state(&self, task: &TaskId) -> MoveState<'_> {
        self.moves
            .get(task)
            .map_or(MoveState::Idle, MoveState::Pending)
    }

    /// Whether no move is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Number of moves in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Ids of tasks with a move in flight.
    #[must_use]
    pub fn ids(&self) -> Vec<TaskId> {
        self.moves.keys().cloned().collect()
    }
}
