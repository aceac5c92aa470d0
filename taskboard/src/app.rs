//! Application state and event handling for the board view.
//!
//! Dragging is done with the keyboard: `Space` grabs the focused card,
//! moving the focus picks the target, and `Enter` drops it.

use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use taskboard_proto::board::Board;
use taskboard_proto::id::{BoardId, TaskId};
use taskboard_proto::task::Task;

use crate::board::BoardSnapshot;
use crate::board::session::{DELETE_BOARD_PROMPT, DELETE_TASK_PROMPT};
use crate::notice::Notice;

/// Number of notices kept for display.
const NOTICE_HISTORY: usize = 5;

/// Work the main loop performs on behalf of the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// A card was dropped on a board or on another card.
    DragEnd {
        /// Dragged task id.
        active: String,
        /// Board id or task id under the drop.
        over: String,
    },
    /// Reload the board now.
    Refresh,
    /// Delete a task (already confirmed).
    DeleteTask(TaskId),
    /// Delete a board and its tasks (already confirmed).
    DeleteBoard(BoardId),
}

/// A destructive command waiting for `y`/`n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirm {
    /// Question shown to the user.
    pub prompt: &'static str,
    /// Command issued on `y`.
    pub command: AppCommand,
}

/// Main application state.
#[derive(Debug, Default)]
pub struct App {
    /// Name of the open project.
    pub project_name: String,
    /// Columns, oldest first.
    pub boards: Vec<Board>,
    /// All tasks of the project.
    pub tasks: Vec<Task>,
    /// Tasks with a move in flight.
    pub pending: Vec<TaskId>,
    /// Focused column index.
    pub column: usize,
    /// Focused card within the column; `None` focuses the column itself.
    pub card: Option<usize>,
    /// Card picked up with `Space`.
    pub grabbed: Option<TaskId>,
    /// Most recent notices, oldest first.
    pub notices: VecDeque<Notice>,
    /// Confirmation currently asked for.
    pub confirm: Option<PendingConfirm>,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl App {
    /// Creates an empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the displayed data, keeping focus where it still fits.
    pub fn apply_snapshot(&mut self, snapshot: BoardSnapshot) {
        self.project_name = snapshot.project_name;
        self.boards = snapshot.boards;
        self.tasks = snapshot.tasks;
        self.pending = snapshot.pending;
        if let Some(grabbed) = &self.grabbed
            && !self.tasks.iter().any(|t| t.id == *grabbed)
        {
            self.grabbed = None;
        }
        self.clamp_focus();
    }

    /// Records a notice, dropping the oldest beyond the history size.
    pub fn push_notice(&mut self, notice: Notice) {
        if self.notices.len() == NOTICE_HISTORY {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }

    /// Cards of the column at `index`.
    #[must_use]
    pub fn cards_in(&self, index: usize) -> Vec<&Task> {
        self.boards.get(index).map_or_else(Vec::new, |board| {
            self.tasks
                .iter()
                .filter(|t| *t.board_id() == board.id)
                .collect()
        })
    }

    /// The focused column.
    #[must_use]
    pub fn focused_board(&self) -> Option<&Board> {
        self.boards.get(self.column)
    }

    /// The focused card.
    #[must_use]
    pub fn focused_task(&self) -> Option<&Task> {
        let card = self.card?;
        self.cards_in(self.column).get(card).copied()
    }

    /// Whether `task` has a move in flight.
    #[must_use]
    pub fn is_pending(&self, task: &TaskId) -> bool {
        self.pending.contains(task)
    }

    /// Handles a key press, returning work for the main loop.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<AppCommand> {
        if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
            self.should_quit = true;
            return None;
        }
        if self.confirm.is_some() {
            return self.handle_confirm_key(key);
        }

        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.move_column(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_column(1),
            KeyCode::Up | KeyCode::Char('k') => self.prev_card(),
            KeyCode::Down | KeyCode::Char('j') => self.next_card(),
            KeyCode::Char(' ') => {
                self.grabbed = self.focused_task().map(|t| t.id.clone());
            }
            KeyCode::Enter => return self.drop_grabbed(),
            KeyCode::Esc => {
                if self.grabbed.take().is_none() {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => return Some(AppCommand::Refresh),
            KeyCode::Char('d') => {
                if let Some(task) = self.focused_task() {
                    self.confirm = Some(PendingConfirm {
                        prompt: DELETE_TASK_PROMPT,
                        command: AppCommand::DeleteTask(task.id.clone()),
                    });
                }
            }
            KeyCode::Char('D') => {
                if let Some(board) = self.focused_board() {
                    self.confirm = Some(PendingConfirm {
                        prompt: DELETE_BOARD_PROMPT,
                        command: AppCommand::DeleteBoard(board.id.clone()),
                    });
                }
            }
            _ => {}
        }
        None
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Option<AppCommand> {
        match key.code {
            KeyCode::Char('y' | 'Y') => self.confirm.take().map(|c| c.command),
            KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                self.confirm = None;
                None
            }
            _ => None,
        }
    }

    /// Drops the grabbed card on the focused card, else on the column.
    fn drop_grabbed(&mut self) -> Option<AppCommand> {
        let active = self.grabbed.take()?;
        let over = match self.focused_task() {
            Some(task) => task.id.to_string(),
            None => self.focused_board()?.id.to_string(),
        };
        Some(AppCommand::DragEnd {
            active: active.to_string(),
            over,
        })
    }

    fn move_column(&mut self, delta: isize) {
        if self.boards.is_empty() {
            return;
        }
        let last = self.boards.len() - 1;
        self.column = self.column.saturating_add_signed(delta).min(last);
        self.card = None;
    }

    fn prev_card(&mut self) {
        self.card = match self.card {
            Some(0) | None => None,
            Some(n) => Some(n - 1),
        };
    }

    fn next_card(&mut self) {
        let len = self.cards_in(self.column).len();
        if len == 0 {
            return;
        }
        self.card = Some(self.card.map_or(0, |n| (n + 1).min(len - 1)));
    }

    fn clamp_focus(&mut self) {
        if self.boards.is_empty() {
            self.column = 0;
            self.card = None;
            return;
        }
        self.column = self.column.min(self.boards.len() - 1);
        let len = self.cards_in(self.column).len();
        self.card = match self.card {
            Some(_) if len == 0 => None,
            Some(n) => Some(n.min(len - 1)),
            None => None,
        };
    }
}
