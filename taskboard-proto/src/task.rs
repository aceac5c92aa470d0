//! Tasks and the form used to create or update them.
//!
//! A task belongs to whichever board its `board` field names; moving a task
//! between columns is nothing more than rewriting that reference.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::board::BoardRef;
use crate::id::{BoardId, EntityRef, TaskId, UserId};
use crate::user::UserRef;

/// Workflow status of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Todo,
    /// Being worked on.
    InProgress,
    /// Done.
    Completed,
    /// A status this client does not know about, kept verbatim.
    #[serde(untagged)]
    Other(String),
}

impl TaskStatus {
    /// Wire representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Default priority.
    #[default]
    Medium,
    /// High priority.
    High,
}

impl Priority {
    /// Wire representation of the priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses a wire value; anything unrecognized is `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// `null` decodes like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Missing, `null`, empty or unknown priorities fall back to medium.
fn lenient_priority<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Priority, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .and_then(Priority::parse)
        .unwrap_or_default())
}

/// A task record as returned by `GET /tasks/board/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task identifier.
    #[serde(rename = "_id")]
    pub id: TaskId,
    /// Card title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Rich-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The board that owns this task.
    pub board: BoardRef,
    /// Workflow status.
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TaskStatus,
    /// Priority.
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Priority,
    /// Assigned users.
    #[serde(default, deserialize_with = "null_as_default")]
    pub assigned_to: Vec<UserRef>,
    /// Attachment location, if one was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    /// Due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Normalized id of the owning board.
    #[must_use]
    pub fn board_id(&self) -> &BoardId {
        self.board.id()
    }

    /// Normalized ids of the assigned users.
    pub fn assignee_ids(&self) -> impl Iterator<Item = &UserId> {
        self.assigned_to.iter().map(EntityRef::id)
    }
}

/// Response of the tasks-by-board endpoint.
///
/// Depending on the backend version this is a bare array or an object
/// wrapping the array; both decode to the same list. A bad record reports
/// its own decode error.
#[derive(Debug, Clone)]
pub enum TaskList {
    /// `[ {...}, {...} ]`
    Bare(Vec<Task>),
    /// `{ "tasks": [ ... ] }`
    Wrapped {
        /// The wrapped tasks; missing or `null` means none.
        tasks: Vec<Task>,
    },
}

impl<'de> Deserialize<'de> for TaskList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TaskListVisitor)
    }
}

struct TaskListVisitor;

impl<'de> Visitor<'de> for TaskListVisitor {
    type Value = TaskList;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a task array or an object with a `tasks` array")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<TaskList, A::Error> {
        Vec::<Task>::deserialize(de::value::SeqAccessDeserializer::new(seq)).map(TaskList::Bare)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TaskList, A::Error> {
        let mut tasks: Option<Vec<Task>> = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == "tasks" {
                if tasks.is_some() {
                    return Err(de::Error::duplicate_field("tasks"));
                }
                tasks = Some(map.next_value::<Option<Vec<Task>>>()?.unwrap_or_default());
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(TaskList::Wrapped {
            tasks: tasks.unwrap_or_default(),
        })
    }
}

impl TaskList {
    /// Unwraps the response into a plain list.
    #[must_use]
    pub fn into_vec(self) -> Vec<Task> {
        match self {
            Self::Bare(tasks) | Self::Wrapped { tasks } => tasks,
        }
    }
}

/// An uploaded file attached to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name presented to the backend.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Fields for creating or updating a task.
///
/// Only fields that are `Some` are sent; an update with just `board` set is
/// the column move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    /// Card title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Owning board.
    pub board: Option<BoardId>,
    /// Workflow status.
    pub status: Option<TaskStatus>,
    /// Priority.
    pub priority: Option<Priority>,
    /// Complete replacement of the assignee list.
    pub assigned_to: Option<Vec<UserId>>,
    /// Due date (day precision, as the task form collects it).
    pub due_date: Option<NaiveDate>,
    /// File to upload.
    pub attachment: Option<Attachment>,
}

impl TaskForm {
    /// A form that only reassigns the task to `board`.
    #[must_use]
    pub fn move_to(board: BoardId) -> Self {
        Self {
            board: Some(board),
            ..Self::default()
        }
    }

    /// A form for a new task titled `title` on `board`.
    #[must_use]
    pub fn new_task(title: impl Into<String>, board: BoardId) -> Self {
        Self {
            title: Some(title.into()),
            board: Some(board),
            ..Self::default()
        }
    }

    /// Text fields as `(name, value)` pairs in multipart order.
    ///
    /// Assignees become repeated `assignedTo[]` fields. The attachment is
    /// not included; it travels as a file part.
    #[must_use]
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(title) = &self.title {
            fields.push(("title", title.clone()));
        }
        if let Some(description) = &self.description {
            fields.push(("description", description.clone()));
        }
        if let Some(board) = &self.board {
            fields.push(("board", board.to_string()));
        }
        if let Some(status) = &self.status {
            fields.push(("status", status.to_string()));
        }
        if let Some(priority) = self.priority {
            fields.push(("priority", priority.as_str().to_string()));
        }
        if let Some(assignees) = &self.assigned_to {
            fields.extend(assignees.iter().map(|u| ("assignedTo[]", u.to_string())));
        }
        if let Some(due) = self.due_date {
            fields.push(("dueDate", due.format("%Y-%m-%d").to_string()));
        }
        fields
    }

    /// Applies the set fields to an existing task.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(board) = &self.board {
            task.board = EntityRef::from(board.clone());
        }
        if let Some(status) = &self.status {
            task.status = status.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(assignees) = &self.assigned_to {
            task.assigned_to = assignees.iter().cloned().map(EntityRef::from).collect();
        }
        if let Some(due) = self.due_date {
            task.due_date = due.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
        if let Some(attachment) = &self.attachment {
            task.attachment = Some(attachment.file_name.clone());
        }
    }
}
