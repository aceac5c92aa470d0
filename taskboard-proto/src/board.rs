//! Boards: the columns of a project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{BoardId, EntityRef, HasId, ProjectId};
use crate::project::ProjectRef;
use crate::user::UserRef;

/// A board as returned by `GET /boards/project/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Board identifier.
    #[serde(rename = "_id")]
    pub id: BoardId,
    /// Column title.
    #[serde(default)]
    pub title: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectRef>,
    /// User that created the board.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserRef>,
    /// Creation time; defines the left-to-right column order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// An embedded board object, as found in a task's `board` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSummary {
    /// Board identifier.
    #[serde(rename = "_id")]
    pub id: BoardId,
    /// Board title, when populated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl HasId for BoardSummary {
    type Id = BoardId;

    fn id(&self) -> &BoardId {
        &self.id
    }
}

/// Reference to a board: raw id or embedded summary.
pub type BoardRef = EntityRef<BoardId, BoardSummary>;

/// Request body for creating or updating a board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardForm {
    /// Column title.
    pub title: String,
    /// Optional description; sent as an empty string when cleared.
    pub description: String,
    /// Project to create the board in. Omitted on update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
}

/// Sorts boards by creation time, oldest first.
///
/// Boards without a timestamp sort first; ties keep their server order.
pub fn sort_boards(boards: &mut [Board]) {
    boards.sort_by(|a, b| a.created_at.cmp(&b.created_at));
}
