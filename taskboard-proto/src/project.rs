//! Projects, their members, and the permission rules the board view uses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::id::{EntityRef, HasId, ProjectId, UserId};
use crate::user::{User, UserRef};

/// A member's role inside one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    /// The user that created the project.
    Creator,
    /// Project administrator.
    Admin,
    /// Regular member.
    #[default]
    Member,
    /// A role this client does not know about.
    #[serde(untagged)]
    Other(String),
}

/// A project membership entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// The member; absent when the backend could not populate the user.
    #[serde(default)]
    pub user: Option<UserRef>,
    /// Role within the project.
    #[serde(default)]
    pub role: ProjectRole,
}

/// A project: a tenant-scoped container of boards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project identifier.
    #[serde(rename = "_id")]
    pub id: ProjectId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Project owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserRef>,
    /// Membership list.
    #[serde(default)]
    pub members: Vec<Member>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Returns the membership entry for `user_id`, if any.
    #[must_use]
    pub fn member(&self, user_id: &UserId) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| m.user.as_ref().is_some_and(|u| u.id() == user_id))
    }

    /// Whether `user` may create and move tasks in this project.
    #[must_use]
    pub fn is_member(&self, user: &User) -> bool {
        user.role.is_privileged() || self.member(&user.id).is_some()
    }

    /// Whether `user` administers this project.
    #[must_use]
    pub fn is_admin(&self, user: &User) -> bool {
        user.role.is_privileged()
            || self.member(&user.id).is_some_and(|m| {
                matches!(m.role, ProjectRole::Admin | ProjectRole::Creator)
            })
    }

    /// Whether `user` may rename or delete `board`.
    #[must_use]
    pub fn can_manage_board(&self, user: &User, board: &Board) -> bool {
        self.is_admin(user) || board.owner.as_ref().is_some_and(|o| *o.id() == user.id)
    }
}

/// An embedded project object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Project identifier.
    #[serde(rename = "_id")]
    pub id: ProjectId,
    /// Name, when populated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl HasId for ProjectSummary {
    type Id = ProjectId;

    fn id(&self) -> &ProjectId {
        &self.id
    }
}

/// Reference to a project: raw id or embedded summary.
pub type ProjectRef = EntityRef<ProjectId, ProjectSummary>;

/// Request body for creating or updating a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectForm {
    /// Display name.
    pub name: String,
    /// Description; empty when not set.
    pub description: String,
}

/// Aggregate counts shown on the project overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectStats {
    /// Number of boards.
    pub boards: usize,
    /// Number of tasks across all boards.
    pub tasks: usize,
    /// Number of tasks with status `completed`.
    pub completed: usize,
}
