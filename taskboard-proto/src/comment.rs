//! Task comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::CommentId;
use crate::user::UserRef;

/// A comment on a task, as returned by `GET /comments/task/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Comment identifier.
    #[serde(rename = "_id")]
    pub id: CommentId,
    /// Comment body.
    #[serde(default)]
    pub text: String,
    /// Author, raw or populated.
    #[serde(default, alias = "user", skip_serializing_if = "Option::is_none")]
    pub author: Option<UserRef>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for creating or editing a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentForm {
    /// Comment body.
    pub text: String,
}
