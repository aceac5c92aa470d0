//! Shared data model for the `Taskboard` REST API.
//!
//! Every type here mirrors a JSON shape served by the backend. The backend
//! is inconsistent about how it references related entities (sometimes a
//! raw id, sometimes an embedded object), so all cross-entity references go
//! through [`id::EntityRef`] and are compared by normalized identifier.

pub mod auth;
pub mod board;
pub mod comment;
pub mod id;
pub mod organization;
pub mod project;
pub mod task;
pub mod user;

use serde::{Deserialize, Serialize};

/// Error body returned by the backend on non-success responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Human-readable failure description, shown to the user verbatim.
    #[serde(default)]
    pub msg: Option<String>,
}
