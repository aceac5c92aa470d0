//! Organizations: the tenant that owns projects and users.

use serde::{Deserialize, Serialize};

use crate::id::OrganizationId;

/// An organization as returned by `GET /organizations/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization identifier.
    #[serde(rename = "_id")]
    pub id: OrganizationId,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Request body for `POST /organizations/invite`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invite {
    /// Address to send the invitation to.
    pub email: String,
}
