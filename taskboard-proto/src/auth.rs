//! Login and registration payloads.

use serde::{Deserialize, Serialize};

use crate::user::User;

/// Request body for `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Request body for `POST /auth/register`.
///
/// A registration either joins an existing organization through an
/// invitation token or creates a new organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Invitation to an existing organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_token: Option<String>,
    /// Name of the organization to create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
}

impl Registration {
    /// A registration that creates `"<name>'s Organization"`.
    #[must_use]
    pub fn new(name: &str, email: &str, password: &str) -> Self {
        let organization_name = if name.is_empty() {
            "My Organization".to_string()
        } else {
            format!("{name}'s Organization")
        };
        Self {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            invitation_token: None,
            organization_name: Some(organization_name),
        }
    }

    /// Joins through an invitation instead of creating an organization.
    #[must_use]
    pub fn with_invitation(mut self, token: impl Into<String>) -> Self {
        self.invitation_token = Some(token.into());
        self.organization_name = None;
        self
    }

    /// Overrides the name of the organization to create.
    #[must_use]
    pub fn with_organization(mut self, name: impl Into<String>) -> Self {
        if self.invitation_token.is_none() {
            self.organization_name = Some(name.into());
        }
        self
    }
}

/// Response of login and registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The authenticated user.
    pub user: User,
}
