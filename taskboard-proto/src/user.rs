//! Users, organization roles, and display helpers.

use serde::{Deserialize, Serialize};

use crate::id::{EntityRef, HasId, UserId};

/// A user's role within their organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    /// Created the organization.
    Owner,
    /// Organization administrator.
    Admin,
    /// Manager with cross-project rights.
    Manager,
    /// Regular member.
    #[default]
    Member,
    /// A role this client does not know about.
    #[serde(untagged)]
    Other(String),
}

impl OrgRole {
    /// Whether this role grants rights on every project in the organization.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin | Self::Manager)
    }
}

/// A user account as returned by `/auth/me` and `/organizations/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Organization role.
    #[serde(default)]
    pub role: OrgRole,
}

impl User {
    /// Returns up to two upper-case initials for avatars.
    #[must_use]
    pub fn initials(&self) -> String {
        let source = if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        };
        initials(source)
    }
}

/// An embedded user object inside another entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User identifier.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name, when populated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Email, when populated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl HasId for UserSummary {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.id
    }
}

/// Reference to a user: raw id or embedded summary.
pub type UserRef = EntityRef<UserId, UserSummary>;

/// Returns initials for a user reference, `?` when nothing is known.
#[must_use]
pub fn ref_initials(user: &UserRef) -> String {
    match user.summary() {
        Some(summary) => summary
            .name
            .as_deref()
            .or(summary.email.as_deref())
            .map_or_else(|| "?".to_string(), initials),
        None => "?".to_string(),
    }
}

/// First letters of the first two space-separated words, upper-cased.
///
/// A single word yields one letter; an empty name yields `?`.
#[must_use]
pub fn initials(name: &str) -> String {
    let mut words = name.split(' ').filter(|w| !w.is_empty());
    match (words.next(), words.next()) {
        (Some(first), Some(second)) => first
            .chars()
            .take(1)
            .chain(second.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect(),
        (Some(first), None) => first.chars().take(1).flat_map(char::to_uppercase).collect(),
        (None, _) => "?".to_string(),
    }
}
