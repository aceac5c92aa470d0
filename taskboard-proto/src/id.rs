//! Identifier types and reference normalization.
//!
//! The backend hands out opaque string identifiers, but the same entity can
//! show up as `"abc"`, as `123`, or embedded as `{ "_id": "abc", ... }`
//! depending on which endpoint populated it. Identifiers are therefore
//! normalized to strings on the way in, and references compare by id only.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize};

/// Any JSON scalar the backend uses as an identifier.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Unsigned(n) => n.to_string(),
            Self::Signed(n) => n.to_string(),
        }
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an already-normalized identifier string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }
    };
}

string_id!(
    /// Identifier of a task.
    TaskId
);
string_id!(
    /// Identifier of a board (a column within a project).
    BoardId
);
string_id!(
    /// Identifier of a project.
    ProjectId
);
string_id!(
    /// Identifier of a user.
    UserId
);
string_id!(
    /// Identifier of a task comment.
    CommentId
);
string_id!(
    /// Identifier of an organization (the tenant).
    OrganizationId
);

/// Implemented by embedded summaries so a reference can find its id.
pub trait HasId {
    /// The identifier type of the entity.
    type Id;

    /// Returns the entity's identifier.
    fn id(&self) -> &Self::Id;
}

/// A reference to another entity: either its raw id or an embedded copy.
///
/// Equality and hashing only consider [`EntityRef::id`], so a raw id and
/// an embedded object naming the same entity are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef<I, S> {
    /// Reference by identifier only.
    Id(I),
    /// Reference carrying an embedded summary of the entity.
    Embedded(S),
}

impl<I, S: HasId<Id = I>> EntityRef<I, S> {
    /// Returns the referenced entity's identifier, whatever the shape.
    pub fn id(&self) -> &I {
        match self {
            Self::Id(id) => id,
            Self::Embedded(summary) => summary.id(),
        }
    }

    /// Returns the embedded summary, if the backend populated one.
    pub const fn summary(&self) -> Option<&S> {
        match self {
            Self::Id(_) => None,
            Self::Embedded(summary) => Some(summary),
        }
    }
}

impl<I, S> From<I> for EntityRef<I, S> {
    fn from(id: I) -> Self {
        Self::Id(id)
    }
}

impl<I: PartialEq, S: HasId<Id = I>> PartialEq for EntityRef<I, S> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<I: Eq, S: HasId<Id = I>> Eq for EntityRef<I, S> {}

impl<I: Hash, S: HasId<Id = I>> Hash for EntityRef<I, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}
