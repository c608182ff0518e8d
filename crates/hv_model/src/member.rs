//! Group members.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// A member of the group. The username is unique within the group; its
/// index hash backs the store's uniqueness constraint and username lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: EntityId,
    pub username: String,
    /// Display name shown to other members.
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn new(username: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            username: username.into(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy the member, overwrite the provided fields, and bump `updated_at`.
    pub fn with_updates(&self, update: MemberUpdate) -> Self {
        Self {
            id: self.id.clone(),
            username: update.username.unwrap_or_else(|| self.username.clone()),
            name: update.name.unwrap_or_else(|| self.name.clone()),
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }
}

/// Field overrides for [`Member::with_updates`].
#[derive(Debug, Clone, Default)]
pub struct MemberUpdate {
    pub username: Option<String>,
    pub name: Option<String>,
}
