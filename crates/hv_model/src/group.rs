//! The group: the single top-level entity a deployment serves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// Group metadata. The handle is the human-readable identifier members use
/// to address the group when authenticating; its index hash is stored next
/// to the encrypted payload for lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: EntityId,
    pub handle: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Create a new group with a fresh id and equal created/updated stamps.
    pub fn new(
        handle: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            handle: handle.into(),
            name: name.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy the group, overwrite the provided fields, and bump `updated_at`.
    pub fn with_updates(&self, update: GroupUpdate) -> Self {
        Self {
            id: self.id.clone(),
            handle: update.handle.unwrap_or_else(|| self.handle.clone()),
            name: update.name.unwrap_or_else(|| self.name.clone()),
            description: update
                .description
                .unwrap_or_else(|| self.description.clone()),
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }
}

/// Field overrides for [`Group::with_updates`]. `None` keeps the old value.
#[derive(Debug, Clone, Default)]
pub struct GroupUpdate {
    pub handle: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_group_stamps_equal_timestamps() {
        let g = Group::new("g1", "Book Club", "weekly reads");
        assert_eq!(g.created_at, g.updated_at);
    }

    #[test]
    fn with_updates_overrides_only_given_fields() {
        let g = Group::new("g1", "Book Club", "weekly reads");
        let updated = g.with_updates(GroupUpdate {
            name: Some("Film Club".into()),
            ..GroupUpdate::default()
        });
        assert_eq!(updated.id, g.id);
        assert_eq!(updated.handle, "g1");
        assert_eq!(updated.name, "Film Club");
        assert_eq!(updated.description, "weekly reads");
        assert_eq!(updated.created_at, g.created_at);
        assert!(updated.updated_at > g.updated_at);
    }

    #[test]
    fn empty_update_changes_only_updated_at() {
        let g = Group::new("g1", "Book Club", "weekly reads");
        let a = g.with_updates(GroupUpdate::default());
        let b = g.with_updates(GroupUpdate::default());
        assert_eq!(a.id, b.id);
        assert_eq!(a.handle, b.handle);
        assert_eq!(a.name, b.name);
        assert_eq!(a.description, b.description);
        assert_eq!(a.created_at, b.created_at);
    }
}
