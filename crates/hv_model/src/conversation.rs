//! Conversations and their moderator set.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::id::EntityId;

/// A conversation inside the group.
///
/// The moderator set is never empty: construction rejects an empty set and
/// [`Conversation::remove_moderators`] refuses a removal that would drain
/// it. Set semantics make adding an existing moderator a no-op rather than
/// a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub moderators: BTreeSet<EntityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        moderators: BTreeSet<EntityId>,
    ) -> Result<Self, ModelError> {
        if moderators.is_empty() {
            return Err(ModelError::ModeratorsEmpty);
        }
        let now = Utc::now();
        Ok(Self {
            id: EntityId::generate(),
            name: name.into(),
            description: description.into(),
            moderators,
            created_at: now,
            updated_at: now,
        })
    }

    /// Copy the conversation, overwrite the provided fields, and bump
    /// `updated_at`. Moderator changes go through the dedicated functions.
    pub fn with_updates(&self, update: ConversationUpdate) -> Self {
        Self {
            id: self.id.clone(),
            name: update.name.unwrap_or_else(|| self.name.clone()),
            description: update
                .description
                .unwrap_or_else(|| self.description.clone()),
            moderators: self.moderators.clone(),
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }

    /// Return a copy with the given ids added to the moderator set. Ids
    /// already present are absorbed; no duplicates are possible.
    pub fn add_moderators(&self, ids: impl IntoIterator<Item = EntityId>) -> Self {
        let mut moderators = self.moderators.clone();
        moderators.extend(ids);
        Self {
            moderators,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Return a copy with the given ids removed from the moderator set.
    ///
    /// Fails without producing a new value when the removal would leave the
    /// conversation with no moderators at all.
    pub fn remove_moderators(&self, ids: &[EntityId]) -> Result<Self, ModelError> {
        let mut moderators = self.moderators.clone();
        for id in ids {
            moderators.remove(id);
        }
        if moderators.is_empty() {
            return Err(ModelError::ModeratorsEmpty);
        }
        Ok(Self {
            moderators,
            updated_at: Utc::now(),
            ..self.clone()
        })
    }
}

/// Field overrides for [`Conversation::with_updates`].
#[derive(Debug, Clone, Default)]
pub struct ConversationUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mods(ids: &[&str]) -> BTreeSet<EntityId> {
        ids.iter().map(|s| EntityId::from(*s)).collect()
    }

    #[test]
    fn rejects_empty_moderator_set_at_construction() {
        assert!(matches!(
            Conversation::new("general", "", BTreeSet::new()),
            Err(ModelError::ModeratorsEmpty)
        ));
    }

    #[test]
    fn removing_the_last_moderator_fails_and_leaves_value_intact() {
        let c = Conversation::new("general", "", mods(&["m1"])).unwrap();
        let err = c.remove_moderators(&[EntityId::from("m1")]);
        assert!(matches!(err, Err(ModelError::ModeratorsEmpty)));
        assert_eq!(c.moderators, mods(&["m1"]));
    }

    #[test]
    fn add_then_remove_swaps_moderators() {
        let c = Conversation::new("general", "", mods(&["m1"])).unwrap();
        let c = c.add_moderators([EntityId::from("m2")]);
        let c = c.remove_moderators(&[EntityId::from("m1")]).unwrap();
        assert_eq!(c.moderators, mods(&["m2"]));
    }

    #[test]
    fn adding_duplicate_moderators_is_idempotent() {
        let c = Conversation::new("general", "", mods(&["m1"])).unwrap();
        let c = c.add_moderators([EntityId::from("m1"), EntityId::from("m1")]);
        assert_eq!(c.moderators.len(), 1);
    }

    #[test]
    fn removing_an_absent_moderator_is_a_no_op_on_the_set() {
        let c = Conversation::new("general", "", mods(&["m1", "m2"])).unwrap();
        let c = c.remove_moderators(&[EntityId::from("m3")]).unwrap();
        assert_eq!(c.moderators, mods(&["m1", "m2"]));
    }
}
