//! Messages posted into conversations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: EntityId,
    pub author: EntityId,
    pub conversation: EntityId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    pub fn new(author: EntityId, conversation: EntityId, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            author,
            conversation,
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy the message, overwrite the provided fields, and bump
    /// `updated_at`. Author and conversation are fixed at creation.
    pub fn with_updates(&self, update: MessageUpdate) -> Self {
        Self {
            id: self.id.clone(),
            author: self.author.clone(),
            conversation: self.conversation.clone(),
            content: update.content.unwrap_or_else(|| self.content.clone()),
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }
}

/// Field overrides for [`Message::with_updates`].
#[derive(Debug, Clone, Default)]
pub struct MessageUpdate {
    pub content: Option<String>,
}
