//! Conversation CRUD and moderator management.

use std::collections::BTreeSet;

use sqlx::sqlite::SqlitePool;
use tracing::info;

use hv_crypto::DataKey;
use hv_model::{Conversation, ConversationUpdate, EntityId};
use hv_store::{tables, EncryptedAccessor, Store, StoreError};

use crate::error::ServiceError;

/// Request to open a new conversation.
#[derive(Debug, Clone)]
pub struct CreateConversationRequest {
    pub name: String,
    pub description: String,
    /// Founding moderators; must not be empty.
    pub moderators: Vec<EntityId>,
}

pub struct ConversationService {
    store: Store,
}

impl ConversationService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    fn pool(&self) -> &SqlitePool {
        &self.store.pool
    }

    fn accessor(&self, key: &DataKey) -> EncryptedAccessor<Conversation> {
        EncryptedAccessor::new(tables::CONVERSATIONS, key.clone())
    }

    pub async fn create(
        &self,
        req: CreateConversationRequest,
        key: &DataKey,
    ) -> Result<Conversation, ServiceError> {
        let moderators: BTreeSet<EntityId> = req.moderators.into_iter().collect();
        let conversation = Conversation::new(req.name, req.description, moderators)?;

        let data = self.accessor(key).seal(&conversation)?;
        sqlx::query(
            "INSERT INTO conversations (id, created, updated, data) VALUES (?, ?, ?, ?)",
        )
        .bind(conversation.id.as_str())
        .bind(conversation.created_at.to_rfc3339())
        .bind(conversation.updated_at.to_rfc3339())
        .bind(data)
        .execute(self.pool())
        .await
        .map_err(StoreError::from)?;

        info!(conversation = %conversation.id, "conversation created");
        Ok(conversation)
    }

    pub async fn get(&self, id: &EntityId, key: &DataKey) -> Result<Conversation, ServiceError> {
        Ok(self.accessor(key).get(self.pool(), id).await?)
    }

    /// List conversations, optionally keeping only those whose name
    /// contains `pattern`. Names are ciphertext in storage, so the match
    /// runs after decryption.
    pub async fn list(
        &self,
        pattern: Option<&str>,
        key: &DataKey,
    ) -> Result<Vec<Conversation>, ServiceError> {
        let mut conversations = self.accessor(key).list(self.pool()).await?;
        if let Some(pattern) = pattern {
            conversations.retain(|c| c.name.contains(pattern));
        }
        Ok(conversations)
    }

    pub async fn update(
        &self,
        id: &EntityId,
        update: ConversationUpdate,
        key: &DataKey,
    ) -> Result<Conversation, ServiceError> {
        let accessor = self.accessor(key);
        let conversation = accessor.get(self.pool(), id).await?;
        let conversation = conversation.with_updates(update);
        accessor.set(self.pool(), id, &conversation).await?;
        Ok(conversation)
    }

    /// Add moderators to a conversation. Ids already present are absorbed
    /// without duplicates.
    pub async fn add_moderators(
        &self,
        id: &EntityId,
        moderators: Vec<EntityId>,
        key: &DataKey,
    ) -> Result<Conversation, ServiceError> {
        let accessor = self.accessor(key);
        let conversation = accessor.get(self.pool(), id).await?;
        let conversation = conversation.add_moderators(moderators);
        accessor.set(self.pool(), id, &conversation).await?;
        Ok(conversation)
    }

    /// Remove moderators from a conversation. Refused with `Conflict` when
    /// the removal would leave no moderators; the stored conversation is
    /// untouched in that case.
    pub async fn remove_moderators(
        &self,
        id: &EntityId,
        moderators: Vec<EntityId>,
        key: &DataKey,
    ) -> Result<Conversation, ServiceError> {
        let accessor = self.accessor(key);
        let conversation = accessor.get(self.pool(), id).await?;
        let conversation = conversation.remove_moderators(&moderators)?;
        accessor.set(self.pool(), id, &conversation).await?;
        Ok(conversation)
    }

    pub async fn list_moderators(
        &self,
        id: &EntityId,
        key: &DataKey,
    ) -> Result<Vec<EntityId>, ServiceError> {
        let conversation = self.accessor(key).get(self.pool(), id).await?;
        Ok(conversation.moderators.into_iter().collect())
    }

    /// Remove a conversation. Its messages go with it (enforced by the
    /// store's cascading foreign key).
    pub async fn remove(&self, id: &EntityId) -> Result<(), ServiceError> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(id.as_str())
            .execute(self.pool())
            .await
            .map_err(StoreError::from)?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(tables::CONVERSATIONS));
        }
        info!(conversation = %id, "conversation removed");
        Ok(())
    }
}
