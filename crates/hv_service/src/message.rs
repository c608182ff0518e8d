//! Message CRUD and filtered listing.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;

use hv_crypto::DataKey;
use hv_model::{EntityId, Message, MessageUpdate};
use hv_store::{tables, Bind, EncryptedAccessor, Filter, Store, StoreError};

use crate::error::ServiceError;

/// Request to post a message into a conversation.
#[derive(Debug, Clone)]
pub struct CreateMessageRequest {
    pub conversation: EntityId,
    pub author: EntityId,
    pub content: String,
}

/// Listing criteria for a conversation's messages.
///
/// Author and the created-at range are persisted columns and are pushed
/// down into SQL; the content pattern runs after decryption because the
/// content column is ciphertext.
#[derive(Debug, Clone, Default)]
pub struct ListMessagesRequest {
    pub author: Option<EntityId>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub content_pattern: Option<String>,
}

pub struct MessageService {
    store: Store,
}

impl MessageService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    fn pool(&self) -> &SqlitePool {
        &self.store.pool
    }

    fn accessor(&self, key: &DataKey) -> EncryptedAccessor<Message> {
        EncryptedAccessor::new(tables::MESSAGES, key.clone())
    }

    pub async fn create(
        &self,
        req: CreateMessageRequest,
        key: &DataKey,
    ) -> Result<Message, ServiceError> {
        // Check the referenced rows up front so a bad id reads as NotFound
        // rather than a foreign-key failure from SQLite.
        let conversation_known: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM conversations WHERE id = ?")
                .bind(req.conversation.as_str())
                .fetch_optional(self.pool())
                .await
                .map_err(StoreError::from)?;
        if conversation_known.is_none() {
            return Err(ServiceError::NotFound(tables::CONVERSATIONS));
        }
        let author_known: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM members WHERE id = ?")
            .bind(req.author.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(StoreError::from)?;
        if author_known.is_none() {
            return Err(ServiceError::NotFound(tables::MEMBERS));
        }

        let message = Message::new(req.author, req.conversation, req.content);
        let data = self.accessor(key).seal(&message)?;
        sqlx::query(
            "INSERT INTO messages (id, conversation, author, created, updated, data) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(message.id.as_str())
        .bind(message.conversation.as_str())
        .bind(message.author.as_str())
        .bind(message.created_at.to_rfc3339())
        .bind(message.updated_at.to_rfc3339())
        .bind(data)
        .execute(self.pool())
        .await
        .map_err(StoreError::from)?;

        Ok(message)
    }

    pub async fn get(&self, id: &EntityId, key: &DataKey) -> Result<Message, ServiceError> {
        Ok(self.accessor(key).get(self.pool(), id).await?)
    }

    /// Edit a message's content.
    pub async fn update(
        &self,
        id: &EntityId,
        update: MessageUpdate,
        key: &DataKey,
    ) -> Result<Message, ServiceError> {
        let accessor = self.accessor(key);
        let message = accessor.get(self.pool(), id).await?;
        let message = message.with_updates(update);
        accessor.set(self.pool(), id, &message).await?;
        Ok(message)
    }

    /// List a conversation's messages matching the criteria.
    pub async fn list(
        &self,
        conversation: &EntityId,
        req: ListMessagesRequest,
        key: &DataKey,
    ) -> Result<Vec<Message>, ServiceError> {
        let mut filter = Filter::new().clause(
            "conversation = ?",
            Bind::Text(conversation.as_str().to_owned()),
        );
        if let Some(author) = &req.author {
            filter = filter.clause("author = ?", Bind::Text(author.as_str().to_owned()));
        }
        if let Some(after) = req.created_after {
            filter = filter.clause("created >= ?", Bind::Text(after.to_rfc3339()));
        }
        if let Some(before) = req.created_before {
            filter = filter.clause("created <= ?", Bind::Text(before.to_rfc3339()));
        }

        let mut messages = self
            .accessor(key)
            .list_filtered(self.pool(), &filter)
            .await?;
        if let Some(pattern) = &req.content_pattern {
            messages.retain(|m| m.content.contains(pattern.as_str()));
        }
        Ok(messages)
    }

    pub async fn remove(&self, id: &EntityId) -> Result<(), ServiceError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id.as_str())
            .execute(self.pool())
            .await
            .map_err(StoreError::from)?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(tables::MESSAGES));
        }
        Ok(())
    }
}
