//! The persisted group record: security bundle plus encrypted payload.
//!
//! A group row carries everything a password holder needs to recover the
//! data key (salt, credential hash, wrapped key, handle index hash) next to
//! the group payload ciphertext. The data key itself never appears here
//! except inside its AEAD envelope.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use tracing::debug;

use hv_crypto::{
    derive_key, envelope, hash_index, hash_password, DataKey, IndexHash, KdfParams, Password,
    PasswordHash, Salt,
};
use hv_model::{EntityId, Group};

use crate::accessor::EncryptedAccessor;
use crate::error::StoreError;
use crate::rows::GroupRow;
use crate::tables;

/// Everything persisted for a group, ready to be written as one row.
pub struct GroupEntity {
    pub id: EntityId,
    pub idhash: IndexHash,
    pub psalt: Salt,
    pub phash: PasswordHash,
    pub ekey: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: Vec<u8>,
}

impl GroupEntity {
    /// Assemble the full bundle for a brand-new group: fresh salt, derived
    /// pass key, wrapped data key, credential hash, handle index hash, and
    /// the payload encrypted under the data key.
    pub fn seal(
        group: &Group,
        password: &Password,
        data_key: &DataKey,
        params: &KdfParams,
    ) -> Result<Self, StoreError> {
        let psalt = Salt::generate();
        debug!(group = %group.id, "deriving pass key");
        let pass_key = derive_key(password, &psalt, params)?;

        debug!(group = %group.id, "wrapping data key");
        let ekey = envelope::wrap_data_key(&pass_key, data_key)?;

        let idhash = hash_index(group.handle.as_bytes());
        let phash = hash_password(password)?;

        debug!(group = %group.id, "encrypting group payload");
        let accessor = EncryptedAccessor::<Group>::new(tables::GROUPS, data_key.clone());
        let data = accessor.seal(group)?;

        Ok(Self {
            id: group.id.clone(),
            idhash,
            psalt,
            phash,
            ekey,
            created_at: group.created_at,
            updated_at: group.updated_at,
            data,
        })
    }
}

/// True when a group row already exists in this deployment.
pub async fn group_exists(pool: &SqlitePool) -> Result<bool, StoreError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groups")
        .fetch_one(pool)
        .await?;
    Ok(count != 0)
}

/// Insert a freshly sealed group entity.
pub async fn insert_group(pool: &SqlitePool, entity: &GroupEntity) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO groups (id, idhash, psalt, phash, ekey, created, updated, data) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(entity.id.as_str())
    .bind(entity.idhash.to_hex())
    .bind(entity.psalt.as_bytes())
    .bind(entity.phash.as_str())
    .bind(&entity.ekey)
    .bind(entity.created_at.to_rfc3339())
    .bind(entity.updated_at.to_rfc3339())
    .bind(&entity.data)
    .execute(pool)
    .await?;
    Ok(())
}

/// Fetch the deployment's group row, if one has been created.
pub async fn fetch_group(pool: &SqlitePool) -> Result<Option<GroupRow>, StoreError> {
    let row = sqlx::query_as::<_, GroupRow>(
        "SELECT id, idhash, psalt, phash, ekey, created, updated, data FROM groups LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch a group row by the index hash of its handle.
pub async fn fetch_group_by_hash(
    pool: &SqlitePool,
    hash: &IndexHash,
) -> Result<Option<GroupRow>, StoreError> {
    let row = sqlx::query_as::<_, GroupRow>(
        "SELECT id, idhash, psalt, phash, ekey, created, updated, data \
         FROM groups WHERE idhash = ?",
    )
    .bind(hash.to_hex())
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Replace a group's security bundle after a password rotation, together
/// with the re-encrypted payload whose updated stamp was bumped.
#[allow(clippy::too_many_arguments)]
pub async fn update_group_security(
    pool: &SqlitePool,
    id: &EntityId,
    psalt: &Salt,
    phash: &PasswordHash,
    ekey: &[u8],
    updated_at: DateTime<Utc>,
    data: &[u8],
) -> Result<(), StoreError> {
    let result = sqlx::query(
        "UPDATE groups SET psalt = ?, phash = ?, ekey = ?, updated = ?, data = ? WHERE id = ?",
    )
    .bind(psalt.as_bytes())
    .bind(phash.as_str())
    .bind(ekey)
    .bind(updated_at.to_rfc3339())
    .bind(data)
    .bind(id.as_str())
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(tables::GROUPS));
    }
    Ok(())
}

/// Rewrite a group's payload and handle index hash after a field update.
pub async fn update_group_payload(
    pool: &SqlitePool,
    id: &EntityId,
    idhash: &IndexHash,
    updated_at: DateTime<Utc>,
    data: &[u8],
) -> Result<(), StoreError> {
    let result =
        sqlx::query("UPDATE groups SET idhash = ?, updated = ?, data = ? WHERE id = ?")
            .bind(idhash.to_hex())
            .bind(updated_at.to_rfc3339())
            .bind(data)
            .bind(id.as_str())
            .execute(pool)
            .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(tables::GROUPS));
    }
    Ok(())
}
