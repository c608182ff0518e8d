//! Member CRUD and credentials.

use sqlx::sqlite::SqlitePool;
use tracing::{info, warn};

use hv_crypto::{hash_index, hash_password, verify_password, DataKey, Password, PasswordHash};
use hv_model::{EntityId, Member, MemberUpdate};
use hv_store::rows::MemberRow;
use hv_store::{tables, EncryptedAccessor, Store, StoreError};

use crate::error::ServiceError;

/// Request to add a member to the group.
///
/// Carries a raw password, so no Debug impl.
#[derive(Clone)]
pub struct CreateMemberRequest {
    pub username: String,
    pub name: String,
    pub password: String,
}

/// Request to authenticate a member. No Debug impl.
#[derive(Clone)]
pub struct AuthenticateMemberRequest {
    pub username: String,
    pub password: String,
}

/// Request to rotate a member's password. No Debug impl.
#[derive(Clone)]
pub struct ChangeMemberPasswordRequest {
    pub id: EntityId,
    pub old_password: String,
    pub new_password: String,
}

pub struct MemberService {
    store: Store,
}

impl MemberService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    fn pool(&self) -> &SqlitePool {
        &self.store.pool
    }

    fn accessor(&self, key: &DataKey) -> EncryptedAccessor<Member> {
        EncryptedAccessor::new(tables::MEMBERS, key.clone())
    }

    /// Create a member. The username must be unique in the group; the
    /// store's unique index-hash column enforces that and a duplicate
    /// surfaces as `Conflict`.
    pub async fn create(
        &self,
        req: CreateMemberRequest,
        key: &DataKey,
    ) -> Result<Member, ServiceError> {
        let password = Password::parse(&req.password)?;

        let member = Member::new(req.username, req.name);
        let username_hash = hash_index(member.username.as_bytes());
        let phash = hash_password(&password)?;

        let data = self.accessor(key).seal(&member)?;
        sqlx::query(
            "INSERT INTO members (id, idhash, phash, created, updated, data) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(member.id.as_str())
        .bind(username_hash.to_hex())
        .bind(phash.as_str())
        .bind(member.created_at.to_rfc3339())
        .bind(member.updated_at.to_rfc3339())
        .bind(data)
        .execute(self.pool())
        .await
        .map_err(StoreError::from)?;

        info!(member = %member.id, "member created");
        Ok(member)
    }

    /// Authenticate a member by username and password.
    ///
    /// Unknown username and wrong password are the same uniform error.
    pub async fn authenticate(
        &self,
        req: AuthenticateMemberRequest,
        key: &DataKey,
    ) -> Result<Member, ServiceError> {
        let username_hash = hash_index(req.username.as_bytes());
        let row: Option<MemberRow> = sqlx::query_as(
            "SELECT id, idhash, phash, created, updated, data FROM members WHERE idhash = ?",
        )
        .bind(username_hash.to_hex())
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::from)?;
        let Some(row) = row else {
            warn!("member authentication failed");
            return Err(ServiceError::Authentication);
        };

        let password = Password::unchecked(&req.password);
        if !verify_password(&password, &PasswordHash::from_phc(row.phash)) {
            warn!("member authentication failed");
            return Err(ServiceError::Authentication);
        }

        Ok(self.accessor(key).open(&row.data)?)
    }

    pub async fn get(&self, id: &EntityId, key: &DataKey) -> Result<Member, ServiceError> {
        Ok(self.accessor(key).get(self.pool(), id).await?)
    }

    pub async fn find_by_username(
        &self,
        username: &str,
        key: &DataKey,
    ) -> Result<Member, ServiceError> {
        let hash = hash_index(username.as_bytes());
        Ok(self
            .accessor(key)
            .get_by_index_hash(self.pool(), &hash)
            .await?)
    }

    pub async fn list(&self, key: &DataKey) -> Result<Vec<Member>, ServiceError> {
        Ok(self.accessor(key).list(self.pool()).await?)
    }

    /// Apply field overrides to a member. A username change moves the
    /// unique index hash with it.
    pub async fn update(
        &self,
        id: &EntityId,
        update: MemberUpdate,
        key: &DataKey,
    ) -> Result<Member, ServiceError> {
        let accessor = self.accessor(key);
        let member = accessor.get(self.pool(), id).await?;
        let username_changed = update
            .username
            .as_ref()
            .is_some_and(|u| *u != member.username);
        let member = member.with_updates(update);

        if username_changed {
            let hash = hash_index(member.username.as_bytes());
            accessor
                .set_with_index_hash(self.pool(), id, &hash, &member)
                .await?;
        } else {
            accessor.set(self.pool(), id, &member).await?;
        }

        Ok(member)
    }

    /// Rotate a member's password after verifying the old one. Only the
    /// credential hash changes; member data is untouched.
    pub async fn change_password(
        &self,
        req: ChangeMemberPasswordRequest,
    ) -> Result<(), ServiceError> {
        let new_password = Password::parse(&req.new_password)?;

        let row: Option<(String,)> = sqlx::query_as("SELECT phash FROM members WHERE id = ?")
            .bind(req.id.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(StoreError::from)?;
        let Some((phash,)) = row else {
            return Err(ServiceError::NotFound(tables::MEMBERS));
        };

        let old_password = Password::unchecked(&req.old_password);
        if !verify_password(&old_password, &PasswordHash::from_phc(phash)) {
            warn!("member password rotation rejected");
            return Err(ServiceError::Authentication);
        }

        let new_phash = hash_password(&new_password)?;
        sqlx::query("UPDATE members SET phash = ?, updated = ? WHERE id = ?")
            .bind(new_phash.as_str())
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(req.id.as_str())
            .execute(self.pool())
            .await
            .map_err(StoreError::from)?;

        info!(member = %req.id, "member password rotated");
        Ok(())
    }

    pub async fn remove(&self, id: &EntityId) -> Result<(), ServiceError> {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id.as_str())
            .execute(self.pool())
            .await
            .map_err(StoreError::from)?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(tables::MEMBERS));
        }
        Ok(())
    }
}
