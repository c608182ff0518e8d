//! Group lifecycle: create, authenticate, read, update, rotate password.

use sqlx::sqlite::SqlitePool;
use tracing::{info, warn};

use hv_crypto::{
    derive_key, envelope, hash_index, hash_password, verify_password, DataKey, KdfParams,
    Password, PasswordHash, Salt,
};
use hv_model::{Group, GroupUpdate};
use hv_store::{entity, tables, EncryptedAccessor, GroupEntity, Store};

use crate::error::ServiceError;

/// Request to create the deployment's group.
///
/// Carries a raw password, so no Debug impl.
#[derive(Clone)]
pub struct CreateGroupRequest {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub password: String,
}

/// Request to authenticate against the group. No Debug impl.
#[derive(Clone)]
pub struct AuthenticateGroupRequest {
    pub handle: String,
    pub password: String,
}

/// Request to rotate the group password. No Debug impl.
#[derive(Clone)]
pub struct ChangeGroupPasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

pub struct GroupService {
    store: Store,
    kdf: KdfParams,
}

impl GroupService {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            kdf: KdfParams::default(),
        }
    }

    /// Override the KDF cost profile (tests, constrained deployments).
    pub fn with_kdf_params(store: Store, kdf: KdfParams) -> Self {
        Self { store, kdf }
    }

    fn pool(&self) -> &SqlitePool {
        &self.store.pool
    }

    fn accessor(&self, key: &DataKey) -> EncryptedAccessor<Group> {
        EncryptedAccessor::new(tables::GROUPS, key.clone())
    }

    /// Create the group. A deployment holds exactly one; a second create
    /// is a conflict.
    ///
    /// The password is policy-checked, then used to derive the pass key
    /// that wraps a freshly generated data key. Neither key is persisted
    /// bare.
    pub async fn create(&self, req: CreateGroupRequest) -> Result<Group, ServiceError> {
        let password = Password::parse(&req.password)?;

        if entity::group_exists(self.pool()).await? {
            return Err(ServiceError::Conflict("group already initialised".into()));
        }

        info!("generating data encryption key for new group");
        let data_key = DataKey::generate();

        let group = Group::new(req.handle, req.name, req.description);
        let sealed = GroupEntity::seal(&group, &password, &data_key, &self.kdf)?;
        entity::insert_group(self.pool(), &sealed).await?;

        info!(group = %group.id, "group created");
        Ok(group)
    }

    /// Authenticate with the group handle and password, returning the
    /// unwrapped data key capability.
    ///
    /// Every failure mode collapses into the same `Authentication` error:
    /// an unknown handle, a credential-hash mismatch, and a wrapped-key
    /// envelope that will not open are indistinguishable to the caller.
    pub async fn authenticate(
        &self,
        req: AuthenticateGroupRequest,
    ) -> Result<DataKey, ServiceError> {
        let handle_hash = hash_index(req.handle.as_bytes());
        let Some(row) = entity::fetch_group_by_hash(self.pool(), &handle_hash).await? else {
            warn!("group authentication failed");
            return Err(ServiceError::Authentication);
        };

        let password = Password::unchecked(&req.password);
        let stored = PasswordHash::from_phc(row.phash);
        if !verify_password(&password, &stored) {
            warn!("group authentication failed");
            return Err(ServiceError::Authentication);
        }

        let salt = Salt::from_bytes(&row.psalt)?;
        let pass_key = derive_key(&password, &salt, &self.kdf)?;
        let data_key = envelope::unwrap_data_key(&pass_key, &row.ekey)
            .map_err(|_| ServiceError::Authentication)?;

        info!("group authentication succeeded");
        Ok(data_key)
    }

    /// Decrypt and return the group metadata.
    pub async fn get(&self, key: &DataKey) -> Result<Group, ServiceError> {
        let row = entity::fetch_group(self.pool())
            .await?
            .ok_or(ServiceError::NotFound(tables::GROUPS))?;
        Ok(self.accessor(key).open(&row.data)?)
    }

    /// Apply field overrides to the group, re-encrypt, and persist. The
    /// handle's index hash is recomputed when the handle changed.
    pub async fn update(
        &self,
        update: GroupUpdate,
        key: &DataKey,
    ) -> Result<Group, ServiceError> {
        let accessor = self.accessor(key);
        let row = entity::fetch_group(self.pool())
            .await?
            .ok_or(ServiceError::NotFound(tables::GROUPS))?;

        let group: Group = accessor.open(&row.data)?;
        let group = group.with_updates(update);

        let idhash = hash_index(group.handle.as_bytes());
        let data = accessor.seal(&group)?;
        entity::update_group_payload(self.pool(), &group.id, &idhash, group.updated_at, &data)
            .await?;

        Ok(group)
    }

    /// Rotate the group password.
    ///
    /// Re-authenticates with the old password to recover the data key,
    /// then wraps that same key under a pass key derived from the new
    /// password with a fresh salt. Entity ciphertexts are untouched, so
    /// the cost does not grow with the data set.
    pub async fn change_password(
        &self,
        req: ChangeGroupPasswordRequest,
    ) -> Result<(), ServiceError> {
        let new_password = Password::parse(&req.new_password)?;

        let row = entity::fetch_group(self.pool())
            .await?
            .ok_or(ServiceError::NotFound(tables::GROUPS))?;

        let old_password = Password::unchecked(&req.old_password);
        let stored = PasswordHash::from_phc(row.phash.clone());
        if !verify_password(&old_password, &stored) {
            warn!("password rotation rejected");
            return Err(ServiceError::Authentication);
        }

        let old_salt = Salt::from_bytes(&row.psalt)?;
        let old_pass_key = derive_key(&old_password, &old_salt, &self.kdf)?;
        let data_key = envelope::unwrap_data_key(&old_pass_key, &row.ekey)
            .map_err(|_| ServiceError::Authentication)?;

        let new_salt = Salt::generate();
        let new_phash = hash_password(&new_password)?;
        let new_pass_key = derive_key(&new_password, &new_salt, &self.kdf)?;
        let ekey = envelope::wrap_data_key(&new_pass_key, &data_key)?;

        // Bump the group's updated stamp inside the encrypted payload as
        // well as in the row.
        let accessor = self.accessor(&data_key);
        let group: Group = accessor.open(&row.data)?;
        let group = group.with_updates(GroupUpdate::default());
        let data = accessor.seal(&group)?;

        entity::update_group_security(
            self.pool(),
            &group.id,
            &new_salt,
            &new_phash,
            &ekey,
            group.updated_at,
            &data,
        )
        .await?;

        info!(group = %group.id, "group password rotated");
        Ok(())
    }
}
