//! Generic encrypted entity accessor.
//!
//! An accessor binds a data key, a table name, and a payload type. Every
//! write encrypts immediately before the SQL call; every read decrypts
//! immediately after the fetch; nothing decrypted is cached across calls.
//!
//! Error split on reads: a missing row is `NotFound`, a failed
//! authentication tag is `Crypto`, and an I/O failure from SQLite is
//! `Database`. Callers depend on telling these apart.

use std::marker::PhantomData;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::sqlite::SqlitePool;

use hv_crypto::{aead, DataKey, IndexHash};
use hv_model::codec;
use hv_model::EntityId;

use crate::error::StoreError;

/// A value bound as a SQL parameter in a [`Filter`] clause.
#[derive(Debug, Clone)]
pub enum Bind {
    Text(String),
    Int(i64),
}

/// Parameterized equality/range clauses over persisted metadata columns.
///
/// Clauses only ever reference plaintext columns (ids, hashes, timestamps);
/// the payload column is ciphertext and cannot be filtered in SQL.
#[derive(Debug, Default)]
pub struct Filter {
    clauses: Vec<(&'static str, Bind)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause such as `"author = ?"` with its bound value.
    pub fn clause(mut self, sql: &'static str, bind: Bind) -> Self {
        self.clauses.push((sql, bind));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Encrypt-on-write / decrypt-on-read access to one table's payloads.
pub struct EncryptedAccessor<V> {
    table: &'static str,
    aad: String,
    key: DataKey,
    _marker: PhantomData<fn() -> V>,
}

impl<V> EncryptedAccessor<V>
where
    V: Serialize + DeserializeOwned,
{
    /// Bind `key` to `table`. The AAD ties every ciphertext to the table it
    /// was written for, so payloads cannot be swapped across tables.
    pub fn new(table: &'static str, key: DataKey) -> Self {
        Self {
            table,
            aad: format!("hv.entity.v1.{table}"),
            key,
            _marker: PhantomData,
        }
    }

    /// Encode and encrypt a value into a storable ciphertext.
    pub fn seal(&self, value: &V) -> Result<Vec<u8>, StoreError> {
        let plaintext = codec::encode_payload(value)?;
        Ok(aead::encrypt(
            self.key.as_bytes(),
            &plaintext,
            self.aad.as_bytes(),
        )?)
    }

    /// Decrypt and decode a stored ciphertext.
    pub fn open(&self, data: &[u8]) -> Result<V, StoreError> {
        let plaintext = aead::decrypt(self.key.as_bytes(), data, self.aad.as_bytes())?;
        Ok(codec::decode_payload(&plaintext)?)
    }

    pub async fn get(&self, pool: &SqlitePool, id: &EntityId) -> Result<V, StoreError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?", self.table);
        let row: Option<(Vec<u8>,)> = sqlx::query_as(&sql)
            .bind(id.as_str())
            .fetch_optional(pool)
            .await?;
        let (data,) = row.ok_or(StoreError::NotFound(self.table))?;
        self.open(&data)
    }

    pub async fn get_by_index_hash(
        &self,
        pool: &SqlitePool,
        hash: &IndexHash,
    ) -> Result<V, StoreError> {
        let sql = format!("SELECT data FROM {} WHERE idhash = ?", self.table);
        let row: Option<(Vec<u8>,)> = sqlx::query_as(&sql)
            .bind(hash.to_hex())
            .fetch_optional(pool)
            .await?;
        let (data,) = row.ok_or(StoreError::NotFound(self.table))?;
        self.open(&data)
    }

    /// Fetch and decrypt every row. Eager and fully materialized.
    pub async fn list(&self, pool: &SqlitePool) -> Result<Vec<V>, StoreError> {
        let sql = format!("SELECT data FROM {}", self.table);
        let rows: Vec<(Vec<u8>,)> = sqlx::query_as(&sql).fetch_all(pool).await?;
        rows.iter().map(|(data,)| self.open(data)).collect()
    }

    /// Fetch and decrypt the rows matching every clause in `filter`.
    pub async fn list_filtered(
        &self,
        pool: &SqlitePool,
        filter: &Filter,
    ) -> Result<Vec<V>, StoreError> {
        let mut sql = format!("SELECT data FROM {}", self.table);
        if !filter.is_empty() {
            let clauses: Vec<&str> = filter.clauses.iter().map(|(c, _)| *c).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let mut query = sqlx::query_as::<_, (Vec<u8>,)>(&sql);
        for (_, bind) in &filter.clauses {
            query = match bind {
                Bind::Text(s) => query.bind(s.clone()),
                Bind::Int(i) => query.bind(*i),
            };
        }

        let rows = query.fetch_all(pool).await?;
        rows.iter().map(|(data,)| self.open(data)).collect()
    }

    /// Re-encrypt `value` over the row `id`, refreshing the updated-at
    /// mirror column. A row that does not exist is `NotFound`.
    pub async fn set(&self, pool: &SqlitePool, id: &EntityId, value: &V) -> Result<(), StoreError> {
        let data = self.seal(value)?;
        let sql = format!("UPDATE {} SET data = ?, updated = ? WHERE id = ?", self.table);
        let result = sqlx::query(&sql)
            .bind(data)
            .bind(Utc::now().to_rfc3339())
            .bind(id.as_str())
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(self.table));
        }
        Ok(())
    }

    /// Like [`set`](Self::set), also replacing the row's index hash (used
    /// when the hashed lookup field itself changed).
    pub async fn set_with_index_hash(
        &self,
        pool: &SqlitePool,
        id: &EntityId,
        hash: &IndexHash,
        value: &V,
    ) -> Result<(), StoreError> {
        let data = self.seal(value)?;
        let sql = format!(
            "UPDATE {} SET data = ?, updated = ?, idhash = ? WHERE id = ?",
            self.table
        );
        let result = sqlx::query(&sql)
            .bind(data)
            .bind(Utc::now().to_rfc3339())
            .bind(hash.to_hex())
            .bind(id.as_str())
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(self.table));
        }
        Ok(())
    }
}
