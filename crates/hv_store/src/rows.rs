//! Database row models mapped to and from SQL rows.
//!
//! Timestamps are RFC 3339 text throughout; in UTC that format compares
//! lexicographically in timestamp order, which is what the range filters
//! on `messages.created` rely on. The `data` column is always AEAD
//! ciphertext.
//!
//! Only the rows with columns beyond (id, timestamps, data) get a struct;
//! conversation and message payloads flow through the generic accessor as
//! bare `data` blobs.

use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct GroupRow {
    pub id: String,
    /// Hex index hash of the group handle.
    pub idhash: String,
    /// Pass-key derivation salt (32 bytes, clear).
    pub psalt: Vec<u8>,
    /// Credential hash (PHC string).
    pub phash: String,
    /// Wrapped data key.
    pub ekey: Vec<u8>,
    pub created: String,
    pub updated: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MemberRow {
    pub id: String,
    /// Hex index hash of the username.
    pub idhash: String,
    /// Credential hash (PHC string).
    pub phash: String,
    pub created: String,
    pub updated: String,
    pub data: Vec<u8>,
}
