//! hv_store — Haven's encrypted entity store
//!
//! # Encryption strategy
//! SQLite does NOT natively encrypt. Haven uses application-level
//! encryption:
//! - Entity payloads are stored as XChaCha20-Poly1305 ciphertext BLOBs,
//!   encrypted under the group's data key with the owning table bound in
//!   as AAD.
//! - Lookup fields (group handle, username) are stored as unkeyed BLAKE3
//!   index hashes so uniqueness and equality queries work in plain SQL.
//! - Timestamps and foreign keys stay plaintext for filtering and
//!   referential actions.
//!
//! Nothing decrypted is ever cached: every read round-trips through SQLite
//! and decrypts on the way out; every write encrypts on the way in.
//!
//! # Migration
//! SQLx migrations in `migrations/` are run when the store is opened.

pub mod accessor;
pub mod db;
pub mod entity;
pub mod error;
pub mod rows;

pub use accessor::{Bind, EncryptedAccessor, Filter};
pub use db::Store;
pub use entity::GroupEntity;
pub use error::StoreError;

/// Logical table names bound into accessor AAD domains.
pub mod tables {
    pub const GROUPS: &str = "groups";
    pub const MEMBERS: &str = "members";
    pub const CONVERSATIONS: &str = "conversations";
    pub const MESSAGES: &str = "messages";
}
