//! hv_crypto — Haven cryptographic primitives
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited Rust crates.
//! - Zeroize all secret material on drop.
//! - Secret-holding types have no Debug or Display impl.
//!
//! # Module layout
//! - `aead`     — XChaCha20-Poly1305 encrypt/decrypt helpers
//! - `kdf`      — Argon2id derivation of a pass key from (password, salt)
//! - `key`      — the group data key guard type
//! - `envelope` — wrapping/unwrapping the data key under a pass key
//! - `hash`     — BLAKE3 index hashes for equality lookup over encrypted rows
//! - `password` — password policy validation and credential hashing
//! - `error`    — unified error type

pub mod aead;
pub mod envelope;
pub mod error;
pub mod hash;
pub mod kdf;
pub mod key;
pub mod password;

pub use error::CryptoError;
pub use hash::{hash_index, IndexHash};
pub use kdf::{derive_key, DerivedKey, KdfParams, Salt, KEY_LEN, SALT_LEN};
pub use key::DataKey;
pub use password::{
    hash_password, verify_password, Password, PasswordHash, PolicyRule, PolicyViolations,
};
