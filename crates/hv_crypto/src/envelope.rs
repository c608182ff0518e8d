//! Envelope encryption for the group data key.
//!
//! The data key encrypts all of a group's entity payloads; the pass key
//! derived from the password encrypts only the data key. Rotating the
//! password therefore re-encrypts 72 bytes, not the data set: unwrap with
//! the old pass key, re-wrap the same data key under the new one.
//!
//! Wrapped form: the standard AEAD wire format (nonce || ct+tag) under a
//! dedicated key-wrap AAD domain, so a wrapped key can never be confused
//! with an entity payload ciphertext.

use crate::aead;
use crate::error::CryptoError;
use crate::kdf::DerivedKey;
use crate::key::DataKey;

/// AAD domain for key wrapping. Distinct from every entity table domain.
const KEY_WRAP_AAD: &[u8] = b"hv.keywrap.v1";

/// Encrypt a data key under a pass key for storage.
pub fn wrap_data_key(wrapping: &DerivedKey, data_key: &DataKey) -> Result<Vec<u8>, CryptoError> {
    aead::encrypt(wrapping.as_bytes(), data_key.as_bytes(), KEY_WRAP_AAD)
}

/// Decrypt a stored wrapped key. Fails with `AeadDecrypt` when the pass key
/// is wrong or the stored bytes were tampered with.
pub fn unwrap_data_key(wrapping: &DerivedKey, wrapped: &[u8]) -> Result<DataKey, CryptoError> {
    let plaintext = aead::decrypt(wrapping.as_bytes(), wrapped, KEY_WRAP_AAD)?;
    DataKey::from_bytes(&plaintext)
}

/// Move a wrapped key from an old pass key to a new one. The data key
/// itself is unchanged; only its envelope is replaced.
pub fn rewrap_data_key(
    old: &DerivedKey,
    new: &DerivedKey,
    wrapped: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let data_key = unwrap_data_key(old, wrapped)?;
    wrap_data_key(new, &data_key)
}
