//! BLAKE3 index hashes
//!
//! An index hash is the digest of a plaintext lookup field (group handle,
//! member username) stored next to the encrypted payload. Rows can then be
//! found and de-duplicated by plain SQL equality without decrypting
//! anything.
//!
//! The hash is unkeyed: equal plaintexts map to equal hashes across every
//! row and every group. That is what makes O(1) uniqueness checks work, and
//! it also means an observer can tell that two rows share the same
//! underlying value.

use crate::error::CryptoError;

/// 32-byte digest of a plaintext lookup field. Stored as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexHash([u8; 32]);

/// Hash a plaintext field for storage in an index column.
pub fn hash_index(plaintext: &[u8]) -> IndexHash {
    IndexHash(blake3::hash(plaintext).into())
}

impl IndexHash {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKey("index hash must be 32 bytes".into()))?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}
