//! The group data key: the only key that ever encrypts domain data.

use rand::RngCore;
use zeroize::ZeroizeOnDrop;

use crate::error::CryptoError;
use crate::kdf::KEY_LEN;

/// 32-byte symmetric key generated once per group. Zeroized on drop.
///
/// A `DataKey` is never written to storage unwrapped; the persisted form is
/// always the AEAD ciphertext produced by [`crate::envelope::wrap_data_key`].
/// Clones are independent copies and are zeroized separately.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DataKey([u8; KEY_LEN]);

impl DataKey {
    /// Generate a fresh random data key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut key);
        Self(key)
    }

    /// Reconstruct a data key from unwrapped bytes, checking the length.
    pub fn from_bytes(val: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; KEY_LEN] = val
            .try_into()
            .map_err(|_| CryptoError::InvalidKey(format!("expected {KEY_LEN} bytes")))?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}
