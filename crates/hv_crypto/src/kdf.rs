//! Pass-key derivation
//!
//! `derive_key` turns a group password and a stored salt into the 32-byte
//! pass key that wraps the group's data key. Argon2id, with the cost knobs
//! exposed through [`KdfParams`] so deployments can tune them.
//!
//! Derivation is deterministic: the same (password, salt, params) always
//! produces the same key, which is what lets a returning client unwrap the
//! stored data key.

use argon2::{Argon2, Params, Version};
use rand::RngCore;
use zeroize::ZeroizeOnDrop;

use crate::error::CryptoError;
use crate::password::Password;

/// Length in bytes of a derived pass key.
pub const KEY_LEN: usize = 32;

/// Length in bytes of the salt mixed into derivation. Stored in clear next
/// to the wrapped key.
pub const SALT_LEN: usize = 32;

/// Random salt input to key derivation. Not secret; persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Generate a fresh random salt. Call once per group creation or
    /// password rotation; store the result next to the wrapped key.
    pub fn generate() -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::rngs::OsRng.fill_bytes(&mut salt);
        Self(salt)
    }

    /// Reconstruct a salt loaded from storage, checking its length.
    pub fn from_bytes(val: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; SALT_LEN] = val.try_into().map_err(|_| CryptoError::InvalidSalt {
            expected: SALT_LEN,
            actual: val.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Argon2id cost parameters for pass-key derivation.
///
/// The default profile is deliberately expensive: deriving a key should be
/// slow enough to frustrate offline guessing while staying tolerable for an
/// interactive login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub m_cost_kib: u32,
    /// Number of passes over memory.
    pub t_cost: u32,
    /// Degree of parallelism.
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost_kib: 64 * 1024, // 64 MiB
            t_cost: 3,
            p_cost: 1,
        }
    }
}

impl KdfParams {
    /// Minimal-cost parameters for tests. Never use outside a test: a key
    /// derived this cheaply offers no brute-force resistance.
    pub fn insecure_fast() -> Self {
        Self {
            m_cost_kib: 8,
            t_cost: 1,
            p_cost: 1,
        }
    }

    fn to_argon2(self) -> Result<Params, CryptoError> {
        Params::new(self.m_cost_kib, self.t_cost, self.p_cost, Some(KEY_LEN))
            .map_err(|e| CryptoError::KeyDerivation(e.to_string()))
    }
}

/// 32-byte pass key derived from a group password. Zeroized on drop.
///
/// Never persisted; it exists only long enough to wrap or unwrap a data key,
/// or inside a session capability.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

/// Derive a pass key from a password and salt with the given cost profile.
pub fn derive_key(
    password: &Password,
    salt: &Salt,
    params: &KdfParams,
) -> Result<DerivedKey, CryptoError> {
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params.to_argon2()?);
    let mut output = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password.expose(), salt.as_bytes(), &mut output)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(DerivedKey(output))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pw(raw: &str) -> Password {
        Password::unchecked(raw)
    }

    #[test]
    fn derivation_is_deterministic() {
        let salt = Salt::generate();
        let params = KdfParams::insecure_fast();
        let a = derive_key(&pw("correct horse battery"), &salt, &params).unwrap();
        let b = derive_key(&pw("correct horse battery"), &salt, &params).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_salts_give_different_keys() {
        let params = KdfParams::insecure_fast();
        let s1 = Salt::generate();
        let s2 = Salt::generate();
        assert_ne!(s1, s2);
        let a = derive_key(&pw("correct horse battery"), &s1, &params).unwrap();
        let b = derive_key(&pw("correct horse battery"), &s2, &params).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_passwords_give_different_keys() {
        let salt = Salt::generate();
        let params = KdfParams::insecure_fast();
        let a = derive_key(&pw("password one"), &salt, &params).unwrap();
        let b = derive_key(&pw("password two"), &salt, &params).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn salt_roundtrips_through_bytes() {
        let salt = Salt::generate();
        let loaded = Salt::from_bytes(salt.as_bytes()).unwrap();
        assert_eq!(salt, loaded);
    }

    #[test]
    fn salt_rejects_wrong_length() {
        assert!(matches!(
            Salt::from_bytes(&[0u8; 16]),
            Err(CryptoError::InvalidSalt { expected: 32, actual: 16 })
        ));
    }
}
