//! Password policy and credential hashing
//!
//! `Password::parse` gates every password before it is allowed to protect a
//! group or a member account. All violated rules are collected and reported
//! together so a caller can fix everything in one round trip.
//!
//! `hash_password` / `verify_password` produce and check Argon2id PHC
//! strings. These gate authentication only; key material comes from the
//! separate derivation in [`crate::kdf`], with its own salt and parameters.

use std::fmt;

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Minimum number of characters in a valid password.
pub const MIN_PASSWORD_LEN: usize = 16;

/// A user-supplied password. Zeroized on drop; deliberately has no Debug or
/// Display impl.
///
/// `parse` applies the policy and is the required entry point wherever a
/// password is being *set*. `unchecked` skips the policy and exists for
/// authentication attempts, where the candidate only has to be compared,
/// not accepted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Password(String);

impl Password {
    /// Validate `raw` against the password policy.
    ///
    /// Every violated rule is collected; the error lists all of them.
    pub fn parse(raw: &str) -> Result<Self, PolicyViolations> {
        let mut count = 0usize;
        let mut has_upper = false;
        let mut has_lower = false;
        let mut has_digit = false;
        let mut has_symbol = false;

        for c in raw.chars() {
            count += 1;
            if c.is_uppercase() {
                has_upper = true;
            } else if c.is_lowercase() {
                has_lower = true;
            } else if c.is_numeric() {
                has_digit = true;
            } else if !c.is_whitespace() && !c.is_control() {
                has_symbol = true;
            }
        }

        let mut failed = Vec::new();
        if count < MIN_PASSWORD_LEN {
            failed.push(PolicyRule::MinLength);
        }
        if !has_upper {
            failed.push(PolicyRule::Uppercase);
        }
        if !has_lower {
            failed.push(PolicyRule::Lowercase);
        }
        if !has_digit {
            failed.push(PolicyRule::Digit);
        }
        if !has_symbol {
            failed.push(PolicyRule::Symbol);
        }

        if !failed.is_empty() {
            return Err(PolicyViolations(failed));
        }

        Ok(Self(raw.to_owned()))
    }

    /// Wrap a candidate password without applying the policy.
    pub fn unchecked(raw: &str) -> Self {
        Self(raw.to_owned())
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// A single password policy rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyRule {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    Symbol,
}

impl PolicyRule {
    fn requirement(self) -> String {
        match self {
            PolicyRule::MinLength => format!("at least {MIN_PASSWORD_LEN} characters"),
            PolicyRule::Uppercase => "one uppercase letter".to_owned(),
            PolicyRule::Lowercase => "one lowercase letter".to_owned(),
            PolicyRule::Digit => "one number".to_owned(),
            PolicyRule::Symbol => "one special character".to_owned(),
        }
    }
}

/// Every rule a candidate password failed, in one error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyViolations(Vec<PolicyRule>);

impl PolicyViolations {
    pub fn contains(&self, rule: PolicyRule) -> bool {
        self.0.contains(&rule)
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.0
    }
}

impl fmt::Display for PolicyViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|r| r.requirement()).collect();
        write!(f, "password must contain {}", parts.join(", "))
    }
}

impl std::error::Error for PolicyViolations {}

/// Adaptive salted credential hash in PHC string form. Safe to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a PHC string loaded from storage.
    pub fn from_phc(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Hash a password for credential checks. A fresh random salt is generated
/// per call, independent of any KDF salt.
pub fn hash_password(password: &Password) -> Result<PasswordHash, CryptoError> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
        .hash_password(password.expose(), &salt)
        .map_err(|e| CryptoError::PasswordHash(e.to_string()))?;
    Ok(PasswordHash(phc.to_string()))
}

/// Check a candidate password against a stored credential hash.
///
/// Returns false for a mismatch and for an unparseable stored hash; the
/// caller cannot tell which, which is the behavior authentication wants.
pub fn verify_password(password: &Password, hash: &PasswordHash) -> bool {
    let Ok(parsed) = PhcString::new(hash.as_str()) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.expose(), &parsed)
        .is_ok()
}
