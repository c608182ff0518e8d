//! Versioned entity payload framing.
//!
//! Payload layout: [ version (1 byte) | JSON document ]
//!
//! The version byte gates deserialisation so stored payloads can evolve
//! without guessing at their format. Everything after it is a plain serde
//! document; the bytes produced here are what the store encrypts, and the
//! bytes it decrypts are what land here.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::ModelError;

/// Current payload format version.
pub const PAYLOAD_V1: u8 = 1;

/// Serialize a value into a versioned payload frame.
pub fn encode_payload<T: Serialize>(value: &T) -> Result<Vec<u8>, ModelError> {
    let json = serde_json::to_vec(value)?;
    let mut out = Vec::with_capacity(1 + json.len());
    out.push(PAYLOAD_V1);
    out.extend_from_slice(&json);
    Ok(out)
}

/// Deserialize a value from a versioned payload frame.
pub fn decode_payload<T: DeserializeOwned>(data: &[u8]) -> Result<T, ModelError> {
    let (&version, body) = data.split_first().ok_or(ModelError::Truncated)?;
    if version != PAYLOAD_V1 {
        return Err(ModelError::UnsupportedVersion(version));
    }
    Ok(serde_json::from_slice(body)?)
}
