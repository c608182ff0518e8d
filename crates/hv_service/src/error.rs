//! Service-level error taxonomy.
//!
//! Store errors are re-sorted into caller-facing categories here; in the
//! authentication paths the services instead collapse every sub-failure
//! into the uniform [`ServiceError::Authentication`] so a caller cannot
//! learn which check rejected the attempt.

use hv_crypto::{CryptoError, PolicyViolations};
use hv_model::ModelError;
use hv_store::StoreError;
use thiserror::Error;

use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid password: {0}")]
    Validation(#[from] PolicyViolations),

    #[error("incorrect credentials")]
    Authentication,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("session expired")]
    Expired,

    #[error("crypto failure: {0}")]
    Crypto(CryptoError),

    #[error("store failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(table) => ServiceError::NotFound(table),
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            StoreError::Crypto(inner) => ServiceError::Crypto(inner),
            other => ServiceError::Store(other),
        }
    }
}

impl From<CryptoError> for ServiceError {
    fn from(e: CryptoError) -> Self {
        ServiceError::Crypto(e)
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::ModeratorsEmpty => ServiceError::Conflict(e.to_string()),
            other => ServiceError::Store(StoreError::Codec(other)),
        }
    }
}

impl From<SessionError> for ServiceError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound => ServiceError::NotFound("session"),
            SessionError::Expired => ServiceError::Expired,
        }
    }
}
