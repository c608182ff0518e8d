use hv_crypto::CryptoError;
use hv_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Record not found in {0}")]
    NotFound(&'static str),

    #[error("Unique value conflict: {0}")]
    Conflict(String),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Payload codec error: {0}")]
    Codec(#[from] ModelError),

    #[error("Migration error: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_owned())
            }
            _ => StoreError::Database(e),
        }
    }
}
