use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("a conversation must keep at least one moderator")]
    ModeratorsEmpty,

    #[error("unsupported payload version {0}")]
    UnsupportedVersion(u8),

    #[error("payload too short to carry a version byte")]
    Truncated,

    #[error("payload serialisation failed: {0}")]
    Serialisation(#[from] serde_json::Error),
}
