use thiserror::Error;

/// Reasons an introduction is refused. Surfaced only to the connection that
/// asked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("user id {0} is already taken")]
    AlreadyExists(String),
    #[error("introduction without a user id")]
    InvalidIdentity,
}

impl RelayError {
    /// Reason string sent back in `introduce_result`.
    pub fn reason(&self) -> &'static str {
        match self {
            RelayError::AlreadyExists(_) => "exists",
            RelayError::InvalidIdentity => "invalid_id",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("encoding: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
