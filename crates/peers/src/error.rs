use thiserror::Error;

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reconciling peers.
#[derive(Debug, Error)]
pub enum Error {
    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),

    /// JSON encode or decode error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Membership store error.
    #[error(transparent)]
    Membership(#[from] ensemble_membership::Error),

    /// This node has no identity yet.
    #[error("node identity not acquired")]
    MissingIdentity,
}
