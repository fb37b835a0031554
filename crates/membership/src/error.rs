use thiserror::Error;

/// Result type for membership operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Two cluster members derived the same id.
    #[error("duplicate node id {0} in peer set")]
    DuplicateId(u32),

    /// A stored value could not be decoded.
    #[error("failed to decode `{0}`: {1}")]
    Decode(&'static str, #[source] serde_json::Error),

    /// A value could not be encoded for storage.
    #[error("failed to encode `{0}`: {1}")]
    Encode(&'static str, #[source] serde_json::Error),

    /// Unit name is not of the form `<application>/<ordinal>`.
    #[error("invalid unit name: {0}")]
    InvalidUnitName(String),

    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}
