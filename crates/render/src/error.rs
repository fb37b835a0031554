use thiserror::Error;

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while rendering configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Host capability failed.
    #[error(transparent)]
    Host(#[from] ensemble_host::Error),

    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),
}
