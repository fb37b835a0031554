use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by host capabilities.
#[derive(Debug, Error)]
pub enum Error {
    /// Archive entry would land outside the target directory.
    #[error("archive entry escapes target directory: {0:?}")]
    ArchiveEntryOutsideTarget(PathBuf),

    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),

    /// Blocking task failed.
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),

    /// JSON encode error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// No usable ingress address.
    #[error("no ingress address available")]
    NoIngressAddress,

    /// Command exited with a failure status.
    #[error("{0} unexpectedly exited with non-zero code: {1}")]
    NonZeroExit(&'static str, ExitStatus),
}
