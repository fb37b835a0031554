use std::process::ExitStatus;

use thiserror::Error;

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),

    /// The blocking systemctl task panicked or was cancelled.
    #[error("systemctl task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// A systemctl command exited unsuccessfully.
    #[error("{0} unexpectedly exited with non-zero code: {1}")]
    NonZeroExit(&'static str, ExitStatus),

    /// Opening a port failed.
    #[error("failed to open port {0}: {1}")]
    OpenPort(u16, String),
}
