use std::net::SocketAddr;

use thiserror::Error;

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the service's control port.
#[derive(Debug, Error)]
pub enum Error {
    /// Could not connect to the control port.
    #[error("failed to connect to {0}: {1}")]
    Connect(SocketAddr, #[source] std::io::Error),

    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),

    /// The exchange did not finish in time.
    #[error("timed out talking to {0}")]
    Timeout(SocketAddr),
}
