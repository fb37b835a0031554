use ensemble_host::{Status, StatusLevel};
use thiserror::Error;

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised outside handler bodies: setup, settings and the event loop.
#[derive(Debug, Error)]
pub enum Error {
    /// Host capability error.
    #[error(transparent)]
    Host(#[from] ensemble_host::Error),

    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),

    /// JSON decode error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Membership store error.
    #[error(transparent)]
    Membership(#[from] ensemble_membership::Error),

    /// Peer reconciliation error.
    #[error(transparent)]
    Peers(#[from] ensemble_peers::Error),

    /// Render error.
    #[error(transparent)]
    Render(#[from] ensemble_render::Error),

    /// Service controller error.
    #[error(transparent)]
    Service(#[from] ensemble_service::Error),

    /// Could not set global default subscriber.
    #[error("could not set global default subscriber: {0}")]
    SetTracing(#[from] tracing::dispatcher::SetGlobalDefaultError),

    /// Unknown hook name on the event stream.
    #[error("unknown hook: {0}")]
    UnknownHook(String),
}

/// Failures a handler reports to the operator instead of propagating.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Failure {
    /// The distribution resource is missing or could not be unpacked.
    #[error("TROUBLE PROVISIONING ZOOKEEPER RESOURCE, PLEASE DEBUG")]
    Provisioning,

    /// The process manager reported a failed start or restart.
    #[error("PLEASE DEBUG: Zookeeper not starting.")]
    ServiceStart,

    /// The service did not leave the initializing state in time.
    #[error("Zookeeper still initializing, will retry.")]
    ReadinessTimeout,
}

impl Failure {
    /// Status reported for this failure.
    #[must_use]
    pub fn status(self) -> Status {
        let level = match self {
            Self::Provisioning | Self::ServiceStart => StatusLevel::Blocked,
            Self::ReadinessTimeout => StatusLevel::Waiting,
        };

        Status::new(level, self.to_string())
    }
}
