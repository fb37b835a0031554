//! Classifies the running service as initializing or serving by querying its
//! control port, and bounds how long callers wait for it.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod client;
mod error;
mod mode;
mod poll;

pub use client::{
    DEFAULT_COMMAND, DEFAULT_TIMEOUT, FourLetterWordClient, FourLetterWordClientOptions,
    MAX_RESPONSE_BYTES,
};
pub use error::{Error, Result};
pub use mode::{Mode, UNKNOWN_VERSION, parse_mode, parse_version};
pub use poll::{
    DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL, PollOptions, PollProgress, Readiness, poll_ready,
};

use std::net::SocketAddr;

use async_trait::async_trait;

/// Queries the service over its control protocol.
#[async_trait]
pub trait ReadinessProber: Send + Sync + 'static {
    /// Current mode; any failure to get an answer counts as initializing.
    async fn probe_mode(&self, addr: SocketAddr) -> Mode;

    /// Reported version, truncated to 15 characters, or [`UNKNOWN_VERSION`].
    async fn probe_version(&self, addr: SocketAddr) -> String;
}
