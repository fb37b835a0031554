use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::{Error, Mode, ReadinessProber, Result, parse_mode, parse_version};

/// Default control command.
pub const DEFAULT_COMMAND: &str = "srvr";

/// Largest response read from the control port; the rest is discarded.
pub const MAX_RESPONSE_BYTES: u64 = 64 * 1024;

/// Default bound on one control exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Options for creating a new `FourLetterWordClient`.
pub struct FourLetterWordClientOptions {
    /// The four-letter command to send.
    pub command: String,

    /// Bound on a full connect/write/read exchange.
    pub timeout: Duration,
}

impl Default for FourLetterWordClientOptions {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Talks to the service's control port with four-letter commands.
#[derive(Clone, Debug)]
pub struct FourLetterWordClient {
    command: String,
    timeout: Duration,
}

impl FourLetterWordClient {
    /// Creates a new client.
    #[must_use]
    pub fn new(
        FourLetterWordClientOptions { command, timeout }: FourLetterWordClientOptions,
    ) -> Self {
        Self { command, timeout }
    }

    /// Sends the command, closes the write half, and reads until the server
    /// closes the connection or [`MAX_RESPONSE_BYTES`] have been read.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or the exchange times out.
    pub async fn send(&self, addr: SocketAddr) -> Result<String> {
        tokio::time::timeout(self.timeout, self.exchange(addr))
            .await
            .map_err(|_| Error::Timeout(addr))?
    }

    async fn exchange(&self, addr: SocketAddr) -> Result<String> {
        let mut stream = TcpStream::connect(addr)
            .await
            .map_err(|e| Error::Connect(addr, e))?;

        stream
            .write_all(self.command.as_bytes())
            .await
            .map_err(|e| Error::Io("failed to write command", e))?;
        stream
            .shutdown()
            .await
            .map_err(|e| Error::Io("failed to shut down write half", e))?;

        let mut response = Vec::new();
        (&mut stream)
            .take(MAX_RESPONSE_BYTES)
            .read_to_end(&mut response)
            .await
            .map_err(|e| Error::Io("failed to read response", e))?;

        Ok(String::from_utf8_lossy(&response).into_owned())
    }
}

impl Default for FourLetterWordClient {
    fn default() -> Self {
        Self::new(FourLetterWordClientOptions::default())
    }
}

#[async_trait]
impl ReadinessProber for FourLetterWordClient {
    async fn probe_mode(&self, addr: SocketAddr) -> Mode {
        match self.send(addr).await {
            Ok(response) => parse_mode(&response),
            Err(e) => {
                debug!("mode probe of {} failed: {}", addr, e);
                Mode::Initializing
            }
        }
    }

    async fn probe_version(&self, addr: SocketAddr) -> String {
        match self.send(addr).await {
            Ok(response) => parse_version(&response),
            Err(e) => {
                debug!("version probe of {} failed: {}", addr, e);
                parse_version("")
            }
        }
    }
}
