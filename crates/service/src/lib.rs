//! Start, stop, restart and query the external clustered service process.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod ports;
mod systemd;

pub use error::{Error, Result};
pub use ports::{
    DEFAULT_CLIENT_PORT, DEFAULT_ELECTION_PORT, DEFAULT_PEER_PORT, PortOpener, ServicePorts,
};
pub use systemd::SystemdService;

use async_trait::async_trait;
use tracing::{info, warn};

/// Controls the lifecycle of the external service process.
///
/// Prefer [`ServiceController::restart`] when the process is already running;
/// a cold [`start_service`] is only for first bring-up.
#[async_trait]
pub trait ServiceController: Send + Sync + 'static {
    /// Name of the controlled service.
    fn service_name(&self) -> &str;

    /// Starts the service. Returns `false` if the process manager reports
    /// that the start failed.
    async fn start(&self) -> Result<bool>;

    /// Stops the service.
    async fn stop(&self) -> Result<()>;

    /// Restarts the service, starting it if it is not running.
    async fn restart(&self) -> Result<()>;

    /// Returns whether the service is running.
    async fn is_running(&self) -> bool;

    /// Makes the service start on boot.
    async fn enable(&self) -> Result<()>;
}

/// Cold-starts the service and, only if that succeeded, opens its client,
/// peer and election ports.
///
/// # Errors
///
/// Returns an error if the start command could not be run or a port could not
/// be opened.
pub async fn start_service(
    controller: &dyn ServiceController,
    opener: &dyn PortOpener,
    ports: &ServicePorts,
) -> Result<bool> {
    if !controller.start().await? {
        warn!(service = controller.service_name(), "service failed to start");
        return Ok(false);
    }

    for port in ports.all() {
        opener.open_port(port).await?;
    }

    info!(service = controller.service_name(), "service started");
    Ok(true)
}
