use std::process::ExitStatus;

use async_trait::async_trait;
use systemctl::SystemCtl;
use tokio::process::Command;
use tracing::{debug, info};

use crate::{Error, Result, ServiceController};

/// Controls a service through systemd.
#[derive(Clone, Debug)]
pub struct SystemdService {
    unit: String,
}

impl SystemdService {
    /// Creates a controller for the given unit (for example `zookeeper`).
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }

    async fn systemctl<T, F>(&self, action: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&SystemCtl, &str) -> std::io::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        debug!(unit = %self.unit, action, "running systemctl");

        let unit = self.unit.clone();
        tokio::task::spawn_blocking(move || f(&SystemCtl::default(), &unit))
            .await?
            .map_err(|e| Error::Io(action, e))
    }

    async fn systemctl_command(&self, action: &'static str, args: &[&str]) -> Result<ExitStatus> {
        debug!(unit = %self.unit, action, "running systemctl command");

        Command::new("systemctl")
            .args(args)
            .status()
            .await
            .map_err(|e| Error::Io(action, e))
    }
}

#[async_trait]
impl ServiceController for SystemdService {
    fn service_name(&self) -> &str {
        &self.unit
    }

    async fn start(&self) -> Result<bool> {
        let status = self
            .systemctl("systemctl start", |ctl, unit| ctl.start(unit))
            .await?;

        Ok(status.success())
    }

    async fn stop(&self) -> Result<()> {
        let status = self
            .systemctl("systemctl stop", |ctl, unit| ctl.stop(unit))
            .await?;

        if !status.success() {
            return Err(Error::NonZeroExit("systemctl stop", status));
        }

        info!(unit = %self.unit, "service stopped");
        Ok(())
    }

    async fn restart(&self) -> Result<()> {
        let status = self
            .systemctl("systemctl restart", |ctl, unit| ctl.restart(unit))
            .await?;

        if !status.success() {
            return Err(Error::NonZeroExit("systemctl restart", status));
        }

        info!(unit = %self.unit, "service restarted");
        Ok(())
    }

    async fn is_running(&self) -> bool {
        self.systemctl("systemctl is-active", |ctl, unit| ctl.is_active(unit))
            .await
            .unwrap_or(false)
    }

    async fn enable(&self) -> Result<()> {
        let status = self
            .systemctl_command("systemctl daemon-reload", &["daemon-reload"])
            .await?;
        if !status.success() {
            return Err(Error::NonZeroExit("systemctl daemon-reload", status));
        }

        let status = self
            .systemctl_command("systemctl enable", &["enable", &self.unit])
            .await?;
        if !status.success() {
            return Err(Error::NonZeroExit("systemctl enable", status));
        }

        info!(unit = %self.unit, "service enabled");
        Ok(())
    }
}
