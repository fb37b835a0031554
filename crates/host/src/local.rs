use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use ensemble_service::PortOpener;
use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::archive::extract_tar_gz;
use crate::{
    Accounts, Archives, Error, FileSystem, Network, Packages, Resources, Result, Status,
    StatusReporter,
};

/// File under the state directory holding the last reported status.
pub const STATUS_FILE: &str = "status.json";

/// File under the state directory holding the application version.
pub const VERSION_FILE: &str = "version";

const ROUTE_PROBE_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80);

/// Options for creating a new `LocalHost`.
pub struct LocalHostOptions {
    /// Address to advertise; discovered from the routing table when `None`.
    pub ingress_address: Option<IpAddr>,

    /// Directory holding deployment resources, one file per resource name.
    pub resources_dir: PathBuf,

    /// Directory receiving status and version files.
    pub state_dir: PathBuf,
}

/// Host capabilities backed by the local machine.
#[derive(Clone)]
pub struct LocalHost {
    ingress_address: Option<IpAddr>,
    opened_ports: Arc<Mutex<BTreeSet<u16>>>,
    resources_dir: PathBuf,
    state_dir: PathBuf,
}

impl LocalHost {
    /// Creates a new local host.
    #[must_use]
    pub fn new(
        LocalHostOptions {
            ingress_address,
            resources_dir,
            state_dir,
        }: LocalHostOptions,
    ) -> Self {
        Self {
            ingress_address,
            opened_ports: Arc::new(Mutex::new(BTreeSet::new())),
            resources_dir,
            state_dir,
        }
    }

    /// Ports opened so far.
    #[must_use]
    pub fn opened_ports(&self) -> Vec<u16> {
        self.opened_ports.lock().iter().copied().collect()
    }

    async fn run(command: &'static str, args: &[&str]) -> Result<std::process::Output> {
        debug!("running {} {:?}", command, args);

        Command::new(command)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::Io(command, e))
    }

    async fn write_state_file(&self, name: &str, contents: Vec<u8>) -> Result<()> {
        tokio::fs::create_dir_all(&self.state_dir)
            .await
            .map_err(|e| Error::Io("failed to create state dir", e))?;

        tokio::fs::write(self.state_dir.join(name), contents)
            .await
            .map_err(|e| Error::Io("failed to write state file", e))
    }
}

#[async_trait]
impl Packages for LocalHost {
    async fn is_installed(&self, package: &str) -> Result<bool> {
        let output = Self::run("dpkg-query", &["-W", "-f=${Status}", package]).await?;

        Ok(output.status.success()
            && String::from_utf8_lossy(&output.stdout).contains("install ok installed"))
    }
}

#[async_trait]
impl Accounts for LocalHost {
    async fn create_user(&self, name: &str, home: &Path) -> Result<()> {
        if Self::run("id", &["-u", name]).await?.status.success() {
            debug!("user {} already exists", name);
            return Ok(());
        }

        let home = home.to_string_lossy();
        let output = Self::run(
            "useradd",
            &["--system", "--user-group", "--create-home", "--home-dir", &*home, name],
        )
        .await?;

        if !output.status.success() {
            return Err(Error::NonZeroExit("useradd", output.status));
        }

        info!("created user {}", name);
        Ok(())
    }
}

#[async_trait]
impl FileSystem for LocalHost {
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| Error::Io("failed to create dir", e))
    }

    async fn chown_recursive(&self, path: &Path, owner: &str, group: &str) -> Result<()> {
        let owner_group = format!("{owner}:{group}");
        let path = path.to_string_lossy();
        let output = Self::run("chown", &["-R", owner_group.as_str(), &*path]).await?;

        if !output.status.success() {
            return Err(Error::NonZeroExit("chown", output.status));
        }

        Ok(())
    }

    async fn remove_dir_all(&self, path: &Path) -> Result<()> {
        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io("failed to remove dir", e)),
        }
    }
}

#[async_trait]
impl Resources for LocalHost {
    async fn fetch_resource(&self, name: &str) -> Result<Option<PathBuf>> {
        let path = self.resources_dir.join(name);

        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io("failed to stat resource", e)),
        }
    }
}

#[async_trait]
impl Archives for LocalHost {
    async fn extract_archive(
        &self,
        archive: &Path,
        target: &Path,
        strip_components: usize,
    ) -> Result<()> {
        let archive = archive.to_path_buf();
        let target = target.to_path_buf();

        tokio::task::spawn_blocking(move || extract_tar_gz(&archive, &target, strip_components))
            .await??;

        Ok(())
    }
}

#[async_trait]
impl Network for LocalHost {
    async fn ingress_address(&self) -> Result<IpAddr> {
        if let Some(address) = self.ingress_address {
            return Ok(address);
        }

        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .await
            .map_err(|e| Error::Io("failed to bind route probe socket", e))?;
        socket
            .connect(ROUTE_PROBE_ADDR)
            .await
            .map_err(|e| Error::Io("failed to route probe socket", e))?;

        let address = socket
            .local_addr()
            .map_err(|e| Error::Io("failed to read local address", e))?
            .ip();

        if address.is_unspecified() {
            return Err(Error::NoIngressAddress);
        }

        Ok(address)
    }
}

#[async_trait]
impl StatusReporter for LocalHost {
    async fn report(&self, status: Status) {
        let contents = match serde_json::to_vec_pretty(&status) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("failed to encode status: {}", e);
                return;
            }
        };

        if let Err(e) = self.write_state_file(STATUS_FILE, contents).await {
            warn!("failed to record status: {}", e);
        }
    }

    async fn set_application_version(&self, version: &str) {
        info!("application version {}", version);

        if let Err(e) = self
            .write_state_file(VERSION_FILE, version.as_bytes().to_vec())
            .await
        {
            warn!("failed to record application version: {}", e);
        }
    }
}

#[async_trait]
impl PortOpener for LocalHost {
    async fn open_port(&self, port: u16) -> ensemble_service::Result<()> {
        if let Ok(open_port) = which::which("open-port") {
            let status = Command::new(open_port)
                .arg(format!("{port}/tcp"))
                .status()
                .await
                .map_err(|e| ensemble_service::Error::OpenPort(port, e.to_string()))?;

            if !status.success() {
                return Err(ensemble_service::Error::OpenPort(
                    port,
                    format!("open-port exited with {status}"),
                ));
            }
        } else {
            debug!("open-port not available, recording port {} only", port);
        }

        self.opened_ports.lock().insert(port);
        info!("opened port {}", port);

        Ok(())
    }
}
