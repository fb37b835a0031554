use std::collections::{BTreeSet, HashMap, HashSet};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use ensemble_host::{
    Accounts, Archives, Error, FileSystem, Network, Packages, Resources, Result, Status,
    StatusReporter,
};
use ensemble_service::PortOpener;
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct State {
    chowned: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
    extracted: Vec<(PathBuf, PathBuf, usize)>,
    fail_extract: bool,
    opened_ports: BTreeSet<u16>,
    packages: HashSet<String>,
    removed: Vec<PathBuf>,
    resources: HashMap<String, PathBuf>,
    statuses: Vec<Status>,
    users: Vec<(String, PathBuf)>,
    version: Option<String>,
}

/// Mock host that records every call.
#[derive(Clone, Debug)]
pub struct MockHost {
    ingress_address: IpAddr,
    state: Arc<Mutex<State>>,
}

impl MockHost {
    /// Creates a host advertising `ingress_address`.
    #[must_use]
    pub fn new(ingress_address: IpAddr) -> Self {
        Self {
            ingress_address,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Marks a package as installed.
    pub fn install_package(&self, package: &str) {
        self.state.lock().packages.insert(package.to_string());
    }

    /// Makes a resource available.
    pub fn add_resource(&self, name: &str) {
        self.state
            .lock()
            .resources
            .insert(name.to_string(), PathBuf::from("/resources").join(name));
    }

    /// Makes a resource unavailable.
    pub fn remove_resource(&self, name: &str) {
        self.state.lock().resources.remove(name);
    }

    /// Makes archive extraction fail.
    pub fn fail_extract(&self, fail: bool) {
        self.state.lock().fail_extract = fail;
    }

    /// Every reported status, oldest first.
    #[must_use]
    pub fn statuses(&self) -> Vec<Status> {
        self.state.lock().statuses.clone()
    }

    /// The most recent status.
    #[must_use]
    pub fn last_status(&self) -> Option<Status> {
        self.state.lock().statuses.last().cloned()
    }

    /// The application version, if set.
    #[must_use]
    pub fn version(&self) -> Option<String> {
        self.state.lock().version.clone()
    }

    /// Users created.
    #[must_use]
    pub fn users(&self) -> Vec<(String, PathBuf)> {
        self.state.lock().users.clone()
    }

    /// Directories ensured, in call order.
    #[must_use]
    pub fn dirs(&self) -> Vec<PathBuf> {
        self.state.lock().dirs.clone()
    }

    /// Paths chowned, in call order.
    #[must_use]
    pub fn chowned(&self) -> Vec<PathBuf> {
        self.state.lock().chowned.clone()
    }

    /// Directories removed, in call order.
    #[must_use]
    pub fn removed(&self) -> Vec<PathBuf> {
        self.state.lock().removed.clone()
    }

    /// Archive extractions: archive, target and stripped components.
    #[must_use]
    pub fn extracted(&self) -> Vec<(PathBuf, PathBuf, usize)> {
        self.state.lock().extracted.clone()
    }

    /// Ports opened.
    #[must_use]
    pub fn opened_ports(&self) -> Vec<u16> {
        self.state.lock().opened_ports.iter().copied().collect()
    }
}

#[async_trait]
impl Packages for MockHost {
    async fn is_installed(&self, package: &str) -> Result<bool> {
        Ok(self.state.lock().packages.contains(package))
    }
}

#[async_trait]
impl Accounts for MockHost {
    async fn create_user(&self, name: &str, home: &Path) -> Result<()> {
        let mut state = self.state.lock();
        if !state.users.iter().any(|(user, _)| user == name) {
            state.users.push((name.to_string(), home.to_path_buf()));
        }
        Ok(())
    }
}

#[async_trait]
impl FileSystem for MockHost {
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        self.state.lock().dirs.push(path.to_path_buf());
        Ok(())
    }

    async fn chown_recursive(&self, path: &Path, _owner: &str, _group: &str) -> Result<()> {
        self.state.lock().chowned.push(path.to_path_buf());
        Ok(())
    }

    async fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.state.lock().removed.push(path.to_path_buf());
        Ok(())
    }
}

#[async_trait]
impl Resources for MockHost {
    async fn fetch_resource(&self, name: &str) -> Result<Option<PathBuf>> {
        Ok(self.state.lock().resources.get(name).cloned())
    }
}

#[async_trait]
impl Archives for MockHost {
    async fn extract_archive(
        &self,
        archive: &Path,
        target: &Path,
        strip_components: usize,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_extract {
            return Err(Error::Io(
                "failed to open archive",
                std::io::Error::other("corrupt archive"),
            ));
        }

        state
            .extracted
            .push((archive.to_path_buf(), target.to_path_buf(), strip_components));
        Ok(())
    }
}

#[async_trait]
impl Network for MockHost {
    async fn ingress_address(&self) -> Result<IpAddr> {
        Ok(self.ingress_address)
    }
}

#[async_trait]
impl StatusReporter for MockHost {
    async fn report(&self, status: Status) {
        self.state.lock().statuses.push(status);
    }

    async fn set_application_version(&self, version: &str) {
        self.state.lock().version = Some(version.to_string());
    }
}

#[async_trait]
impl PortOpener for MockHost {
    async fn open_port(&self, port: u16) -> ensemble_service::Result<()> {
        self.state.lock().opened_ports.insert(port);
        Ok(())
    }
}
