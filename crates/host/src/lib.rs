//! Capabilities of the machine a node runs on: packages, accounts, files,
//! resources, networking and status reporting.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod archive;
mod error;
mod local;
mod status;

pub use error::{Error, Result};
pub use local::{LocalHost, LocalHostOptions, STATUS_FILE, VERSION_FILE};
pub use status::{Status, StatusLevel, status_and_log};

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Package manager readiness.
#[async_trait]
pub trait Packages: Send + Sync + 'static {
    /// Returns whether the package is installed.
    async fn is_installed(&self, package: &str) -> Result<bool>;
}

/// System accounts.
#[async_trait]
pub trait Accounts: Send + Sync + 'static {
    /// Creates a system user (and group of the same name) with the given home
    /// directory. Succeeds if the user already exists.
    async fn create_user(&self, name: &str, home: &Path) -> Result<()>;
}

/// Directory and ownership management.
#[async_trait]
pub trait FileSystem: Send + Sync + 'static {
    /// Creates the directory and any missing parents.
    async fn ensure_dir(&self, path: &Path) -> Result<()>;

    /// Changes ownership of `path` and everything below it.
    async fn chown_recursive(&self, path: &Path, owner: &str, group: &str) -> Result<()>;

    /// Removes a directory tree. Missing directories are not an error.
    async fn remove_dir_all(&self, path: &Path) -> Result<()>;
}

/// Deployment resources.
#[async_trait]
pub trait Resources: Send + Sync + 'static {
    /// Local path of the named resource, or `None` if it is not available.
    async fn fetch_resource(&self, name: &str) -> Result<Option<PathBuf>>;
}

/// Archive unpacking.
#[async_trait]
pub trait Archives: Send + Sync + 'static {
    /// Extracts a gzipped tarball into `target`, dropping the first
    /// `strip_components` path components of every entry.
    async fn extract_archive(
        &self,
        archive: &Path,
        target: &Path,
        strip_components: usize,
    ) -> Result<()>;
}

/// Network facts about this machine.
#[async_trait]
pub trait Network: Send + Sync + 'static {
    /// Address peers should use to reach this machine.
    async fn ingress_address(&self) -> Result<IpAddr>;
}

/// Operator-facing status.
#[async_trait]
pub trait StatusReporter: Send + Sync + 'static {
    /// Publishes the workload status.
    async fn report(&self, status: Status);

    /// Publishes the version of the running application.
    async fn set_application_version(&self, version: &str);
}

/// Every host capability.
pub trait Host:
    Packages + Accounts + FileSystem + Resources + Archives + Network + StatusReporter
{
}

impl<T> Host for T where
    T: Packages + Accounts + FileSystem + Resources + Archives + Network + StatusReporter
{
}
