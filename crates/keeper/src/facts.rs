//! Names of every fact the keeper reasons about.

use ensemble_facts::Fact;

/// Java runtime package is installed.
pub const APT_DEPS: Fact = Fact::from_static("zk.apt.deps.available");

/// Service user and home directory exist.
pub const USER: Fact = Fact::from_static("zk.user.available");

/// Log, data and config directories exist and are owned by the service user.
pub const DIRS: Fact = Fact::from_static("zk.dirs.available");

/// Data directory storage is attached.
pub const DATADIR_STORAGE: Fact = Fact::from_static("zk.datadir.storage.available");

/// Transaction log storage is attached.
pub const DATALOGDIR_STORAGE: Fact = Fact::from_static("zk.datalogdir.storage.available");

/// Attached storage is prepared.
pub const STORAGE: Fact = Fact::from_static("zk.storage.available");

/// The service distribution is unpacked into the home directory.
pub const RESOURCE: Fact = Fact::from_static("zk.resource.available");

/// Node identity and bind address are recorded.
pub const BIND_ADDRESS: Fact = Fact::from_static("zk.bind.address.available");

/// Initial configuration is rendered.
pub const INIT_CONFIG: Fact = Fact::from_static("zk.init.config.available");

/// The systemd unit is installed and enabled.
pub const SYSTEMD: Fact = Fact::from_static("zk.systemd.available");

/// Initialisation finished.
pub const INIT_COMPLETE: Fact = Fact::from_static("zk.init.complete");

/// The dynamic membership config matches the stored peer set.
pub const DYNAMIC_CONFIG: Fact = Fact::from_static("zk.dynamic.config.available");

/// The stored peer set is rendered and the service was started or restarted
/// on it; only readiness is still outstanding.
pub const DYNAMIC_CONFIG_APPLIED: Fact = Fact::from_static("zk.dynamic.config.applied");

/// The service was started at least once.
pub const INIT_STARTED: Fact = Fact::from_static("zk.init.started");

/// The service was started by the membership convergence path.
pub const INIT_START_AVAILABLE: Fact = Fact::from_static("zk.init.start.available");

/// The application version is published.
pub const VERSION: Fact = Fact::from_static("zk.version.available");

/// This unit is the deployment leader.
pub const LEADER: Fact = Fact::from_static("leadership.is_leader");

/// The peer relation changed.
pub const PEERS_AVAILABLE: Fact = Fact::from_static("endpoint.zk-peers.available");

/// A client relation joined.
pub const CLIENT_AVAILABLE: Fact = Fact::from_static("endpoint.zookeeper.available");

/// Fact set once `package` is installed.
#[must_use]
pub fn package_installed(package: &str) -> Fact {
    Fact::new(format!("apt.installed.{package}"))
}
