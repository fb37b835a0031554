//! External events that drive convergence.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Storage mounts the node waits for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    /// Snapshot storage.
    DataDir,

    /// Transaction log storage.
    DataLogDir,
}

/// An externally observed event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A package finished installing.
    PackageInstalled(String),

    /// A storage mount was attached.
    StorageAttached(StorageKind),

    /// The peer relation changed.
    PeersChanged,

    /// A client relation joined.
    ClientRelationJoined,

    /// This unit became the leader.
    LeaderElected,

    /// This unit stopped being the leader.
    LeadershipLost,

    /// The deployment was upgraded.
    Upgrade,

    /// Periodic re-evaluation.
    Tick,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PackageInstalled(package) => write!(f, "package-installed {package}"),
            Self::StorageAttached(StorageKind::DataDir) => f.write_str("datadir-storage-attached"),
            Self::StorageAttached(StorageKind::DataLogDir) => {
                f.write_str("datalogdir-storage-attached")
            }
            Self::PeersChanged => f.write_str("peers-changed"),
            Self::ClientRelationJoined => f.write_str("client-joined"),
            Self::LeaderElected => f.write_str("leader-elected"),
            Self::LeadershipLost => f.write_str("leader-lost"),
            Self::Upgrade => f.write_str("upgrade"),
            Self::Tick => f.write_str("tick"),
        }
    }
}

impl FromStr for Event {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let hook = words.next().unwrap_or_default();

        let event = match (hook, words.next()) {
            ("package-installed", Some(package)) => Self::PackageInstalled(package.to_string()),
            ("datadir-storage-attached", None) => Self::StorageAttached(StorageKind::DataDir),
            ("datalogdir-storage-attached", None) => Self::StorageAttached(StorageKind::DataLogDir),
            ("peers-changed", None) => Self::PeersChanged,
            ("client-joined", None) => Self::ClientRelationJoined,
            ("leader-elected", None) => Self::LeaderElected,
            ("leader-lost", None) => Self::LeadershipLost,
            ("upgrade", None) => Self::Upgrade,
            ("tick", None) => Self::Tick,
            _ => return Err(Error::UnknownHook(line.trim().to_string())),
        };

        if words.next().is_some() {
            return Err(Error::UnknownHook(line.trim().to_string()));
        }

        Ok(event)
    }
}
