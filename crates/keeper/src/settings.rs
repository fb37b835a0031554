//! Node settings, loaded from a JSON file with every field defaulted.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ensemble_probe::{DEFAULT_POLL_ATTEMPTS, PollOptions};
use ensemble_service::ServicePorts;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// When membership convergence may start or restart the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GatingPolicy {
    /// The leader starts first on its own; other nodes start or restart on
    /// every membership change.
    LeaderFirst,

    /// Nobody starts or restarts until every expected peer has joined.
    #[default]
    QuorumComplete,
}

/// Filesystem layout of an installation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Layout {
    /// Where the distribution is unpacked.
    pub home_dir: PathBuf,

    /// Snapshot directory.
    pub data_dir: PathBuf,

    /// Transaction log directory.
    pub datalog_dir: PathBuf,

    /// Directory holding the dynamic membership file.
    pub dynamic_config_dir: PathBuf,

    /// Log directory.
    pub log_dir: PathBuf,

    /// Directory receiving the systemd unit.
    pub systemd_dir: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            home_dir: PathBuf::from("/opt/zookeeper"),
            data_dir: PathBuf::from("/srv/zookeeper_data"),
            datalog_dir: PathBuf::from("/srv/zookeeper_datalog"),
            dynamic_config_dir: PathBuf::from("/srv/zookeeper_config"),
            log_dir: PathBuf::from("/var/log/zookeeper"),
            systemd_dir: PathBuf::from("/etc/systemd/system"),
        }
    }
}

impl Layout {
    /// Trace log directory.
    #[must_use]
    pub fn trace_dir(&self) -> PathBuf {
        self.log_dir.join("trace")
    }

    /// Server control script.
    #[must_use]
    pub fn server_sh(&self) -> PathBuf {
        self.home_dir.join("bin").join("zkServer.sh")
    }

    /// Configuration directory inside the distribution.
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.home_dir.join("conf")
    }

    /// `zookeeper-env.sh`.
    #[must_use]
    pub fn env_file(&self) -> PathBuf {
        self.config_dir().join("zookeeper-env.sh")
    }

    /// `zoo.cfg`.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join("zoo.cfg")
    }

    /// `log4j.properties`.
    #[must_use]
    pub fn log4j_file(&self) -> PathBuf {
        self.config_dir().join("log4j.properties")
    }

    /// Dynamic membership file.
    #[must_use]
    pub fn dynamic_config_file(&self) -> PathBuf {
        self.dynamic_config_dir.join("zookeeper.cfg.dynamic")
    }

    /// `myid`.
    #[must_use]
    pub fn myid_file(&self) -> PathBuf {
        self.data_dir.join("myid")
    }

    /// systemd unit for `service_name`.
    #[must_use]
    pub fn systemd_unit_file(&self, service_name: &str) -> PathBuf {
        self.systemd_dir.join(format!("{service_name}.service"))
    }
}

/// Node settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Whitelisted four-letter commands.
    pub four_letter_words: String,

    /// Whether a single server may run standalone.
    pub standalone_enabled: bool,

    /// Start and restart gating.
    pub gating_policy: GatingPolicy,

    /// Number of peers (this node excluded) the deployment will have.
    pub expected_peer_count: Option<u32>,

    /// Java runtime package.
    pub java_package: String,

    /// Name of the distribution resource.
    pub resource_name: String,

    /// Name of the systemd service.
    pub service_name: String,

    /// Service user and group.
    pub user: String,

    /// Network ports.
    pub ports: ServicePorts,

    /// Maximum readiness probes per poll.
    pub poll_attempts: u32,

    /// Pause between readiness probes, in milliseconds.
    pub poll_interval_ms: u64,

    /// Filesystem layout.
    pub layout: Layout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            four_letter_words: "srvr".to_string(),
            standalone_enabled: false,
            gating_policy: GatingPolicy::default(),
            expected_peer_count: None,
            java_package: "openjdk-8-jre-headless".to_string(),
            resource_name: "zookeeper-tarball".to_string(),
            service_name: "zookeeper".to_string(),
            user: "zookeeper".to_string(),
            ports: ServicePorts::default(),
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval_ms: 1000,
            layout: Layout::default(),
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read(path).map_err(|e| Error::Io("failed to read settings file", e))?;

        Ok(serde_json::from_slice(&contents)?)
    }

    /// Readiness poll bounds.
    #[must_use]
    pub const fn poll_options(&self) -> PollOptions {
        PollOptions {
            attempts: self.poll_attempts,
            interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let settings: Settings = serde_json::from_str("{}").unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.gating_policy, GatingPolicy::QuorumComplete);
        assert_eq!(settings.ports.client, 2181);
        assert_eq!(
            settings.layout.dynamic_config_file(),
            PathBuf::from("/srv/zookeeper_config/zookeeper.cfg.dynamic")
        );
    }

    #[test]
    fn test_kebab_case_fields() {
        let settings: Settings = serde_json::from_str(
            r#"{
                "gating-policy": "leader-first",
                "expected-peer-count": 2,
                "four-letter-words": "srvr,mntr",
                "ports": { "client": 2182 },
                "layout": { "home-dir": "/tmp/zk" }
            }"#,
        )
        .unwrap();

        assert_eq!(settings.gating_policy, GatingPolicy::LeaderFirst);
        assert_eq!(settings.expected_peer_count, Some(2));
        assert_eq!(settings.four_letter_words, "srvr,mntr");
        assert_eq!(settings.ports.client, 2182);
        assert_eq!(settings.ports.peer, 2888);
        assert_eq!(settings.layout.server_sh(), PathBuf::from("/tmp/zk/bin/zkServer.sh"));
        assert_eq!(settings.layout.data_dir, PathBuf::from("/srv/zookeeper_data"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "user": "zk", "poll-attempts": 3 }"#).unwrap();

        let settings = Settings::from_file(&path).unwrap();

        assert_eq!(settings.user, "zk");
        assert_eq!(settings.poll_options().attempts, 3);

        assert!(matches!(
            Settings::from_file(&dir.path().join("missing.json")),
            Err(Error::Io(..))
        ));
    }
}
