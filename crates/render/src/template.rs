use std::net::IpAddr;
use std::path::PathBuf;

use ensemble_membership::PeerSet;
use ensemble_service::ServicePorts;

static ZOO_CFG_TEMPLATE: &str = include_str!("../templates/zoo.cfg");
static SERVER_LINE_TEMPLATE: &str = include_str!("../templates/server.line");
static MYID_TEMPLATE: &str = include_str!("../templates/myid");
static ENV_SCRIPT_TEMPLATE: &str = include_str!("../templates/zookeeper-env.sh");
static LOG4J_TEMPLATE: &str = include_str!("../templates/log4j.properties");
static SYSTEMD_UNIT_TEMPLATE: &str = include_str!("../templates/zookeeper.service");

/// Values for the main server configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZooCfgContext {
    /// Address clients connect to.
    pub bind_address: IpAddr,

    /// Snapshot directory.
    pub data_dir: PathBuf,

    /// Transaction log directory.
    pub datalog_dir: PathBuf,

    /// Dynamic membership file.
    pub dynamic_config_file: PathBuf,

    /// Whitelisted four-letter commands.
    pub four_letter_words: String,

    /// Whether a single server may run in standalone mode.
    pub standalone_enabled: bool,
}

/// Values for the systemd unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemdUnitContext {
    /// User and group the service runs as.
    pub user: String,

    /// Installation directory.
    pub home: PathBuf,

    /// Server control script.
    pub server_sh: PathBuf,

    /// Main configuration file.
    pub config_file: PathBuf,
}

/// A configuration artifact together with the values it is rendered from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Template {
    /// `zoo.cfg`.
    ZooCfg(ZooCfgContext),

    /// Dynamic membership file: one `server.N` line per peer.
    DynamicConfig {
        /// Members to list.
        peers: PeerSet,

        /// Ports every member listens on.
        ports: ServicePorts,
    },

    /// `myid` in the data directory.
    Myid {
        /// This node's id.
        zk_id: u32,
    },

    /// `zookeeper-env.sh`.
    EnvScript {
        /// Log directory.
        log_dir: PathBuf,
    },

    /// `log4j.properties`.
    Log4j {
        /// Log directory.
        log_dir: PathBuf,
    },

    /// systemd unit file.
    SystemdUnit(SystemdUnitContext),
}

impl Template {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ZooCfg(_) => "zoo.cfg",
            Self::DynamicConfig { .. } => "zookeeper.cfg.dynamic",
            Self::Myid { .. } => "myid",
            Self::EnvScript { .. } => "zookeeper-env.sh",
            Self::Log4j { .. } => "log4j.properties",
            Self::SystemdUnit(_) => "zookeeper.service",
        }
    }

    /// Renders the artifact contents.
    #[must_use]
    #[allow(clippy::literal_string_with_formatting_args)]
    pub fn render(&self) -> String {
        match self {
            Self::ZooCfg(context) => ZOO_CFG_TEMPLATE
                .replace("{data_dir}", &context.data_dir.to_string_lossy())
                .replace("{datalog_dir}", &context.datalog_dir.to_string_lossy())
                .replace("{bind_address}", &context.bind_address.to_string())
                .replace("{four_letter_words}", &context.four_letter_words)
                .replace("{standalone_enabled}", &context.standalone_enabled.to_string())
                .replace(
                    "{dynamic_config_file}",
                    &context.dynamic_config_file.to_string_lossy(),
                ),
            Self::DynamicConfig { peers, ports } => peers
                .iter()
                .map(|peer| {
                    SERVER_LINE_TEMPLATE
                        .replace("{zk_id}", &peer.zk_id.to_string())
                        .replace("{host}", &peer.host)
                        .replace("{peer_port}", &ports.peer.to_string())
                        .replace("{election_port}", &ports.election.to_string())
                        .replace("{client_port}", &ports.client.to_string())
                })
                .collect(),
            Self::Myid { zk_id } => MYID_TEMPLATE.replace("{zk_id}", &zk_id.to_string()),
            Self::EnvScript { log_dir } => {
                ENV_SCRIPT_TEMPLATE.replace("{log_dir}", &log_dir.to_string_lossy())
            }
            Self::Log4j { log_dir } => {
                LOG4J_TEMPLATE.replace("{log_dir}", &log_dir.to_string_lossy())
            }
            Self::SystemdUnit(context) => SYSTEMD_UNIT_TEMPLATE
                .replace("{user}", &context.user)
                .replace("{home}", &context.home.to_string_lossy())
                .replace("{server_sh}", &context.server_sh.to_string_lossy())
                .replace("{config_file}", &context.config_file.to_string_lossy()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ensemble_membership::PeerEntry;

    #[test]
    fn test_dynamic_config_one_line_per_peer() {
        let peers = PeerSet::from_entries(vec![
            PeerEntry::new("10.0.0.6", 2),
            PeerEntry::new("10.0.0.7", 3),
            PeerEntry::new("10.0.0.5", 1),
        ])
        .unwrap();

        let rendered = Template::DynamicConfig {
            peers,
            ports: ServicePorts::default(),
        }
        .render();

        assert_eq!(
            rendered,
            "server.2=10.0.0.6:2888:3888;2181\n\
             server.3=10.0.0.7:2888:3888;2181\n\
             server.1=10.0.0.5:2888:3888;2181\n"
        );
    }

    #[test]
    fn test_empty_dynamic_config() {
        let rendered = Template::DynamicConfig {
            peers: PeerSet::default(),
            ports: ServicePorts::default(),
        }
        .render();

        assert!(rendered.is_empty());
    }

    #[test]
    fn test_zoo_cfg() {
        let rendered = Template::ZooCfg(ZooCfgContext {
            bind_address: "10.0.0.5".parse().unwrap(),
            data_dir: PathBuf::from("/srv/zookeeper_data"),
            datalog_dir: PathBuf::from("/srv/zookeeper_datalog"),
            dynamic_config_file: PathBuf::from("/srv/zookeeper_config/zookeeper.cfg.dynamic"),
            four_letter_words: "srvr".to_string(),
            standalone_enabled: false,
        })
        .render();

        assert!(rendered.contains("dataDir=/srv/zookeeper_data\n"));
        assert!(rendered.contains("clientPortAddress=10.0.0.5\n"));
        assert!(rendered.contains("4lw.commands.whitelist=srvr\n"));
        assert!(rendered.contains("standaloneEnabled=false\n"));
        assert!(rendered.contains(
            "dynamicConfigFile=/srv/zookeeper_config/zookeeper.cfg.dynamic\n"
        ));
        assert!(!rendered.contains('{'));
    }

    #[test]
    fn test_myid() {
        assert_eq!(Template::Myid { zk_id: 3 }.render(), "3\n");
    }

    #[test]
    fn test_log4j_keeps_pattern_braces() {
        let rendered = Template::Log4j {
            log_dir: PathBuf::from("/var/log/zookeeper"),
        }
        .render();

        assert!(rendered.contains("zookeeper.log.dir=/var/log/zookeeper\n"));
        assert!(rendered.contains("%d{ISO8601}"));
    }
}
