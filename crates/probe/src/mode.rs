use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Reported when the version line cannot be found in a response.
pub const UNKNOWN_VERSION: &str = "SOMETHING IS WRONG PLEASE DEBUG";

const MAX_VERSION_LEN: usize = 15;

static MODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Mode: (\S+)").expect("Invalid mode regex pattern"));

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Zookeeper version: (\S+)").expect("Invalid version regex pattern")
});

/// Role the service reports over its control port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Not answering yet, or answering without a role.
    Initializing,

    /// Serving with the given role (`leader`, `follower`, `standalone`, ...).
    Serving(String),
}

impl Mode {
    /// Returns whether the service reported a role.
    #[must_use]
    pub const fn is_serving(&self) -> bool {
        matches!(self, Self::Serving(_))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => f.write_str("initializing"),
            Self::Serving(role) => f.write_str(role),
        }
    }
}

/// Extracts the mode from a `srvr` response.
#[must_use]
pub fn parse_mode(response: &str) -> Mode {
    MODE_REGEX
        .captures(response)
        .and_then(|captures| captures.get(1))
        .map_or(Mode::Initializing, |role| {
            Mode::Serving(role.as_str().to_string())
        })
}

/// Extracts the version from a `srvr` response, truncated to 15 characters.
#[must_use]
pub fn parse_version(response: &str) -> String {
    VERSION_REGEX
        .captures(response)
        .and_then(|captures| captures.get(1))
        .map_or_else(
            || UNKNOWN_VERSION.to_string(),
            |version| version.as_str().chars().take(MAX_VERSION_LEN).collect(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRVR: &str = "Zookeeper version: 3.5.9-83df9301aa5c2a5d284a9940177808c01bc35cef, built on 01/06/2021 19:49 GMT\n\
        Latency min/avg/max: 0/0.0/0\n\
        Received: 3\n\
        Sent: 2\n\
        Connections: 1\n\
        Outstanding: 0\n\
        Zxid: 0x100000000\n\
        Mode: follower\n\
        Node count: 5\n";

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode(SRVR), Mode::Serving("follower".to_string()));
        assert_eq!(
            parse_mode("This ZooKeeper instance is not currently serving requests\n"),
            Mode::Initializing
        );
        assert_eq!(parse_mode(""), Mode::Initializing);
    }

    #[test]
    fn test_parse_version_truncates() {
        assert_eq!(parse_version(SRVR), "3.5.9-83df9301a");
        assert_eq!(parse_version("Zookeeper version: 3.4.14\n"), "3.4.14");
    }

    #[test]
    fn test_parse_version_missing() {
        assert_eq!(parse_version("Mode: leader\n"), UNKNOWN_VERSION);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Initializing.to_string(), "initializing");
        assert_eq!(Mode::Serving("leader".to_string()).to_string(), "leader");
    }
}
