use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Default port serving clients and the control protocol.
pub const DEFAULT_CLIENT_PORT: u16 = 2181;

/// Default port followers use to replicate from the leader.
pub const DEFAULT_PEER_PORT: u16 = 2888;

/// Default port used for leader election.
pub const DEFAULT_ELECTION_PORT: u16 = 3888;

/// The three network ports of a cluster member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServicePorts {
    /// Client and control port.
    pub client: u16,

    /// Peer replication port.
    pub peer: u16,

    /// Leader election port.
    pub election: u16,
}

impl Default for ServicePorts {
    fn default() -> Self {
        Self {
            client: DEFAULT_CLIENT_PORT,
            peer: DEFAULT_PEER_PORT,
            election: DEFAULT_ELECTION_PORT,
        }
    }
}

impl ServicePorts {
    /// All ports, client first.
    #[must_use]
    pub const fn all(&self) -> [u16; 3] {
        [self.client, self.peer, self.election]
    }
}

/// Exposes ports of this node to the rest of the deployment.
#[async_trait]
pub trait PortOpener: Send + Sync + 'static {
    /// Opens a TCP port.
    async fn open_port(&self, port: u16) -> Result<()>;
}
