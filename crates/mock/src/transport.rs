use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use ensemble_peers::{JoinedPeer, PeerTransport, Result};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct State {
    joined: Vec<JoinedPeer>,
    published: Vec<(IpAddr, u16)>,
}

/// Mock peer transport with a settable snapshot.
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    /// Creates a transport with no joined peers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the joined-peer snapshot.
    pub fn set_joined(&self, joined: Vec<JoinedPeer>) {
        self.state.lock().joined = joined;
    }

    /// Endpoints published so far.
    #[must_use]
    pub fn published(&self) -> Vec<(IpAddr, u16)> {
        self.state.lock().published.clone()
    }
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn joined_peers(&self) -> Result<Vec<JoinedPeer>> {
        Ok(self.state.lock().joined.clone())
    }

    async fn publish_self(&self, address: IpAddr, port: u16) -> Result<()> {
        self.state.lock().published.push((address, port));
        Ok(())
    }
}
