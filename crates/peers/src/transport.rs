use std::net::IpAddr;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// A peer currently joined to the peer relation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedPeer {
    /// Deployment unit name, `<application>/<ordinal>`.
    pub unit_name: String,

    /// Address the peer published, if it published anything yet.
    #[serde(default)]
    pub address: Option<String>,
}

impl JoinedPeer {
    /// Creates a joined peer.
    pub fn new(unit_name: impl Into<String>, address: Option<&str>) -> Self {
        Self {
            unit_name: unit_name.into(),
            address: address.map(ToString::to_string),
        }
    }
}

/// Peer and client relation transport.
#[async_trait]
pub trait PeerTransport: Send + Sync + 'static {
    /// Snapshot of all currently joined peers, excluding this node.
    async fn joined_peers(&self) -> Result<Vec<JoinedPeer>>;

    /// Publishes this node's client endpoint.
    async fn publish_self(&self, address: IpAddr, port: u16) -> Result<()>;
}

#[derive(Serialize)]
struct ClientEndpoint {
    host: IpAddr,
    port: u16,
}

/// Transport backed by JSON files, written by whatever manages the relation.
#[derive(Clone, Debug)]
pub struct FileTransport {
    endpoint_file: PathBuf,
    peers_file: PathBuf,
}

impl FileTransport {
    /// Creates a transport reading `peers_file` and writing `endpoint_file`.
    pub fn new(peers_file: impl Into<PathBuf>, endpoint_file: impl Into<PathBuf>) -> Self {
        Self {
            endpoint_file: endpoint_file.into(),
            peers_file: peers_file.into(),
        }
    }
}

#[async_trait]
impl PeerTransport for FileTransport {
    async fn joined_peers(&self) -> Result<Vec<JoinedPeer>> {
        let bytes = match tokio::fs::read(&self.peers_file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} missing, no peers joined", self.peers_file.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::Io("failed to read peers file", e)),
        };

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn publish_self(&self, address: IpAddr, port: u16) -> Result<()> {
        let endpoint = serde_json::to_vec_pretty(&ClientEndpoint {
            host: address,
            port,
        })?;

        tokio::fs::write(&self.endpoint_file, endpoint)
            .await
            .map_err(|e| Error::Io("failed to write client endpoint", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_peers_file_is_empty() {
        let dir = tempdir().unwrap();
        let transport = FileTransport::new(
            dir.path().join("peers.json"),
            dir.path().join("client-endpoint.json"),
        );

        assert!(transport.joined_peers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reads_peers_and_publishes_endpoint() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("peers.json"),
            r#"[{"unit_name": "zookeeper/1", "address": "10.0.0.6"}, {"unit_name": "zookeeper/2"}]"#,
        )
        .unwrap();
        let transport = FileTransport::new(
            dir.path().join("peers.json"),
            dir.path().join("client-endpoint.json"),
        );

        assert_eq!(
            transport.joined_peers().await.unwrap(),
            vec![
                JoinedPeer::new("zookeeper/1", Some("10.0.0.6")),
                JoinedPeer::new("zookeeper/2", None),
            ]
        );

        transport
            .publish_self("10.0.0.5".parse().unwrap(), 2181)
            .await
            .unwrap();

        let endpoint: serde_json::Value = serde_json::from_slice(
            &std::fs::read(dir.path().join("client-endpoint.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(endpoint["host"], "10.0.0.5");
        assert_eq!(endpoint["port"], 2181);
    }
}
