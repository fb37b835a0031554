//! Durable record of this node's identity and the full known peer set.
//!
//! The membership store is the single source of truth for rendering cluster
//! membership configuration. Every write replaces a whole value; the peer set
//! in particular is always rebuilt and written in full.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod identity;
mod peer_set;

pub use error::{Error, Result};
pub use identity::{NodeIdentity, id_from_ordinal, ordinal_from_unit_name};
pub use peer_set::{PeerEntry, PeerSet};

use std::net::IpAddr;

use bytes::Bytes;
use ensemble_store::Store;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Key holding the bind address.
pub const BIND_ADDRESS_KEY: &str = "bind_address";

/// Key holding this node's id.
pub const NODE_ID_KEY: &str = "zk_id";

/// Key holding the ordered peer set.
pub const PEER_SET_KEY: &str = "zk_nodes";

/// Key holding the number of joined peers seen by the last reconciliation,
/// counting peers that have not published an address yet.
pub const NUM_PEERS_KEY: &str = "num_peers";

/// Key holding the number of peers the deployment is expected to have.
pub const EXPECTED_PEER_COUNT_KEY: &str = "expected_peer_count";

/// Typed access to membership state held in a [`Store`].
#[derive(Clone, Debug)]
pub struct MembershipStore<S>
where
    S: Store,
{
    store: S,
}

impl<S> MembershipStore<S>
where
    S: Store,
{
    /// Creates a membership store over the given key-value store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Records this node's identity and resets the peer set to this node
    /// alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn acquire_identity(&self, identity: &NodeIdentity) -> Result<()> {
        self.put_json(BIND_ADDRESS_KEY, &identity.bind_address())
            .await?;
        self.put_json(PEER_SET_KEY, &PeerSet::self_only(identity))
            .await?;
        self.put_json(NODE_ID_KEY, &identity.id()).await?;

        debug!(
            id = identity.id(),
            bind_address = %identity.bind_address(),
            "identity recorded"
        );

        Ok(())
    }

    /// The recorded bind address, if acquired.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the value cannot be decoded.
    pub async fn bind_address(&self) -> Result<Option<IpAddr>> {
        self.get_json(BIND_ADDRESS_KEY).await
    }

    /// The recorded node id, if acquired.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the value cannot be decoded.
    pub async fn node_id(&self) -> Result<Option<u32>> {
        self.get_json(NODE_ID_KEY).await
    }

    /// The recorded identity, if both bind address and id were acquired.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or a value cannot be decoded.
    pub async fn identity(&self) -> Result<Option<NodeIdentity>> {
        let bind_address = self.bind_address().await?;
        let node_id = self.node_id().await?;

        Ok(match (bind_address, node_id) {
            (Some(bind_address), Some(id)) if id > 0 => {
                Some(NodeIdentity::new(id - 1, bind_address))
            }
            _ => None,
        })
    }

    /// The current peer set; empty if none was recorded yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the value cannot be decoded.
    pub async fn peer_set(&self) -> Result<PeerSet> {
        Ok(self.get_json(PEER_SET_KEY).await?.unwrap_or_default())
    }

    /// Replaces the peer set and the joined-peer count in full.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn replace_peer_set(&self, peer_set: &PeerSet, num_peers: usize) -> Result<()> {
        self.put_json(NUM_PEERS_KEY, &num_peers).await?;
        self.put_json(PEER_SET_KEY, peer_set).await?;

        debug!(members = peer_set.len(), num_peers, "peer set replaced");

        Ok(())
    }

    /// Number of joined peers seen by the last reconciliation.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the value cannot be decoded.
    pub async fn num_peers(&self) -> Result<Option<usize>> {
        self.get_json(NUM_PEERS_KEY).await
    }

    /// Number of peers (excluding this node) the deployment is expected to
    /// have, if known.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the value cannot be decoded.
    pub async fn expected_peer_count(&self) -> Result<Option<u32>> {
        self.get_json(EXPECTED_PEER_COUNT_KEY).await
    }

    /// Records the expected peer count, or removes it when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn set_expected_peer_count(&self, expected: Option<u32>) -> Result<()> {
        match expected {
            Some(count) => self.put_json(EXPECTED_PEER_COUNT_KEY, &count).await,
            None => self
                .store
                .del(EXPECTED_PEER_COUNT_KEY)
                .await
                .map_err(|e| Error::Store(Box::new(e))),
        }
    }

    async fn get_json<T>(&self, key: &'static str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let bytes = self
            .store
            .get(key)
            .await
            .map_err(|e| Error::Store(Box::new(e)))?;

        bytes
            .map(|bytes| serde_json::from_slice(&bytes).map_err(|e| Error::Decode(key, e)))
            .transpose()
    }

    async fn put_json<T>(&self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let bytes = serde_json::to_vec(value).map_err(|e| Error::Encode(key, e))?;

        self.store
            .put(key, Bytes::from(bytes))
            .await
            .map_err(|e| Error::Store(Box::new(e)))
    }
}
