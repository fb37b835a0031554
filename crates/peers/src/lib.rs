//! Rebuilds the cluster peer set from the peer relation.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod transport;

pub use error::{Error, Result};
pub use transport::{FileTransport, JoinedPeer, PeerTransport};

use std::sync::Arc;

use ensemble_membership::{
    MembershipStore, PeerEntry, PeerSet, id_from_ordinal, ordinal_from_unit_name,
};
use ensemble_store::Store;
use tracing::{debug, info, warn};

/// Result of a reconciliation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// The stored peer set was replaced with this one.
    Updated(PeerSet),

    /// No joined peer had address data; nothing was written.
    Ignored,
}

/// Builds the peer set from a joined-peer snapshot.
///
/// Peers without address data are skipped. The remaining peers are ordered by
/// id and this node is appended last. Returns `None` when no peer has address
/// data.
///
/// # Errors
///
/// Returns an error if a unit name carries no ordinal or two members share an
/// id.
pub fn rebuild_peer_set(joined: &[JoinedPeer], this_node: &PeerEntry) -> Result<Option<PeerSet>> {
    let mut entries = Vec::with_capacity(joined.len() + 1);

    for peer in joined {
        let Some(address) = &peer.address else {
            debug!("{} has no address data yet, skipping", peer.unit_name);
            continue;
        };

        let ordinal = ordinal_from_unit_name(&peer.unit_name)?;
        entries.push(PeerEntry::new(address.clone(), id_from_ordinal(ordinal)));
    }

    if entries.is_empty() {
        return Ok(None);
    }

    entries.sort_by_key(|entry| entry.zk_id);
    entries.push(this_node.clone());

    Ok(Some(PeerSet::from_entries(entries)?))
}

/// Keeps the stored peer set in line with the peer relation.
#[derive(Clone)]
pub struct PeerReconciler {
    transport: Arc<dyn PeerTransport>,
}

impl PeerReconciler {
    /// Creates a reconciler reading from `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn PeerTransport>) -> Self {
        Self { transport }
    }

    /// Reads the joined peers and, if any published address data, replaces
    /// the stored peer set in full.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport or the store fails, this node has no
    /// identity yet, or the snapshot yields conflicting ids.
    pub async fn reconcile<S>(&self, membership: &MembershipStore<S>) -> Result<Reconciliation>
    where
        S: Store,
    {
        let identity = membership.identity().await?.ok_or(Error::MissingIdentity)?;
        let joined = self.transport.joined_peers().await?;

        let Some(peer_set) = rebuild_peer_set(&joined, &PeerEntry::from(&identity))? else {
            warn!(
                "{} joined peers but none published an address, keeping peer set",
                joined.len()
            );
            return Ok(Reconciliation::Ignored);
        };

        membership.replace_peer_set(&peer_set, joined.len()).await?;

        info!("peer set rebuilt with {} members", peer_set.len());

        Ok(Reconciliation::Updated(peer_set))
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn PeerTransport> {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::IpAddr;

    use async_trait::async_trait;
    use ensemble_membership::NodeIdentity;
    use ensemble_store_memory::MemoryStore;

    struct Snapshot(Vec<JoinedPeer>);

    #[async_trait]
    impl PeerTransport for Snapshot {
        async fn joined_peers(&self) -> Result<Vec<JoinedPeer>> {
            Ok(self.0.clone())
        }

        async fn publish_self(&self, _address: IpAddr, _port: u16) -> Result<()> {
            Ok(())
        }
    }

    fn this_node() -> PeerEntry {
        PeerEntry::new("10.0.0.5", 1)
    }

    async fn membership() -> MembershipStore<MemoryStore> {
        let membership = MembershipStore::new(MemoryStore::new());
        membership
            .acquire_identity(&NodeIdentity::new(0, "10.0.0.5".parse().unwrap()))
            .await
            .unwrap();
        membership
    }

    #[test]
    fn test_rebuild_orders_by_id_with_self_last() {
        let joined = vec![
            JoinedPeer::new("zookeeper/2", Some("10.0.0.7")),
            JoinedPeer::new("zookeeper/1", Some("10.0.0.6")),
        ];

        let peer_set = rebuild_peer_set(&joined, &this_node()).unwrap().unwrap();

        assert_eq!(
            peer_set.entries(),
            &[
                PeerEntry::new("10.0.0.6", 2),
                PeerEntry::new("10.0.0.7", 3),
                PeerEntry::new("10.0.0.5", 1),
            ]
        );
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let joined = vec![
            JoinedPeer::new("zookeeper/2", Some("10.0.0.7")),
            JoinedPeer::new("zookeeper/3", None),
            JoinedPeer::new("zookeeper/1", Some("10.0.0.6")),
        ];

        let first = rebuild_peer_set(&joined, &this_node()).unwrap();
        let second = rebuild_peer_set(&joined, &this_node()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.unwrap().len(), 3);
    }

    #[test]
    fn test_rebuild_without_address_data() {
        let joined = vec![JoinedPeer::new("zookeeper/1", None)];

        assert_eq!(rebuild_peer_set(&joined, &this_node()).unwrap(), None);
        assert_eq!(rebuild_peer_set(&[], &this_node()).unwrap(), None);
    }

    #[test]
    fn test_rebuild_rejects_duplicate_ids() {
        let joined = vec![JoinedPeer::new("zookeeper/0", Some("10.0.0.9"))];

        assert!(rebuild_peer_set(&joined, &this_node()).is_err());
    }

    #[test]
    fn test_rebuild_rejects_ordinal_without_id() {
        let joined = vec![JoinedPeer::new("zookeeper/4294967295", Some("10.0.0.9"))];

        assert!(matches!(
            rebuild_peer_set(&joined, &this_node()),
            Err(Error::Membership(_))
        ));
    }

    #[tokio::test]
    async fn test_num_peers_counts_every_joined_peer() {
        let membership = membership().await;
        let reconciler = PeerReconciler::new(Arc::new(Snapshot(vec![
            JoinedPeer::new("zookeeper/1", Some("10.0.0.6")),
            JoinedPeer::new("zookeeper/2", None),
        ])));

        reconciler.reconcile(&membership).await.unwrap();

        assert_eq!(membership.peer_set().await.unwrap().len(), 2);
        assert_eq!(membership.num_peers().await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_reconcile_replaces_stored_set() {
        let membership = membership().await;
        let reconciler = PeerReconciler::new(Arc::new(Snapshot(vec![
            JoinedPeer::new("zookeeper/1", Some("10.0.0.6")),
            JoinedPeer::new("zookeeper/2", Some("10.0.0.7")),
        ])));

        let result = reconciler.reconcile(&membership).await.unwrap();

        let Reconciliation::Updated(peer_set) = result else {
            panic!("expected update");
        };
        assert_eq!(membership.peer_set().await.unwrap(), peer_set);
        assert_eq!(membership.num_peers().await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_empty_report_leaves_stored_set_unchanged() {
        let membership = membership().await;
        PeerReconciler::new(Arc::new(Snapshot(vec![JoinedPeer::new(
            "zookeeper/1",
            Some("10.0.0.6"),
        )])))
        .reconcile(&membership)
        .await
        .unwrap();
        let before = membership.peer_set().await.unwrap();

        let result = PeerReconciler::new(Arc::new(Snapshot(vec![JoinedPeer::new(
            "zookeeper/1",
            None,
        )])))
        .reconcile(&membership)
        .await
        .unwrap();

        assert_eq!(result, Reconciliation::Ignored);
        assert_eq!(membership.peer_set().await.unwrap(), before);
        assert_eq!(before.len(), 2);
    }

    #[tokio::test]
    async fn test_reconcile_without_identity() {
        let membership = MembershipStore::new(MemoryStore::new());
        let reconciler = PeerReconciler::new(Arc::new(Snapshot(Vec::new())));

        assert!(matches!(
            reconciler.reconcile(&membership).await,
            Err(Error::MissingIdentity)
        ));
    }
}
