use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Error, NodeIdentity, Result};

/// One cluster member as written into membership configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerEntry {
    /// Address other members reach this member on.
    pub host: String,

    /// Cluster node id.
    pub zk_id: u32,
}

impl PeerEntry {
    /// Creates a peer entry.
    pub fn new(host: impl Into<String>, zk_id: u32) -> Self {
        Self {
            host: host.into(),
            zk_id,
        }
    }
}

impl From<&NodeIdentity> for PeerEntry {
    fn from(identity: &NodeIdentity) -> Self {
        Self::new(identity.bind_address().to_string(), identity.id())
    }
}

/// Ordered, self-inclusive list of cluster members.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerSet(Vec<PeerEntry>);

impl PeerSet {
    /// Creates a set holding only this node.
    #[must_use]
    pub fn self_only(identity: &NodeIdentity) -> Self {
        Self(vec![PeerEntry::from(identity)])
    }

    /// Creates a set from entries, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns an error if two entries share an id.
    pub fn from_entries(entries: Vec<PeerEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.zk_id) {
                return Err(Error::DuplicateId(entry.zk_id));
            }
        }

        Ok(Self(entries))
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Members in order.
    #[must_use]
    pub fn entries(&self) -> &[PeerEntry] {
        &self.0
    }

    /// Iterates over members in order.
    pub fn iter(&self) -> impl Iterator<Item = &PeerEntry> {
        self.0.iter()
    }

    /// Returns whether a member with this id is present.
    #[must_use]
    pub fn contains_id(&self, zk_id: u32) -> bool {
        self.0.iter().any(|entry| entry.zk_id == zk_id)
    }
}

impl<'a> IntoIterator for &'a PeerSet {
    type Item = &'a PeerEntry;
    type IntoIter = std::slice::Iter<'a, PeerEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = PeerSet::from_entries(vec![
            PeerEntry::new("10.0.0.5", 1),
            PeerEntry::new("10.0.0.6", 1),
        ]);

        assert!(matches!(result, Err(Error::DuplicateId(1))));
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let set = PeerSet::from_entries(vec![PeerEntry::new("10.0.0.5", 1)]).unwrap();

        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"[{"host":"10.0.0.5","zk_id":1}]"#
        );
    }
}
