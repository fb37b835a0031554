use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Converts a deployment ordinal to a cluster node id.
///
/// Ids start at 1 because the coordination service reserves 0. Ordinals
/// parsed by [`ordinal_from_unit_name`] are always below `u32::MAX`.
#[must_use]
pub const fn id_from_ordinal(ordinal: u32) -> u32 {
    ordinal.saturating_add(1)
}

/// Extracts the ordinal from a unit name such as `zookeeper/2`.
///
/// # Errors
///
/// Returns an error if the name has no `/`, the suffix is not a number, or
/// the ordinal has no node id (`u32::MAX`).
pub fn ordinal_from_unit_name(unit_name: &str) -> Result<u32> {
    unit_name
        .rsplit_once('/')
        .and_then(|(application, ordinal)| {
            if application.is_empty() {
                None
            } else {
                ordinal.parse().ok()
            }
        })
        .filter(|ordinal| *ordinal < u32::MAX)
        .ok_or_else(|| Error::InvalidUnitName(unit_name.to_string()))
}

/// This node's identity: its deployment ordinal and bind address.
///
/// Assigned once when the bind address is acquired and immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentity {
    ordinal: u32,
    bind_address: IpAddr,
}

impl NodeIdentity {
    /// Creates an identity from an ordinal and bind address.
    #[must_use]
    pub const fn new(ordinal: u32, bind_address: IpAddr) -> Self {
        Self {
            ordinal,
            bind_address,
        }
    }

    /// Creates an identity from a unit name and bind address.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit name carries no ordinal.
    pub fn from_unit_name(unit_name: &str, bind_address: IpAddr) -> Result<Self> {
        Ok(Self::new(ordinal_from_unit_name(unit_name)?, bind_address))
    }

    /// The deployment ordinal.
    #[must_use]
    pub const fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// The cluster node id derived from the ordinal.
    #[must_use]
    pub const fn id(&self) -> u32 {
        id_from_ordinal(self.ordinal)
    }

    /// The address the service binds to.
    #[must_use]
    pub const fn bind_address(&self) -> IpAddr {
        self.bind_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::Ipv4Addr;

    #[test]
    fn test_ordinal_from_unit_name() {
        assert_eq!(ordinal_from_unit_name("zookeeper/0").unwrap(), 0);
        assert_eq!(ordinal_from_unit_name("zookeeper/12").unwrap(), 12);
        assert_eq!(ordinal_from_unit_name("zk/a/3").unwrap(), 3);
        assert_eq!(
            ordinal_from_unit_name("zookeeper/4294967294").unwrap(),
            u32::MAX - 1
        );
    }

    #[test]
    fn test_invalid_unit_names() {
        for name in [
            "zookeeper",
            "zookeeper/",
            "/3",
            "zookeeper/x",
            "zookeeper/-1",
            "zookeeper/4294967295",
            "zookeeper/4294967296",
        ] {
            assert!(
                matches!(ordinal_from_unit_name(name), Err(Error::InvalidUnitName(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_id_is_ordinal_plus_one() {
        let identity =
            NodeIdentity::from_unit_name("zookeeper/0", IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)))
                .unwrap();

        assert_eq!(identity.ordinal(), 0);
        assert_eq!(identity.id(), 1);
    }
}
