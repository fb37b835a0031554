//! Node agent that converges a host into a running, peer-consistent
//! ZooKeeper ensemble member.
//!
//! Each externally observed [`Event`] updates the fact set and triggers one
//! engine pass. The handlers install the service, render its configuration,
//! reconcile the peer set, and start or restart the service under the
//! configured [`GatingPolicy`].
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod agent;
mod context;
mod error;
mod events;
pub mod facts;
pub mod gating;
mod handlers;
mod settings;

pub use agent::Agent;
pub use context::{KeeperContext, KeeperContextOptions};
pub use error::{Error, Failure, Result};
pub use events::{Event, StorageKind};
pub use settings::{GatingPolicy, Layout, Settings};
