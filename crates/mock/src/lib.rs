//! Recording mock implementations of every collaborator seam, for tests.
//!
//! Every mock is cheap to clone; clones share state so a test can keep one
//! handle for assertions while the code under test owns another.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod host;
mod prober;
mod renderer;
mod service;
mod transport;

pub use host::MockHost;
pub use prober::MockProber;
pub use renderer::MockRenderer;
pub use service::MockService;
pub use transport::MockTransport;
