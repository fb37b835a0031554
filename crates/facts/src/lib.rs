//! Guarded-task scheduler that converges a node by running handlers whose
//! preconditions hold and whose outcomes are not yet recorded.
//!
//! The engine keeps a set of named boolean [`Fact`]s. Each handler is
//! registered with a [`Guard`] (facts that must be set, facts that must be
//! unset) and the facts it produces on success. A pass scans handlers in
//! declaration order and runs every handler whose guard matches at the moment
//! it is reached.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use ensemble_facts::{Engine, Fact, FactSet, Handler, HandlerSpec, Outcome};
//!
//! const INSTALLED: Fact = Fact::from_static("app.installed");
//!
//! struct Install;
//!
//! #[async_trait]
//! impl Handler<Vec<String>> for Install {
//!     async fn run(&self, log: &mut Vec<String>, _facts: &mut FactSet) -> Outcome {
//!         log.push("installed".to_string());
//!         Outcome::Complete
//!     }
//! }
//!
//! # async fn run() {
//! let mut engine = Engine::new();
//! engine.register(
//!     HandlerSpec::new("install").forbids(INSTALLED).produces(INSTALLED),
//!     Install,
//! );
//!
//! let mut log = Vec::new();
//! engine.run_pass(&mut log).await;
//! engine.run_pass(&mut log).await;
//!
//! assert!(engine.is_set(&INSTALLED));
//! assert_eq!(log.len(), 1);
//! # }
//! ```
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod engine;
mod fact;
mod guard;
mod handler;

pub use engine::{Engine, PassReport};
pub use fact::{Fact, FactSet};
pub use guard::Guard;
pub use handler::{Handler, HandlerSpec, Outcome};
