//! Renders cluster configuration artifacts from membership state.
//!
//! Rendering always replaces the target file wholesale: any existing file is
//! deleted before the new contents are written.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod renderer;
mod template;

pub use error::{Error, Result};
pub use renderer::{ConfigRenderer, DEFAULT_PERMISSIONS, RenderRequest, TemplateRenderer};
pub use template::{SystemdUnitContext, Template, ZooCfgContext};
