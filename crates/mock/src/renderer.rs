use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use ensemble_render::{ConfigRenderer, RenderRequest, Result};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct State {
    existing: HashSet<PathBuf>,
    rendered: Vec<RenderRequest>,
}

/// Mock renderer that records requests instead of writing files.
#[derive(Clone, Debug, Default)]
pub struct MockRenderer {
    state: Arc<Mutex<State>>,
}

impl MockRenderer {
    /// Creates a renderer with no existing files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request that resulted in a write, oldest first.
    #[must_use]
    pub fn rendered(&self) -> Vec<RenderRequest> {
        self.state.lock().rendered.clone()
    }

    /// Requests written to `target`, oldest first.
    #[must_use]
    pub fn rendered_to(&self, target: &Path) -> Vec<RenderRequest> {
        self.state
            .lock()
            .rendered
            .iter()
            .filter(|request| request.target == target)
            .cloned()
            .collect()
    }

    /// Contents last written to `target`.
    #[must_use]
    pub fn contents(&self, target: &Path) -> Option<String> {
        self.rendered_to(target)
            .last()
            .map(|request| request.template.render())
    }
}

#[async_trait]
impl ConfigRenderer for MockRenderer {
    async fn render(&self, request: RenderRequest) -> Result<()> {
        let mut state = self.state.lock();
        if request.if_absent && state.existing.contains(&request.target) {
            return Ok(());
        }

        state.existing.insert(request.target.clone());
        state.rendered.push(request);
        Ok(())
    }
}
