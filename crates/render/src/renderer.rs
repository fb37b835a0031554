use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use ensemble_host::FileSystem;
use tracing::debug;

use crate::{Error, Result, Template};

/// Permissions applied when a request does not set any.
pub const DEFAULT_PERMISSIONS: u32 = 0o444;

/// One artifact to write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderRequest {
    /// What to render.
    pub template: Template,

    /// Where to write it.
    pub target: PathBuf,

    /// Owner and group to chown the file to.
    pub owner: Option<(String, String)>,

    /// File mode.
    pub permissions: u32,

    /// Leave an existing target untouched.
    pub if_absent: bool,
}

impl RenderRequest {
    /// Creates a request with default permissions and no ownership change.
    pub fn new(template: Template, target: impl Into<PathBuf>) -> Self {
        Self {
            template,
            target: target.into(),
            owner: None,
            permissions: DEFAULT_PERMISSIONS,
            if_absent: false,
        }
    }

    /// Sets the owner and group.
    #[must_use]
    pub fn owned_by(mut self, owner: impl Into<String>, group: impl Into<String>) -> Self {
        self.owner = Some((owner.into(), group.into()));
        self
    }

    /// Sets the file mode.
    #[must_use]
    pub const fn with_permissions(mut self, permissions: u32) -> Self {
        self.permissions = permissions;
        self
    }

    /// Only writes the file if it does not exist yet.
    #[must_use]
    pub const fn if_absent(mut self) -> Self {
        self.if_absent = true;
        self
    }
}

/// Writes configuration artifacts.
#[async_trait]
pub trait ConfigRenderer: Send + Sync + 'static {
    /// Renders and writes one artifact. Any existing file at the target is
    /// removed first, unless the request asks to keep it.
    async fn render(&self, request: RenderRequest) -> Result<()>;
}

/// Renders the embedded templates to disk.
#[derive(Clone)]
pub struct TemplateRenderer {
    file_system: Arc<dyn FileSystem>,
}

impl TemplateRenderer {
    /// Creates a renderer that applies ownership through `file_system`.
    #[must_use]
    pub fn new(file_system: Arc<dyn FileSystem>) -> Self {
        Self { file_system }
    }
}

async fn remove_existing(target: &Path) -> Result<()> {
    match tokio::fs::remove_file(target).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io("failed to remove existing file", e)),
    }
}

#[async_trait]
impl ConfigRenderer for TemplateRenderer {
    async fn render(&self, request: RenderRequest) -> Result<()> {
        let RenderRequest {
            template,
            target,
            owner,
            permissions,
            if_absent,
        } = request;

        if if_absent && tokio::fs::try_exists(&target).await.unwrap_or(false) {
            debug!("{} exists, leaving it", target.display());
            return Ok(());
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Io("failed to create config directory", e))?;
        }

        remove_existing(&target).await?;

        tokio::fs::write(&target, template.render())
            .await
            .map_err(|e| Error::Io("failed to write config file", e))?;

        tokio::fs::set_permissions(&target, std::fs::Permissions::from_mode(permissions))
            .await
            .map_err(|e| Error::Io("failed to set config file permissions", e))?;

        if let Some((owner, group)) = owner {
            self.file_system
                .chown_recursive(&target, &owner, &group)
                .await?;
        }

        debug!("rendered {} to {}", template.name(), target.display());

        Ok(())
    }
}
