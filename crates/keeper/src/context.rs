//! Everything a handler may touch.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use ensemble_facts::Outcome;
use ensemble_host::{Host, Status, status_and_log};
use ensemble_membership::MembershipStore;
use ensemble_peers::PeerReconciler;
use ensemble_probe::{PollProgress, Readiness, ReadinessProber, poll_ready};
use ensemble_render::{ConfigRenderer, RenderRequest, Template, ZooCfgContext};
use ensemble_service::{PortOpener, ServiceController};
use ensemble_store::Store;
use tracing::{debug, warn};

use crate::{Failure, Settings};

/// Options for creating a new `KeeperContext`.
pub struct KeeperContextOptions<S>
where
    S: Store,
{
    /// Host capabilities.
    pub host: Arc<dyn Host>,

    /// Membership state.
    pub membership: MembershipStore<S>,

    /// Opens service ports after a first start.
    pub port_opener: Arc<dyn PortOpener>,

    /// Control-port prober.
    pub prober: Arc<dyn ReadinessProber>,

    /// Peer set reconciliation.
    pub reconciler: PeerReconciler,

    /// Configuration renderer.
    pub renderer: Arc<dyn ConfigRenderer>,

    /// Service lifecycle.
    pub service: Arc<dyn ServiceController>,

    /// Node settings.
    pub settings: Settings,

    /// Deployment unit name, `<application>/<ordinal>`.
    pub unit_name: String,
}

/// Collaborators and settings shared by every handler.
pub struct KeeperContext<S>
where
    S: Store,
{
    pub(crate) host: Arc<dyn Host>,
    pub(crate) membership: MembershipStore<S>,
    pub(crate) port_opener: Arc<dyn PortOpener>,
    pub(crate) prober: Arc<dyn ReadinessProber>,
    pub(crate) reconciler: PeerReconciler,
    pub(crate) renderer: Arc<dyn ConfigRenderer>,
    pub(crate) service: Arc<dyn ServiceController>,
    pub(crate) settings: Settings,
    pub(crate) unit_name: String,
    readiness: Option<Readiness>,
}

struct StatusProgress<'a> {
    host: &'a dyn Host,
}

#[async_trait]
impl PollProgress for StatusProgress<'_> {
    async fn still_initializing(&self, count: u32) {
        status_and_log(
            self.host,
            Status::maintenance(format!("Polling Zookeeper, still initializing: {count}.")),
        )
        .await;
    }
}

impl<S> KeeperContext<S>
where
    S: Store,
{
    /// Creates a new context.
    pub fn new(
        KeeperContextOptions {
            host,
            membership,
            port_opener,
            prober,
            reconciler,
            renderer,
            service,
            settings,
            unit_name,
        }: KeeperContextOptions<S>,
    ) -> Self {
        Self {
            host,
            membership,
            port_opener,
            prober,
            reconciler,
            renderer,
            service,
            settings,
            unit_name,
            readiness: None,
        }
    }

    /// Node settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Membership state.
    pub const fn membership(&self) -> &MembershipStore<S> {
        &self.membership
    }

    /// Reports a status and logs it.
    pub(crate) async fn status(&self, status: Status) {
        status_and_log(self.host.as_ref(), status).await;
    }

    /// Reports a blocked status and returns the matching outcome.
    pub(crate) async fn blocked(&self, message: impl Into<String>) -> Outcome {
        let message = message.into();
        self.status(Status::blocked(message.clone())).await;
        Outcome::Blocked(message)
    }

    /// Reports a failure and returns the matching outcome.
    pub(crate) async fn fail(&self, failure: Failure) -> Outcome {
        self.status(failure.status()).await;

        match failure {
            Failure::ReadinessTimeout => Outcome::Waiting(failure.to_string()),
            Failure::Provisioning | Failure::ServiceStart => Outcome::Blocked(failure.to_string()),
        }
    }

    /// Client port address of this node, once its bind address is known.
    pub(crate) async fn client_addr(&self) -> Option<SocketAddr> {
        match self.membership.bind_address().await {
            Ok(address) => address.map(|ip| SocketAddr::new(ip, self.settings.ports.client)),
            Err(e) => {
                warn!("failed to read bind address: {}", e);
                None
            }
        }
    }

    /// Drops the remembered readiness result; the next poll probes again.
    pub(crate) fn forget_readiness(&mut self) {
        self.readiness = None;
    }

    /// Waits until the service reports a role, within the configured bound.
    ///
    /// The result is remembered until [`Self::forget_readiness`], so handlers
    /// later in the same pass do not poll a second time.
    pub(crate) async fn poll_ready(&mut self) -> Readiness {
        if let Some(readiness) = self.readiness {
            debug!("reusing readiness result {:?}", readiness);
            return readiness;
        }

        let Some(addr) = self.client_addr().await else {
            return Readiness::NotRunning;
        };

        let readiness = poll_ready(
            self.prober.as_ref(),
            self.service.as_ref(),
            addr,
            self.settings.poll_options(),
            &StatusProgress {
                host: self.host.as_ref(),
            },
        )
        .await;

        self.readiness = Some(readiness);
        readiness
    }

    /// Maps a poll result to `None` when ready, or the outcome to return.
    pub(crate) async fn require_ready(&mut self) -> Option<Outcome> {
        match self.poll_ready().await {
            Readiness::Ready { .. } => None,
            Readiness::TimedOut { .. } => Some(self.fail(Failure::ReadinessTimeout).await),
            Readiness::NotRunning => Some(
                self.blocked("Zookeeper not starting, please debug")
                    .await,
            ),
        }
    }

    /// Cold-starts the service and opens its ports.
    pub(crate) async fn cold_start(&mut self) -> Result<(), Failure> {
        self.forget_readiness();

        match ensemble_service::start_service(
            self.service.as_ref(),
            self.port_opener.as_ref(),
            &self.settings.ports,
        )
        .await
        {
            Ok(true) => {
                self.status(Status::active("Zookeeper started.")).await;
                Ok(())
            }
            Ok(false) => Err(Failure::ServiceStart),
            Err(e) => {
                warn!("failed to start service: {}", e);
                Err(Failure::ServiceStart)
            }
        }
    }

    /// Reports `ZK <mode> - <n> nodes`, or blocked when the process is down.
    pub(crate) async fn running_status(&self) -> Outcome {
        if !self.service.is_running().await {
            return self.blocked("Zookeeper not starting, please debug").await;
        }

        let Some(addr) = self.client_addr().await else {
            return self.blocked("Bind address missing, please debug").await;
        };

        let mode = self.prober.probe_mode(addr).await;
        let nodes = match self.membership.peer_set().await {
            Ok(peer_set) => peer_set.len(),
            Err(e) => return self.blocked(format!("Failed to read peer set: {e}")).await,
        };

        self.status(Status::active(format!("ZK {mode} - {nodes} nodes")))
            .await;

        Outcome::Complete
    }

    /// Publishes the version reported by the running service.
    pub(crate) async fn stamp_version(&self) {
        let Some(addr) = self.client_addr().await else {
            return;
        };

        self.status(Status::maintenance("Setting Zookeeper version."))
            .await;

        let version = self.prober.probe_version(addr).await;
        self.host.set_application_version(&version).await;

        self.status(Status::active(format!("Zookeeper {version} installed.")))
            .await;
    }

    /// Replaces the distribution in the home directory with a fresh copy of
    /// the resource.
    pub(crate) async fn provision_resource(&self) -> Result<(), Failure> {
        let layout = &self.settings.layout;

        let archive = match self
            .host
            .fetch_resource(&self.settings.resource_name)
            .await
        {
            Ok(Some(archive)) => archive,
            Ok(None) => {
                warn!("resource {} not available", self.settings.resource_name);
                return Err(Failure::Provisioning);
            }
            Err(e) => {
                warn!("failed to fetch resource: {}", e);
                return Err(Failure::Provisioning);
            }
        };

        let unpacked = async {
            self.host.remove_dir_all(&layout.home_dir).await?;
            self.host.ensure_dir(&layout.home_dir).await?;
            self.host
                .extract_archive(&archive, &layout.home_dir, 1)
                .await?;
            self.host
                .chown_recursive(&layout.home_dir, &self.settings.user, &self.settings.user)
                .await
        }
        .await;

        unpacked.map_err(|e| {
            warn!("failed to unpack {}: {}", archive.display(), e);
            Failure::Provisioning
        })
    }

    /// Renders the env script, `zoo.cfg`, log4j config, an empty dynamic
    /// config if there is none yet, and `myid`.
    pub(crate) async fn render_init_config(&self) -> Result<(), String> {
        let layout = &self.settings.layout;
        let user = &self.settings.user;

        let identity = match self.membership.identity().await {
            Ok(Some(identity)) => identity,
            Ok(None) => return Err("node identity missing".to_string()),
            Err(e) => return Err(e.to_string()),
        };

        let requests = [
            RenderRequest::new(
                Template::EnvScript {
                    log_dir: layout.log_dir.clone(),
                },
                layout.env_file(),
            )
            .with_permissions(0o755),
            RenderRequest::new(
                Template::ZooCfg(ZooCfgContext {
                    bind_address: identity.bind_address(),
                    data_dir: layout.data_dir.clone(),
                    datalog_dir: layout.datalog_dir.clone(),
                    dynamic_config_file: layout.dynamic_config_file(),
                    four_letter_words: self.settings.four_letter_words.clone(),
                    standalone_enabled: self.settings.standalone_enabled,
                }),
                layout.config_file(),
            ),
            RenderRequest::new(
                Template::Log4j {
                    log_dir: layout.log_dir.clone(),
                },
                layout.log4j_file(),
            ),
            RenderRequest::new(
                Template::DynamicConfig {
                    peers: ensemble_membership::PeerSet::default(),
                    ports: self.settings.ports,
                },
                layout.dynamic_config_file(),
            )
            .if_absent(),
            RenderRequest::new(
                Template::Myid {
                    zk_id: identity.id(),
                },
                layout.myid_file(),
            ),
        ];

        for request in requests {
            let request = request.owned_by(user.clone(), user.clone());
            debug!("rendering {}", request.target.display());

            self.renderer
                .render(request)
                .await
                .map_err(|e| e.to_string())?;
        }

        Ok(())
    }
}
