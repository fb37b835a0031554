//! Applies events to the fact set and drives engine passes.

use ensemble_facts::{Engine, Fact, FactSet, PassReport};
use ensemble_host::Status;
use ensemble_store::Store;
use tracing::{debug, info, warn};

use crate::events::{Event, StorageKind};
use crate::facts::{
    CLIENT_AVAILABLE, DATADIR_STORAGE, DATALOGDIR_STORAGE, INIT_COMPLETE, LEADER, PEERS_AVAILABLE,
    VERSION, package_installed,
};
use crate::{Failure, GatingPolicy, KeeperContext, handlers};

/// The node agent: one engine plus the context its handlers run against.
pub struct Agent<S>
where
    S: Store,
{
    context: KeeperContext<S>,
    engine: Engine<KeeperContext<S>>,
}

impl<S> Agent<S>
where
    S: Store,
{
    /// Creates an agent with every handler registered for the context's
    /// settings.
    pub fn new(context: KeeperContext<S>) -> Self {
        let mut engine = Engine::new();
        handlers::register(&mut engine, &context.settings);

        Self { context, engine }
    }

    /// Current facts.
    pub const fn facts(&self) -> &FactSet {
        self.engine.facts()
    }

    /// Returns whether a fact is set.
    pub fn is_set(&self, fact: &Fact) -> bool {
        self.engine.is_set(fact)
    }

    /// Handler context.
    pub const fn context(&self) -> &KeeperContext<S> {
        &self.context
    }

    /// Applies the event and runs one engine pass.
    pub async fn dispatch(&mut self, event: Event) -> PassReport {
        info!("dispatching {}", event);
        self.context.forget_readiness();

        match event {
            Event::PackageInstalled(package) => {
                self.engine.set_fact(package_installed(&package));
            }
            Event::StorageAttached(StorageKind::DataDir) => {
                self.engine.set_fact(DATADIR_STORAGE);
            }
            Event::StorageAttached(StorageKind::DataLogDir) => {
                self.engine.set_fact(DATALOGDIR_STORAGE);
            }
            Event::PeersChanged => {
                self.engine.set_fact(PEERS_AVAILABLE);
            }
            Event::ClientRelationJoined => {
                self.engine.set_fact(CLIENT_AVAILABLE);
            }
            Event::LeaderElected => {
                self.engine.set_fact(LEADER);
            }
            Event::LeadershipLost => {
                let cleared = self.engine.clear_fact(&LEADER);
                debug!("leadership lost, cleared {:?}", cleared);
            }
            Event::Upgrade => self.upgrade().await,
            Event::Tick => self.observe_packages().await,
        }

        let report = self.engine.run_pass(&mut self.context).await;
        debug!("pass ran {:?}", report.names());

        report
    }

    async fn observe_packages(&mut self) {
        let package = &self.context.settings.java_package;

        match self.context.host.is_installed(package).await {
            Ok(true) => {
                self.engine.set_fact(package_installed(package));
            }
            Ok(false) => {}
            Err(e) => warn!("failed to query package {}: {}", package, e),
        }
    }

    /// Stops the service, reprovisions the distribution, re-renders the
    /// initial config and starts the service again.
    ///
    /// Clears the version fact so the version is stamped again.
    async fn upgrade(&mut self) {
        let context = &mut self.context;

        if !self.engine.is_set(&INIT_COMPLETE) {
            info!("not initialised yet, nothing to upgrade");
            return;
        }

        context
            .status(Status::maintenance("Upgrading Zookeeper."))
            .await;

        context.forget_readiness();

        if context.service.is_running().await {
            if let Err(e) = context.service.stop().await {
                context
                    .blocked(format!("Failed to stop Zookeeper: {e}"))
                    .await;
                return;
            }
        }

        if let Err(failure) = context.provision_resource().await {
            context.fail(failure).await;
            return;
        }

        if let Err(e) = context.render_init_config().await {
            context
                .blocked(format!("Failed to render initial config: {e}"))
                .await;
            return;
        }

        if !context.service.is_running().await {
            match context.service.start().await {
                Ok(true) => {}
                Ok(false) => {
                    context.fail(Failure::ServiceStart).await;
                    return;
                }
                Err(e) => {
                    warn!("failed to start service: {}", e);
                    context.fail(Failure::ServiceStart).await;
                    return;
                }
            }
        }

        if context.settings.gating_policy == GatingPolicy::LeaderFirst
            && self.engine.is_set(&LEADER)
            && context.poll_ready().await.is_ready()
        {
            context.stamp_version().await;
        }

        context
            .status(Status::active("Zookeeper upgrade complete."))
            .await;

        self.engine.clear_fact(&VERSION);
    }
}
