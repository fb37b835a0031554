use async_trait::async_trait;
use ensemble_facts::{FactSet, Handler, Outcome};
use ensemble_host::Status;
use ensemble_membership::NodeIdentity;
use ensemble_render::{RenderRequest, SystemdUnitContext, Template};
use ensemble_store::Store;

use crate::facts::DYNAMIC_CONFIG;
use crate::{GatingPolicy, KeeperContext};

pub struct AcquireBindAddress;

#[async_trait]
impl<S> Handler<KeeperContext<S>> for AcquireBindAddress
where
    S: Store,
{
    async fn run(&self, context: &mut KeeperContext<S>, _facts: &mut FactSet) -> Outcome {
        context
            .status(Status::maintenance("Acquiring bind address."))
            .await;

        let address = match context.host.ingress_address().await {
            Ok(address) => address,
            Err(e) => {
                return context
                    .blocked(format!("Failed to acquire bind address: {e}"))
                    .await;
            }
        };

        let identity = match NodeIdentity::from_unit_name(&context.unit_name, address) {
            Ok(identity) => identity,
            Err(e) => return context.blocked(e.to_string()).await,
        };

        let recorded = async {
            context.membership.acquire_identity(&identity).await?;
            context
                .membership
                .set_expected_peer_count(context.settings.expected_peer_count)
                .await
        }
        .await;

        if let Err(e) = recorded {
            return context
                .blocked(format!("Failed to record identity: {e}"))
                .await;
        }

        context
            .status(Status::active("Bind address acquired."))
            .await;

        Outcome::Complete
    }
}

pub struct RenderInitConfig;

#[async_trait]
impl<S> Handler<KeeperContext<S>> for RenderInitConfig
where
    S: Store,
{
    async fn run(&self, context: &mut KeeperContext<S>, facts: &mut FactSet) -> Outcome {
        context
            .status(Status::maintenance("Writing initial config."))
            .await;

        if let Err(e) = context.render_init_config().await {
            return context
                .blocked(format!("Failed to render initial config: {e}"))
                .await;
        }

        // Leader-first brings the leader up from the initial, empty
        // membership; convergence only runs again on peer changes.
        if context.settings.gating_policy == GatingPolicy::LeaderFirst {
            facts.set(DYNAMIC_CONFIG);
        }

        context
            .status(Status::active("Initial config rendered."))
            .await;

        Outcome::Complete
    }
}

pub struct InstallSystemdUnit;

#[async_trait]
impl<S> Handler<KeeperContext<S>> for InstallSystemdUnit
where
    S: Store,
{
    async fn run(&self, context: &mut KeeperContext<S>, _facts: &mut FactSet) -> Outcome {
        let settings = &context.settings;
        let service_name = context.service.service_name().to_string();

        context
            .status(Status::maintenance(format!(
                "Enabling '{service_name}' systemd service."
            )))
            .await;

        let request = RenderRequest::new(
            Template::SystemdUnit(SystemdUnitContext {
                user: settings.user.clone(),
                home: settings.layout.home_dir.clone(),
                server_sh: settings.layout.server_sh(),
                config_file: settings.layout.config_file(),
            }),
            settings.layout.systemd_unit_file(&service_name),
        )
        .with_permissions(0o644);

        if let Err(e) = context.renderer.render(request).await {
            return context
                .blocked(format!("Failed to render systemd unit: {e}"))
                .await;
        }

        if let Err(e) = context.service.enable().await {
            return context
                .blocked(format!("Failed to enable '{service_name}': {e}"))
                .await;
        }

        context
            .status(Status::active(format!(
                "'{service_name}' systemd service enabled."
            )))
            .await;

        Outcome::Complete
    }
}

pub struct MarkInitComplete;

#[async_trait]
impl<S> Handler<KeeperContext<S>> for MarkInitComplete
where
    S: Store,
{
    async fn run(&self, context: &mut KeeperContext<S>, _facts: &mut FactSet) -> Outcome {
        context
            .status(Status::active("Zookeeper initialization complete."))
            .await;

        Outcome::Complete
    }
}
