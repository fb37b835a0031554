use async_trait::async_trait;
use ensemble_facts::{FactSet, Handler, Outcome};
use ensemble_host::Status;
use ensemble_render::{RenderRequest, Template};
use ensemble_store::Store;
use tracing::{debug, info, warn};

use crate::facts::{DYNAMIC_CONFIG_APPLIED, INIT_START_AVAILABLE, INIT_STARTED, LEADER};
use crate::gating::{Gate, evaluate};
use crate::{Failure, GatingPolicy, KeeperContext};

/// Re-renders the dynamic membership config and brings the service in line
/// with it, subject to the gating policy.
///
/// Once the peer set is applied, a retry only polls readiness again; the
/// service is not restarted until the peer set changes.
pub struct ConvergeDynamicConfig;

#[async_trait]
impl<S> Handler<KeeperContext<S>> for ConvergeDynamicConfig
where
    S: Store,
{
    async fn run(&self, context: &mut KeeperContext<S>, facts: &mut FactSet) -> Outcome {
        if facts.is_set(&DYNAMIC_CONFIG_APPLIED) {
            debug!("peer set already applied, polling readiness again");
        } else if let Some(outcome) = apply_peer_set(context, facts).await {
            return outcome;
        }

        if let Some(outcome) = context.require_ready().await {
            return outcome;
        }

        context
            .status(Status::active("Zookeeper dynamic config rendered."))
            .await;

        context.running_status().await
    }
}

/// Evaluates the gate, renders the stored peer set, and starts or restarts
/// the service on it.
///
/// Returns the outcome to stop with, or `None` once the peer set is applied.
async fn apply_peer_set<S>(context: &mut KeeperContext<S>, facts: &mut FactSet) -> Option<Outcome>
where
    S: Store,
{
    let policy = context.settings.gating_policy;

    let peer_set = match context.membership.peer_set().await {
        Ok(peer_set) => peer_set,
        Err(e) => {
            return Some(context.blocked(format!("Failed to read peer set: {e}")).await);
        }
    };
    let expected = match context.membership.expected_peer_count().await {
        Ok(expected) => expected,
        Err(e) => {
            return Some(
                context
                    .blocked(format!("Failed to read expected peer count: {e}"))
                    .await,
            );
        }
    };

    match evaluate(policy, expected, peer_set.len()) {
        Gate::Proceed => {}
        Gate::Wait { deficit } => {
            let message = format!("Waiting for {deficit} more peers");
            context.status(Status::waiting(message.clone())).await;
            return Some(Outcome::Waiting(message));
        }
        Gate::Excess { surplus } => {
            return Some(
                context
                    .blocked(format!(
                        "{surplus} more peers than the expected {}, please debug",
                        expected.unwrap_or_default()
                    ))
                    .await,
            );
        }
    }

    context
        .status(Status::maintenance("Writing zk peers to dynamic config file."))
        .await;

    let user = context.settings.user.clone();
    let request = RenderRequest::new(
        Template::DynamicConfig {
            peers: peer_set,
            ports: context.settings.ports,
        },
        context.settings.layout.dynamic_config_file(),
    )
    .owned_by(user.clone(), user);

    if let Err(e) = context.renderer.render(request).await {
        return Some(
            context
                .blocked(format!("Failed to render dynamic config: {e}"))
                .await,
        );
    }

    let started = facts.is_set(&INIT_STARTED);
    let leader_starts_separately = policy == GatingPolicy::LeaderFirst && facts.is_set(&LEADER);

    if !started && leader_starts_separately {
        info!("leader not started yet, leaving first start to the leader");
        context
            .status(Status::active("Zookeeper dynamic config rendered."))
            .await;
        return Some(Outcome::Complete);
    }

    if started {
        context.forget_readiness();
        if let Err(e) = context.service.restart().await {
            warn!("failed to restart service: {}", e);
            return Some(context.fail(Failure::ServiceStart).await);
        }
    } else {
        if let Err(failure) = context.cold_start().await {
            return Some(context.fail(failure).await);
        }

        facts.set(INIT_STARTED);
        facts.set(INIT_START_AVAILABLE);
    }

    facts.set(DYNAMIC_CONFIG_APPLIED);

    None
}

/// First start of the leader under leader-first gating.
pub struct LeaderInitialStart;

#[async_trait]
impl<S> Handler<KeeperContext<S>> for LeaderInitialStart
where
    S: Store,
{
    async fn run(&self, context: &mut KeeperContext<S>, _facts: &mut FactSet) -> Outcome {
        context.status(Status::maintenance("Starting Zookeeper.")).await;

        match context.cold_start().await {
            Ok(()) => Outcome::Complete,
            Err(failure) => context.fail(failure).await,
        }
    }
}

/// Publishes the running version once the service is ready.
pub struct StampVersion;

#[async_trait]
impl<S> Handler<KeeperContext<S>> for StampVersion
where
    S: Store,
{
    async fn run(&self, context: &mut KeeperContext<S>, _facts: &mut FactSet) -> Outcome {
        if let Some(outcome) = context.require_ready().await {
            return outcome;
        }

        context.stamp_version().await;

        Outcome::Complete
    }
}

/// Reports mode and cluster size on every pass once started.
pub struct RunningStatus;

#[async_trait]
impl<S> Handler<KeeperContext<S>> for RunningStatus
where
    S: Store,
{
    async fn run(&self, context: &mut KeeperContext<S>, _facts: &mut FactSet) -> Outcome {
        context.running_status().await
    }
}
