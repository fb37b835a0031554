use async_trait::async_trait;
use ensemble_facts::{FactSet, Handler, Outcome};
use ensemble_host::Status;
use ensemble_peers::Reconciliation;
use ensemble_store::Store;
use tracing::debug;

use crate::KeeperContext;
use crate::facts::{CLIENT_AVAILABLE, DYNAMIC_CONFIG, DYNAMIC_CONFIG_APPLIED, PEERS_AVAILABLE};

pub struct ReconcilePeers;

#[async_trait]
impl<S> Handler<KeeperContext<S>> for ReconcilePeers
where
    S: Store,
{
    async fn run(&self, context: &mut KeeperContext<S>, facts: &mut FactSet) -> Outcome {
        match context.reconciler.reconcile(&context.membership).await {
            Ok(Reconciliation::Updated(peer_set)) => {
                facts.clear(&PEERS_AVAILABLE);
                facts.clear(&DYNAMIC_CONFIG);
                facts.clear(&DYNAMIC_CONFIG_APPLIED);

                context
                    .status(Status::active(format!(
                        "Zookeeper peers acquired: {} nodes.",
                        peer_set.len()
                    )))
                    .await;

                Outcome::Complete
            }
            Ok(Reconciliation::Ignored) => {
                debug!("no peer address data yet");
                Outcome::Complete
            }
            Err(e) => {
                context
                    .blocked(format!("Failed to acquire Zookeeper peers: {e}"))
                    .await
            }
        }
    }
}

pub struct PublishClientEndpoint;

#[async_trait]
impl<S> Handler<KeeperContext<S>> for PublishClientEndpoint
where
    S: Store,
{
    async fn run(&self, context: &mut KeeperContext<S>, facts: &mut FactSet) -> Outcome {
        context
            .status(Status::maintenance("Sending client data over 'zk' endpoint."))
            .await;

        let address = match context.membership.bind_address().await {
            Ok(Some(address)) => address,
            Ok(None) => return context.blocked("Bind address missing, please debug").await,
            Err(e) => {
                return context
                    .blocked(format!("Failed to read bind address: {e}"))
                    .await;
            }
        };

        if let Err(e) = context
            .reconciler
            .transport()
            .publish_self(address, context.settings.ports.client)
            .await
        {
            return context
                .blocked(format!("Failed to send client data: {e}"))
                .await;
        }

        facts.clear(&CLIENT_AVAILABLE);

        context
            .status(Status::active("Zookeeper client data sent."))
            .await;

        Outcome::Complete
    }
}
