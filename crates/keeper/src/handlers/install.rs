use async_trait::async_trait;
use ensemble_facts::{FactSet, Handler, Outcome};
use ensemble_host::Status;
use ensemble_store::Store;

use crate::KeeperContext;

pub struct JavaAvailable;

#[async_trait]
impl<S> Handler<KeeperContext<S>> for JavaAvailable
where
    S: Store,
{
    async fn run(&self, context: &mut KeeperContext<S>, _facts: &mut FactSet) -> Outcome {
        context.status(Status::active("Apt deps available.")).await;
        Outcome::Complete
    }
}

pub struct CreateUser;

#[async_trait]
impl<S> Handler<KeeperContext<S>> for CreateUser
where
    S: Store,
{
    async fn run(&self, context: &mut KeeperContext<S>, _facts: &mut FactSet) -> Outcome {
        let user = &context.settings.user;

        context
            .status(Status::maintenance(format!(
                "Creating '{user}' user and home dir."
            )))
            .await;

        if let Err(e) = context
            .host
            .create_user(user, &context.settings.layout.home_dir)
            .await
        {
            return context
                .blocked(format!("Failed to create '{user}' user: {e}"))
                .await;
        }

        context
            .status(Status::active(format!(
                "'{user}' user and home dir created."
            )))
            .await;

        Outcome::Complete
    }
}

pub struct CreateDirs;

#[async_trait]
impl<S> Handler<KeeperContext<S>> for CreateDirs
where
    S: Store,
{
    async fn run(&self, context: &mut KeeperContext<S>, _facts: &mut FactSet) -> Outcome {
        let layout = &context.settings.layout;
        let user = &context.settings.user;

        context
            .status(Status::maintenance("Creating Zookeeper dirs."))
            .await;

        for dir in [
            layout.log_dir.clone(),
            layout.trace_dir(),
            layout.data_dir.clone(),
            layout.datalog_dir.clone(),
            layout.dynamic_config_dir.clone(),
        ] {
            if let Err(e) = context.host.ensure_dir(&dir).await {
                return context
                    .blocked(format!("Failed to create {}: {e}", dir.display()))
                    .await;
            }

            if let Err(e) = context.host.chown_recursive(&dir, user, user).await {
                return context
                    .blocked(format!("Failed to chown {}: {e}", dir.display()))
                    .await;
            }
        }

        context
            .status(Status::active("Zookeeper dirs created."))
            .await;

        Outcome::Complete
    }
}

pub struct PrepareStorage;

#[async_trait]
impl<S> Handler<KeeperContext<S>> for PrepareStorage
where
    S: Store,
{
    async fn run(&self, context: &mut KeeperContext<S>, _facts: &mut FactSet) -> Outcome {
        let layout = &context.settings.layout;
        let user = &context.settings.user;

        context
            .status(Status::maintenance(
                "Creating/chowning the zookeeper datadir and datalogdir.",
            ))
            .await;

        for dir in [&layout.data_dir, &layout.datalog_dir] {
            let prepared = async {
                context.host.ensure_dir(dir).await?;
                context.host.chown_recursive(dir, user, user).await
            }
            .await;

            if let Err(e) = prepared {
                return context
                    .blocked(format!("Failed to prepare {}: {e}", dir.display()))
                    .await;
            }
        }

        context
            .status(Status::active("Creating/chowning mounts successful."))
            .await;

        Outcome::Complete
    }
}

pub struct ProvisionResource;

#[async_trait]
impl<S> Handler<KeeperContext<S>> for ProvisionResource
where
    S: Store,
{
    async fn run(&self, context: &mut KeeperContext<S>, _facts: &mut FactSet) -> Outcome {
        context
            .status(Status::maintenance("Provisioning zookeeper resource."))
            .await;

        if let Err(failure) = context.provision_resource().await {
            return context.fail(failure).await;
        }

        context
            .status(Status::active("Zookeeper resource available."))
            .await;

        Outcome::Complete
    }
}
