//! The keeper's handlers, registered in declaration order.

mod config;
mod install;
mod relations;
mod start;

use config::{AcquireBindAddress, InstallSystemdUnit, MarkInitComplete, RenderInitConfig};
use install::{CreateDirs, CreateUser, JavaAvailable, PrepareStorage, ProvisionResource};
use relations::{PublishClientEndpoint, ReconcilePeers};
use start::{ConvergeDynamicConfig, LeaderInitialStart, RunningStatus, StampVersion};

use ensemble_facts::{Engine, HandlerSpec};
use ensemble_store::Store;

use crate::facts::{
    APT_DEPS, BIND_ADDRESS, CLIENT_AVAILABLE, DATADIR_STORAGE, DATALOGDIR_STORAGE, DIRS,
    DYNAMIC_CONFIG, INIT_COMPLETE, INIT_CONFIG, INIT_STARTED, LEADER, PEERS_AVAILABLE, RESOURCE,
    STORAGE, SYSTEMD, USER, VERSION, package_installed,
};
use crate::{GatingPolicy, KeeperContext, Settings};

/// Registers every handler for the given settings.
pub fn register<S>(engine: &mut Engine<KeeperContext<S>>, settings: &Settings)
where
    S: Store,
{
    let leader_first = settings.gating_policy == GatingPolicy::LeaderFirst;

    engine.register(
        HandlerSpec::new("java_available")
            .requires(package_installed(&settings.java_package))
            .forbids(APT_DEPS)
            .produces(APT_DEPS),
        JavaAvailable,
    );

    engine.register(
        HandlerSpec::new("create_user").forbids(USER).produces(USER),
        CreateUser,
    );

    engine.register(
        HandlerSpec::new("create_dirs")
            .requires(USER)
            .forbids(DIRS)
            .produces(DIRS),
        CreateDirs,
    );

    engine.register(
        HandlerSpec::new("prepare_storage")
            .requires(USER)
            .requires(DATADIR_STORAGE)
            .requires(DATALOGDIR_STORAGE)
            .forbids(STORAGE)
            .produces(STORAGE),
        PrepareStorage,
    );

    engine.register(
        HandlerSpec::new("provision_resource")
            .requires(APT_DEPS)
            .requires(USER)
            .forbids(RESOURCE)
            .produces(RESOURCE),
        ProvisionResource,
    );

    engine.register(
        HandlerSpec::new("acquire_bind_address")
            .forbids(BIND_ADDRESS)
            .produces(BIND_ADDRESS),
        AcquireBindAddress,
    );

    engine.register(
        HandlerSpec::new("render_init_config")
            .requires(BIND_ADDRESS)
            .requires(RESOURCE)
            .requires(DIRS)
            .requires(STORAGE)
            .requires(APT_DEPS)
            .forbids(INIT_CONFIG)
            .produces(INIT_CONFIG),
        RenderInitConfig,
    );

    engine.register(
        HandlerSpec::new("install_systemd_unit")
            .requires(BIND_ADDRESS)
            .requires(INIT_CONFIG)
            .forbids(SYSTEMD)
            .produces(SYSTEMD),
        InstallSystemdUnit,
    );

    engine.register(
        HandlerSpec::new("mark_init_complete")
            .requires(SYSTEMD)
            .forbids(INIT_COMPLETE)
            .produces(INIT_COMPLETE),
        MarkInitComplete,
    );

    engine.register(
        HandlerSpec::new("converge_dynamic_config")
            .requires(INIT_COMPLETE)
            .forbids(DYNAMIC_CONFIG)
            .produces(DYNAMIC_CONFIG),
        ConvergeDynamicConfig,
    );

    if leader_first {
        engine.register(
            HandlerSpec::new("leader_initial_start")
                .requires(INIT_COMPLETE)
                .requires(LEADER)
                .forbids(INIT_STARTED)
                .produces(INIT_STARTED)
                .latched(),
            LeaderInitialStart,
        );
    }

    let stamp_version = HandlerSpec::new("stamp_version")
        .requires(INIT_STARTED)
        .forbids(VERSION)
        .produces(VERSION);
    engine.register(
        if leader_first {
            stamp_version.requires(LEADER)
        } else {
            stamp_version
        },
        StampVersion,
    );

    engine.register(
        HandlerSpec::new("running_status")
            .requires(INIT_STARTED)
            .requires(DYNAMIC_CONFIG),
        RunningStatus,
    );

    engine.register(
        HandlerSpec::new("reconcile_peers")
            .requires(PEERS_AVAILABLE)
            .requires(BIND_ADDRESS),
        ReconcilePeers,
    );

    engine.register(
        HandlerSpec::new("publish_client_endpoint")
            .requires(CLIENT_AVAILABLE)
            .requires(BIND_ADDRESS),
        PublishClientEndpoint,
    );
}
