mod common;

use common::{node, settings};
use ensemble_host::Status;
use ensemble_keeper::facts::VERSION;
use ensemble_keeper::{Event, GatingPolicy, Settings};

#[tokio::test]
async fn test_upgrade_reprovisions_and_restamps_version() {
    let mut node = node("zookeeper/0", "10.0.0.5", "leader", settings(Some(0)));
    node.install().await;
    assert_eq!(node.host.version().as_deref(), Some("3.5.9"));

    node.prober.set_version("3.6.3");
    let report = node.agent.dispatch(Event::Upgrade).await;

    assert_eq!(node.service.stops(), 1);
    assert_eq!(node.service.starts(), 2);
    assert_eq!(node.host.extracted().len(), 2);
    assert!(node.reported(&Status::active("Zookeeper upgrade complete.")));

    assert!(report.ran("stamp_version"));
    assert!(node.agent.is_set(&VERSION));
    assert_eq!(node.host.version().as_deref(), Some("3.6.3"));
    assert_eq!(node.host.last_status(), Some(Status::active("ZK leader - 1 nodes")));
}

#[tokio::test]
async fn test_upgrade_before_install_is_skipped() {
    let mut node = node("zookeeper/0", "10.0.0.5", "leader", settings(Some(0)));

    node.agent.dispatch(Event::Upgrade).await;

    assert_eq!(node.service.stops(), 0);
    assert!(node.host.extracted().is_empty());
    assert!(!node.reported(&Status::maintenance("Upgrading Zookeeper.")));
}

#[tokio::test]
async fn test_upgrade_without_resource_blocks() {
    let mut node = node("zookeeper/0", "10.0.0.5", "leader", settings(Some(0)));
    node.install().await;

    let resource = node.agent.context().settings().resource_name.clone();
    node.host.remove_resource(&resource);
    let report = node.agent.dispatch(Event::Upgrade).await;

    assert!(node.reported(&Status::blocked(
        "TROUBLE PROVISIONING ZOOKEEPER RESOURCE, PLEASE DEBUG"
    )));
    assert!(!node.reported(&Status::active("Zookeeper upgrade complete.")));
    assert_eq!(node.service.starts(), 1);
    assert!(report.any_blocked());
}

#[tokio::test]
async fn test_leader_first_upgrade_stamps_on_leader() {
    let settings = Settings {
        gating_policy: GatingPolicy::LeaderFirst,
        ..settings(None)
    };
    let mut node = node("zookeeper/0", "10.0.0.5", "leader", settings);
    node.install().await;
    node.agent.dispatch(Event::LeaderElected).await;

    node.prober.set_version("3.6.3");
    node.agent.dispatch(Event::Upgrade).await;

    let stamped = node
        .host
        .statuses()
        .iter()
        .filter(|status| status.message == "Zookeeper 3.6.3 installed.")
        .count();

    assert_eq!(stamped, 2);
    assert_eq!(node.service.starts(), 2);
    assert!(node.agent.is_set(&VERSION));
}
