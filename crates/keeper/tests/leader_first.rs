mod common;

use common::{Node, node, settings};
use ensemble_host::Status;
use ensemble_keeper::facts::{DYNAMIC_CONFIG, INIT_STARTED, LEADER, VERSION};
use ensemble_keeper::{Event, GatingPolicy, Settings};

fn leader_first() -> Settings {
    Settings {
        gating_policy: GatingPolicy::LeaderFirst,
        ..settings(None)
    }
}

async fn installed(unit_name: &str, address: &str, role: &str) -> Node {
    let mut node = node(unit_name, address, role, leader_first());
    node.install().await;
    node
}

#[tokio::test]
async fn test_leader_starts_once_elected() {
    let mut node = installed("zookeeper/0", "10.0.0.5", "leader").await;

    assert!(node.agent.is_set(&DYNAMIC_CONFIG));
    assert_eq!(node.service.start_or_restarts(), 0);

    let report = node.agent.dispatch(Event::LeaderElected).await;

    assert!(report.ran("leader_initial_start"));
    assert_eq!(node.service.starts(), 1);
    assert_eq!(node.service.restarts(), 0);
    assert_eq!(node.host.opened_ports(), vec![2181, 2888, 3888]);
    assert_eq!(node.host.version().as_deref(), Some("3.5.9"));
    assert_eq!(node.host.last_status(), Some(Status::active("ZK leader - 1 nodes")));

    node.agent.dispatch(Event::Tick).await;
    node.agent.dispatch(Event::LeaderElected).await;

    assert_eq!(node.service.start_or_restarts(), 1);
}

#[tokio::test]
async fn test_losing_leadership_keeps_service_started() {
    let mut node = installed("zookeeper/0", "10.0.0.5", "leader").await;
    node.agent.dispatch(Event::LeaderElected).await;
    assert!(node.agent.is_set(&VERSION));

    node.agent.dispatch(Event::LeadershipLost).await;

    assert!(!node.agent.is_set(&LEADER));
    assert!(!node.agent.is_set(&VERSION));
    assert!(node.agent.is_set(&INIT_STARTED));

    let report = node.agent.dispatch(Event::LeaderElected).await;

    assert!(!report.ran("leader_initial_start"));
    assert!(report.ran("stamp_version"));
    assert_eq!(node.service.start_or_restarts(), 1);
}

#[tokio::test]
async fn test_leader_start_failure_blocks() {
    let mut node = installed("zookeeper/0", "10.0.0.5", "leader").await;
    node.service.set_start_succeeds(false);

    let report = node.agent.dispatch(Event::LeaderElected).await;

    assert!(report.any_blocked());
    assert!(!node.agent.is_set(&INIT_STARTED));
    assert_eq!(
        node.host.last_status(),
        Some(Status::blocked("PLEASE DEBUG: Zookeeper not starting."))
    );
}

#[tokio::test]
async fn test_follower_starts_on_membership_change() {
    let mut node = installed("zookeeper/1", "10.0.0.6", "follower").await;

    node.agent.dispatch(Event::Tick).await;
    assert_eq!(node.service.start_or_restarts(), 0);

    node.peers_joined(&[("zookeeper/0", "10.0.0.5")]).await;

    assert_eq!(node.service.starts(), 1);
    assert_eq!(node.service.restarts(), 0);
    assert_eq!(node.host.version(), None);
    assert_eq!(
        node.host.last_status(),
        Some(Status::active("ZK follower - 2 nodes"))
    );

    node.peers_joined(&[("zookeeper/0", "10.0.0.5"), ("zookeeper/2", "10.0.0.7")])
        .await;

    assert_eq!(node.service.starts(), 1);
    assert_eq!(node.service.restarts(), 1);
    assert_eq!(
        node.host.last_status(),
        Some(Status::active("ZK follower - 3 nodes"))
    );
}
