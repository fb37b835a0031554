mod common;

use common::{node, settings};
use ensemble_facts::Outcome;
use ensemble_host::{Status, StatusLevel};
use ensemble_keeper::Event;
use ensemble_keeper::facts::{
    DYNAMIC_CONFIG, DYNAMIC_CONFIG_APPLIED, INIT_CONFIG, INIT_STARTED, RESOURCE,
};
use ensemble_peers::JoinedPeer;
use ensemble_probe::Mode;

#[tokio::test]
async fn test_missing_resource_blocks_until_attached() {
    let mut node = node("zookeeper/0", "10.0.0.5", "leader", settings(Some(0)));
    let resource = node.agent.context().settings().resource_name.clone();
    node.host.remove_resource(&resource);

    node.install().await;

    assert_eq!(
        node.host.last_status(),
        Some(Status::blocked(
            "TROUBLE PROVISIONING ZOOKEEPER RESOURCE, PLEASE DEBUG"
        ))
    );
    assert!(!node.agent.is_set(&RESOURCE));
    assert!(!node.agent.is_set(&INIT_CONFIG));
    assert_eq!(node.service.starts(), 0);

    node.host.add_resource(&resource);
    node.agent.dispatch(Event::Tick).await;

    assert!(node.agent.is_set(&RESOURCE));
    assert_eq!(node.service.starts(), 1);
    assert_eq!(node.host.last_status(), Some(Status::active("ZK leader - 1 nodes")));
}

#[tokio::test]
async fn test_failed_extraction_blocks() {
    let mut node = node("zookeeper/0", "10.0.0.5", "leader", settings(Some(0)));
    node.host.fail_extract(true);

    node.install().await;

    assert_eq!(
        node.host.last_status().map(|status| status.level),
        Some(StatusLevel::Blocked)
    );
    assert!(!node.agent.is_set(&RESOURCE));

    node.host.fail_extract(false);
    node.agent.dispatch(Event::Tick).await;

    assert!(node.agent.is_set(&RESOURCE));
    assert_eq!(node.host.extracted().len(), 1);
}

#[tokio::test]
async fn test_start_failure_blocks_without_marking_started() {
    let mut node = node("zookeeper/0", "10.0.0.5", "leader", settings(Some(0)));
    node.service.set_start_succeeds(false);

    node.install().await;

    assert_eq!(
        node.host.last_status(),
        Some(Status::blocked("PLEASE DEBUG: Zookeeper not starting."))
    );
    assert!(!node.agent.is_set(&INIT_STARTED));
    assert!(!node.agent.is_set(&DYNAMIC_CONFIG));

    node.service.set_start_succeeds(true);
    let report = node.agent.dispatch(Event::Tick).await;

    assert_eq!(
        report.outcome("converge_dynamic_config"),
        Some(&Outcome::Complete)
    );
    assert!(node.agent.is_set(&INIT_STARTED));
    assert_eq!(node.service.restarts(), 0);
    assert_eq!(node.host.last_status(), Some(Status::active("ZK leader - 1 nodes")));
}

#[tokio::test]
async fn test_readiness_timeout_waits_and_retries() {
    let mut node = node("zookeeper/0", "10.0.0.5", "leader", settings(Some(0)));
    node.prober.set_fallback(Mode::Initializing);

    node.install().await;

    assert!(node.reported(&Status::maintenance(
        "Polling Zookeeper, still initializing: 0."
    )));
    assert!(node.reported(&Status::maintenance(
        "Polling Zookeeper, still initializing: 4."
    )));
    assert!(!node.reported(&Status::maintenance(
        "Polling Zookeeper, still initializing: 5."
    )));
    assert_eq!(
        node.host.last_status(),
        Some(Status::waiting("Zookeeper still initializing, will retry."))
    );
    assert!(node.agent.is_set(&INIT_STARTED));
    assert!(!node.agent.is_set(&DYNAMIC_CONFIG));
    assert_eq!(node.host.version(), None);

    node.prober.set_fallback(Mode::Serving("leader".to_string()));
    node.agent.dispatch(Event::Tick).await;

    assert_eq!(node.service.starts(), 1);
    assert_eq!(node.service.restarts(), 0);
    assert!(node.agent.is_set(&DYNAMIC_CONFIG));
    assert_eq!(node.host.version().as_deref(), Some("3.5.9"));
    assert_eq!(node.host.last_status(), Some(Status::active("ZK leader - 1 nodes")));
}

#[tokio::test]
async fn test_slow_initialization_is_not_restarted() {
    let mut node = node("zookeeper/0", "10.0.0.5", "leader", settings(Some(0)));
    node.prober.set_fallback(Mode::Initializing);

    node.install().await;
    assert_eq!(node.prober.probes(), 5);

    for tick in 1..=3 {
        let report = node.agent.dispatch(Event::Tick).await;

        assert!(matches!(
            report.outcome("converge_dynamic_config"),
            Some(Outcome::Waiting(_))
        ));
        assert_eq!(node.prober.probes(), 5 * (tick + 1));
    }

    assert_eq!(node.service.starts(), 1);
    assert_eq!(node.service.restarts(), 0);
    assert!(node.agent.is_set(&DYNAMIC_CONFIG_APPLIED));
    assert_eq!(
        node.host.last_status(),
        Some(Status::waiting("Zookeeper still initializing, will retry."))
    );
}

#[tokio::test]
async fn test_peer_change_after_slow_start_restarts_once() {
    let mut node = node("zookeeper/0", "10.0.0.5", "leader", settings(None));
    node.prober.set_fallback(Mode::Initializing);

    node.install().await;
    node.agent.dispatch(Event::Tick).await;
    node.peers_joined(&[("zookeeper/1", "10.0.0.6")]).await;
    node.agent.dispatch(Event::Tick).await;

    assert_eq!(node.service.starts(), 1);
    assert_eq!(node.service.restarts(), 1);
}

#[tokio::test]
async fn test_readiness_is_polled_once_per_pass() {
    let mut node = node("zookeeper/0", "10.0.0.5", "leader", settings(Some(0)));
    node.prober.script([Mode::Initializing, Mode::Initializing]);

    node.install().await;

    // Three poll probes, then one mode probe for each running status report.
    assert_eq!(node.prober.probes(), 5);
    assert_eq!(node.host.version().as_deref(), Some("3.5.9"));
    assert_eq!(node.host.last_status(), Some(Status::active("ZK leader - 1 nodes")));
}

#[tokio::test]
async fn test_unusable_peer_ordinal_blocks() {
    let mut node = node("zookeeper/0", "10.0.0.5", "leader", settings(None));
    node.install().await;

    node.transport.set_joined(vec![JoinedPeer::new(
        "zookeeper/4294967295",
        Some("10.0.0.9"),
    )]);
    let report = node.agent.dispatch(Event::PeersChanged).await;

    assert!(matches!(
        report.outcome("reconcile_peers"),
        Some(Outcome::Blocked(_))
    ));
    assert_eq!(
        node.agent.context().membership().peer_set().await.unwrap().len(),
        1
    );
    assert_eq!(node.service.restarts(), 0);
}

#[tokio::test]
async fn test_stopped_service_reports_blocked() {
    let mut node = node("zookeeper/0", "10.0.0.5", "leader", settings(Some(0)));

    node.install().await;
    node.service.set_running(false);

    let report = node.agent.dispatch(Event::Tick).await;

    assert!(report.any_blocked());
    assert_eq!(
        node.host.last_status(),
        Some(Status::blocked("Zookeeper not starting, please debug"))
    );
}
