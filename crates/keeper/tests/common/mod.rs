#![allow(dead_code)]

use std::sync::Arc;

use ensemble_host::Status;
use ensemble_keeper::{Agent, Event, KeeperContext, KeeperContextOptions, Settings, StorageKind};
use ensemble_membership::MembershipStore;
use ensemble_mock::{MockHost, MockProber, MockRenderer, MockService, MockTransport};
use ensemble_peers::{JoinedPeer, PeerReconciler};
use ensemble_store_memory::MemoryStore;

pub struct Node {
    pub agent: Agent<MemoryStore>,
    pub host: MockHost,
    pub prober: MockProber,
    pub renderer: MockRenderer,
    pub service: MockService,
    pub transport: MockTransport,
}

pub fn settings(expected_peer_count: Option<u32>) -> Settings {
    Settings {
        expected_peer_count,
        poll_attempts: 5,
        poll_interval_ms: 0,
        ..Settings::default()
    }
}

pub fn node(unit_name: &str, address: &str, role: &str, settings: Settings) -> Node {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let host = MockHost::new(address.parse().unwrap());
    host.add_resource(&settings.resource_name);

    let prober = MockProber::serving(role);
    let renderer = MockRenderer::new();
    let service = MockService::new(settings.service_name.clone());
    let transport = MockTransport::new();

    let agent = Agent::new(KeeperContext::new(KeeperContextOptions {
        host: Arc::new(host.clone()),
        membership: MembershipStore::new(MemoryStore::new()),
        port_opener: Arc::new(host.clone()),
        prober: Arc::new(prober.clone()),
        reconciler: PeerReconciler::new(Arc::new(transport.clone())),
        renderer: Arc::new(renderer.clone()),
        service: Arc::new(service.clone()),
        settings,
        unit_name: unit_name.to_string(),
    }));

    Node {
        agent,
        host,
        prober,
        renderer,
        service,
        transport,
    }
}

impl Node {
    /// Delivers the install-time hooks.
    pub async fn install(&mut self) {
        let java = self.agent.context().settings().java_package.clone();

        self.agent.dispatch(Event::PackageInstalled(java)).await;
        self.agent
            .dispatch(Event::StorageAttached(StorageKind::DataDir))
            .await;
        self.agent
            .dispatch(Event::StorageAttached(StorageKind::DataLogDir))
            .await;
    }

    /// Replaces the joined peers and delivers a peer change followed by a
    /// tick.
    pub async fn peers_joined(&mut self, peers: &[(&str, &str)]) {
        self.transport.set_joined(
            peers
                .iter()
                .map(|(unit_name, address)| JoinedPeer::new(*unit_name, Some(*address)))
                .collect(),
        );

        self.agent.dispatch(Event::PeersChanged).await;
        self.agent.dispatch(Event::Tick).await;
    }

    pub fn last_message(&self) -> String {
        self.host
            .last_status()
            .map(|status| status.message)
            .unwrap_or_default()
    }

    pub fn reported(&self, status: &Status) -> bool {
        self.host.statuses().contains(status)
    }
}
