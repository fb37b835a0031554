use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use ensemble_probe::{Mode, ReadinessProber};
use parking_lot::Mutex;

#[derive(Debug)]
struct State {
    fallback: Mode,
    probes: usize,
    script: VecDeque<Mode>,
    version: String,
}

/// Mock prober replaying a scripted sequence of modes.
#[derive(Clone, Debug)]
pub struct MockProber {
    state: Arc<Mutex<State>>,
}

impl MockProber {
    /// Creates a prober that always reports `fallback`.
    #[must_use]
    pub fn new(fallback: Mode) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                fallback,
                probes: 0,
                script: VecDeque::new(),
                version: "3.5.9".to_string(),
            })),
        }
    }

    /// Creates a prober that always reports the given serving role.
    #[must_use]
    pub fn serving(role: &str) -> Self {
        Self::new(Mode::Serving(role.to_string()))
    }

    /// Queues modes returned before the fallback.
    pub fn script(&self, modes: impl IntoIterator<Item = Mode>) {
        self.state.lock().script.extend(modes);
    }

    /// Changes the mode reported once the script is exhausted.
    pub fn set_fallback(&self, mode: Mode) {
        self.state.lock().fallback = mode;
    }

    /// Changes the reported version.
    pub fn set_version(&self, version: &str) {
        self.state.lock().version = version.to_string();
    }

    /// Number of mode probes answered.
    #[must_use]
    pub fn probes(&self) -> usize {
        self.state.lock().probes
    }
}

#[async_trait]
impl ReadinessProber for MockProber {
    async fn probe_mode(&self, _addr: SocketAddr) -> Mode {
        let mut state = self.state.lock();
        state.probes += 1;
        match state.script.pop_front() {
            Some(mode) => mode,
            None => state.fallback.clone(),
        }
    }

    async fn probe_version(&self, _addr: SocketAddr) -> String {
        self.state.lock().version.clone()
    }
}
