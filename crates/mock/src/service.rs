use std::sync::Arc;

use async_trait::async_trait;
use ensemble_service::{Result, ServiceController};
use parking_lot::Mutex;

#[derive(Debug)]
struct State {
    enables: usize,
    restarts: usize,
    running: bool,
    start_succeeds: bool,
    starts: usize,
    stops: usize,
}

/// Mock service controller that counts lifecycle calls.
#[derive(Clone, Debug)]
pub struct MockService {
    name: String,
    state: Arc<Mutex<State>>,
}

impl MockService {
    /// Creates a stopped service whose starts succeed.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(State {
                enables: 0,
                restarts: 0,
                running: false,
                start_succeeds: true,
                starts: 0,
                stops: 0,
            })),
        }
    }

    /// Makes subsequent starts succeed or fail.
    pub fn set_start_succeeds(&self, succeeds: bool) {
        self.state.lock().start_succeeds = succeeds;
    }

    /// Forces the running state, as if the process had started or died.
    pub fn set_running(&self, running: bool) {
        self.state.lock().running = running;
    }

    /// Number of `start` calls.
    #[must_use]
    pub fn starts(&self) -> usize {
        self.state.lock().starts
    }

    /// Number of `restart` calls.
    #[must_use]
    pub fn restarts(&self) -> usize {
        self.state.lock().restarts
    }

    /// Number of `stop` calls.
    #[must_use]
    pub fn stops(&self) -> usize {
        self.state.lock().stops
    }

    /// Number of `enable` calls.
    #[must_use]
    pub fn enables(&self) -> usize {
        self.state.lock().enables
    }

    /// Combined number of `start` and `restart` calls.
    #[must_use]
    pub fn start_or_restarts(&self) -> usize {
        let state = self.state.lock();
        state.starts + state.restarts
    }
}

#[async_trait]
impl ServiceController for MockService {
    fn service_name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<bool> {
        let mut state = self.state.lock();
        state.starts += 1;
        if state.start_succeeds {
            state.running = true;
        }
        Ok(state.start_succeeds)
    }

    async fn stop(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.stops += 1;
        state.running = false;
        Ok(())
    }

    async fn restart(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.restarts += 1;
        state.running = true;
        Ok(())
    }

    async fn is_running(&self) -> bool {
        self.state.lock().running
    }

    async fn enable(&self) -> Result<()> {
        self.state.lock().enables += 1;
        Ok(())
    }
}
