use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use ensemble_service::ServiceController;
use tracing::{debug, info};

use crate::ReadinessProber;

/// Default number of probes before giving up.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 100;

/// Default pause between probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Bounds of a readiness poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollOptions {
    /// Maximum number of probes.
    pub attempts: u32,

    /// Pause between two probes.
    pub interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Result of a readiness poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// The service left the initializing state after `probes` probes.
    Ready {
        /// Probes sent, including the successful one.
        probes: u32,
    },

    /// Every probe reported initializing.
    TimedOut {
        /// Probes sent.
        probes: u32,
    },

    /// The service process is not running; nothing was probed.
    NotRunning,
}

impl Readiness {
    /// Returns whether the service is ready.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Notified after every probe that still reports initializing.
#[async_trait]
pub trait PollProgress: Send + Sync {
    /// Called with the number of initializing probes seen so far, starting at 0.
    async fn still_initializing(&self, count: u32);
}

#[async_trait]
impl PollProgress for () {
    async fn still_initializing(&self, _count: u32) {}
}

/// Polls the control port until the service reports a role.
///
/// Returns [`Readiness::NotRunning`] without probing when the process is down.
/// Otherwise sends at most `options.attempts` probes, pausing
/// `options.interval` between them.
pub async fn poll_ready(
    prober: &dyn ReadinessProber,
    controller: &dyn ServiceController,
    addr: SocketAddr,
    options: PollOptions,
    progress: &dyn PollProgress,
) -> Readiness {
    if !controller.is_running().await {
        debug!(service = controller.service_name(), "not running, skipping readiness poll");
        return Readiness::NotRunning;
    }

    for count in 0..options.attempts {
        let mode = prober.probe_mode(addr).await;
        if mode.is_serving() {
            info!("{} ready as {} after {} probes", addr, mode, count + 1);
            return Readiness::Ready { probes: count + 1 };
        }

        progress.still_initializing(count).await;

        if count + 1 < options.attempts {
            tokio::time::sleep(options.interval).await;
        }
    }

    info!("{} still initializing after {} probes", addr, options.attempts);

    Readiness::TimedOut {
        probes: options.attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::Mode;

    use ensemble_service::Result;
    use parking_lot::Mutex;

    struct Scripted {
        modes: Mutex<VecDeque<Mode>>,
        probes: AtomicU32,
    }

    impl Scripted {
        fn initializing_then_serving(k: usize) -> Self {
            let mut modes: VecDeque<Mode> = std::iter::repeat_n(Mode::Initializing, k).collect();
            modes.push_back(Mode::Serving("follower".to_string()));

            Self {
                modes: Mutex::new(modes),
                probes: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ReadinessProber for Scripted {
        async fn probe_mode(&self, _addr: SocketAddr) -> Mode {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.modes.lock().pop_front().unwrap_or(Mode::Initializing)
        }

        async fn probe_version(&self, _addr: SocketAddr) -> String {
            "3.5.9".to_string()
        }
    }

    struct Running(bool);

    #[async_trait]
    impl ServiceController for Running {
        fn service_name(&self) -> &str {
            "zookeeper"
        }

        async fn start(&self) -> Result<bool> {
            Ok(true)
        }

        async fn stop(&self) -> Result<()> {
            Ok(())
        }

        async fn restart(&self) -> Result<()> {
            Ok(())
        }

        async fn is_running(&self) -> bool {
            self.0
        }

        async fn enable(&self) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Counts(Mutex<Vec<u32>>);

    #[async_trait]
    impl PollProgress for Counts {
        async fn still_initializing(&self, count: u32) {
            self.0.lock().push(count);
        }
    }

    fn addr() -> SocketAddr {
        "127.0.0.1:2181".parse().unwrap()
    }

    fn fast() -> PollOptions {
        PollOptions {
            attempts: DEFAULT_POLL_ATTEMPTS,
            interval: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_ready_after_k_plus_one_probes() {
        for k in [0, 1, 5, 99] {
            let prober = Scripted::initializing_then_serving(k);

            let readiness = poll_ready(&prober, &Running(true), addr(), fast(), &()).await;

            let expected = u32::try_from(k + 1).unwrap();
            assert_eq!(readiness, Readiness::Ready { probes: expected });
            assert_eq!(prober.probes.load(Ordering::SeqCst), expected);
        }
    }

    #[tokio::test]
    async fn test_times_out_when_k_reaches_bound() {
        for k in [100, 150] {
            let prober = Scripted::initializing_then_serving(k);

            let readiness = poll_ready(&prober, &Running(true), addr(), fast(), &()).await;

            assert_eq!(readiness, Readiness::TimedOut { probes: 100 });
            assert!(!readiness.is_ready());
            assert_eq!(prober.probes.load(Ordering::SeqCst), 100);
        }
    }

    #[tokio::test]
    async fn test_not_running_skips_probes() {
        let prober = Scripted::initializing_then_serving(0);

        let readiness = poll_ready(&prober, &Running(false), addr(), fast(), &()).await;

        assert_eq!(readiness, Readiness::NotRunning);
        assert_eq!(prober.probes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_progress_reported_per_initializing_probe() {
        let prober = Scripted::initializing_then_serving(3);
        let counts = Counts::default();

        poll_ready(&prober, &Running(true), addr(), fast(), &counts).await;

        assert_eq!(*counts.0.lock(), vec![0, 1, 2]);
    }
}
