use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{Probe, ProbeConfig, ProbeResult};

/// Scripted probe for testing the monitor without a network
pub struct MockProbe {
    script: Mutex<VecDeque<ProbeResult>>,
    fallback: ProbeResult,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockProbe {
    /// Every check returns `result`
    pub fn new(result: ProbeResult) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: result,
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Checks return `results` in order, then `fallback` forever
    pub fn scripted(results: Vec<ProbeResult>, fallback: ProbeResult) -> Self {
        let probe = Self::new(fallback);
        *probe.script.lock().unwrap() = results.into();
        probe
    }

    /// Each check sleeps for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of checks ever running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight gauge even when the check is dropped mid-way
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Probe for MockProbe {
    async fn check(&self, _config: &ProbeConfig) -> ProbeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
