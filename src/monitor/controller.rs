use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use super::ticker::{run_ticker, TickContext};
use super::{MonitorSettings, MonitorState, ToggleOutcome};
use crate::notifier::{message, Notifier};
use crate::probe::Probe;

/// The running ticker and the token that stops it
struct ActiveTicker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the on/off state of the monitor.
///
/// All transitions go through one async mutex, so a control request and a
/// concurrent toggle never interleave. `Some` ticker means running.
pub struct MonitorController {
    context: Arc<TickContext>,
    active: Mutex<Option<ActiveTicker>>,
}

impl MonitorController {
    /// Create a stopped controller
    pub fn new(
        settings: MonitorSettings,
        probe: Arc<dyn Probe>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            context: Arc::new(TickContext {
                settings,
                probe,
                notifier,
                deliveries: TaskTracker::new(),
            }),
            active: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.context.settings
    }

    pub async fn state(&self) -> MonitorState {
        MonitorState {
            running: self.active.lock().await.is_some(),
        }
    }

    pub async fn is_running(&self) -> bool {
        self.state().await.running
    }

    /// Start periodic probing. A no-op when already running; `announce`
    /// mails the recipients only on a real transition.
    pub async fn start(&self, announce: bool) -> ToggleOutcome {
        let mut active = self.active.lock().await;
        if active.is_some() {
            debug!("start requested while already running");
            return ToggleOutcome::AlreadyOn;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_ticker(Arc::clone(&self.context), cancel.clone()));
        *active = Some(ActiveTicker { cancel, handle });

        info!(
            url = %self.context.settings.probe.endpoint_url,
            interval = ?self.context.settings.probe.interval,
            announce,
            "🟢 Monitoring turned ON"
        );
        if announce {
            self.announce(true);
        }
        ToggleOutcome::TurnedOn
    }

    /// Stop periodic probing. When this returns the ticker task has exited,
    /// so no further tick can start.
    pub async fn stop(&self, announce: bool) -> ToggleOutcome {
        let mut active = self.active.lock().await;
        let Some(ticker) = active.take() else {
            debug!("stop requested while already stopped");
            return ToggleOutcome::AlreadyOff;
        };

        ticker.cancel.cancel();
        if let Err(e) = ticker.handle.await {
            error!("❌ Ticker task ended abnormally: {}", e);
        }

        info!(
            url = %self.context.settings.probe.endpoint_url,
            announce,
            "🔴 Monitoring turned OFF"
        );
        if announce {
            self.announce(false);
        }
        ToggleOutcome::TurnedOff
    }

    /// Wait until every notification dispatched so far has been delivered
    /// or has failed
    pub async fn drain_deliveries(&self) {
        let deliveries = &self.context.deliveries;
        deliveries.close();
        deliveries.wait().await;
        deliveries.reopen();
    }

    /// Stop without announcing and flush pending deliveries
    pub async fn shutdown(&self) {
        self.stop(false).await;
        self.drain_deliveries().await;
        info!("🧹 Monitor shut down");
    }

    fn announce(&self, turned_on: bool) {
        let settings = &self.context.settings;
        self.context.dispatch(message::status_change(
            &settings.endpoint_title,
            turned_on,
            &message::now(),
            &settings.recipients,
        ));
    }
}

impl Drop for MonitorController {
    fn drop(&mut self) {
        if let Some(ticker) = self.active.get_mut().take() {
            ticker.cancel.cancel();
            ticker.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::{DeliveryError, NotificationRequest, RecordingNotifier};
    use crate::probe::{FailureReason, MockProbe, ProbeConfig, ProbeResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    const INTERVAL: Duration = Duration::from_secs(10);

    fn settings() -> MonitorSettings {
        MonitorSettings {
            endpoint_title: "Example API".to_string(),
            probe: ProbeConfig {
                endpoint_url: "https://example.com/health".to_string(),
                timeout: Duration::from_secs(5),
                verify_tls: true,
                expected_body_substring: None,
                interval: INTERVAL,
            },
            recipients: ["ops@example.com"].into_iter().collect(),
            delivery_timeout: Duration::from_secs(3),
        }
    }

    fn fixture(
        probe: MockProbe,
    ) -> (MonitorController, Arc<MockProbe>, Arc<RecordingNotifier>) {
        let probe = Arc::new(probe);
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = MonitorController::new(settings(), probe.clone(), notifier.clone());
        (controller, probe, notifier)
    }

    fn failing() -> ProbeResult {
        ProbeResult::Failure(FailureReason::UnexpectedStatus(503))
    }

    #[tokio::test]
    async fn test_initial_state_is_stopped() {
        let (controller, probe, _) = fixture(MockProbe::new(ProbeResult::Success));
        assert!(!controller.is_running().await);
        assert_eq!(controller.stop(true).await, ToggleOutcome::AlreadyOff);
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_keeps_one_ticker() {
        let (controller, probe, notifier) = fixture(MockProbe::new(ProbeResult::Success));

        assert_eq!(controller.start(false).await, ToggleOutcome::TurnedOn);
        assert_eq!(controller.start(true).await, ToggleOutcome::AlreadyOn);
        assert!(controller.is_running().await);

        sleep(INTERVAL * 3 + Duration::from_secs(1)).await;
        assert_eq!(probe.calls(), 3);

        controller.drain_deliveries().await;
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_one_interval() {
        let (controller, probe, _) = fixture(MockProbe::new(ProbeResult::Success));
        controller.start(false).await;

        sleep(INTERVAL - Duration::from_secs(1)).await;
        assert_eq!(probe.calls(), 0);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_twice_is_idempotent() {
        let (controller, _, notifier) = fixture(MockProbe::new(ProbeResult::Success));

        controller.start(false).await;
        assert_eq!(controller.stop(true).await, ToggleOutcome::TurnedOff);
        assert_eq!(controller.stop(true).await, ToggleOutcome::AlreadyOff);
        assert!(!controller.is_running().await);

        controller.drain_deliveries().await;
        assert_eq!(notifier.subjects(), vec!["[INFO] Example API monitor turned OFF"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_failing_tick_sends_one_urgent_mail() {
        let (controller, probe, notifier) = fixture(MockProbe::new(failing()));
        controller.start(false).await;

        sleep(INTERVAL * 2 + Duration::from_secs(1)).await;
        controller.drain_deliveries().await;

        assert_eq!(probe.calls(), 2);
        assert_eq!(notifier.count_tagged("[URGENT]"), 2);
        let sent = notifier.sent();
        assert_eq!(sent[0].subject, "[URGENT] Example API needs attention");
        assert!(sent[0].body.starts_with("https://example.com/health did not respond"));
        assert!(sent[0].body.contains("Status code was not expected: 503"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_ticks_send_nothing() {
        let (controller, probe, notifier) = fixture(MockProbe::new(ProbeResult::Success));
        controller.start(false).await;

        sleep(INTERVAL * 5 + Duration::from_secs(1)).await;
        controller.drain_deliveries().await;

        assert_eq!(probe.calls(), 5);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_probe_prevents_further_ticks() {
        let (controller, probe, notifier) = fixture(
            MockProbe::new(failing()).with_delay(Duration::from_secs(5)),
        );
        controller.start(false).await;

        // First tick at 10s, still probing at 12s
        sleep(INTERVAL + Duration::from_secs(2)).await;
        assert_eq!(probe.in_flight(), 1);

        assert_eq!(controller.stop(false).await, ToggleOutcome::TurnedOff);
        assert_eq!(probe.in_flight(), 0);

        sleep(INTERVAL * 5).await;
        controller.drain_deliveries().await;

        assert_eq!(probe.calls(), 1);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_probe_never_overlaps() {
        let (controller, probe, _) = fixture(
            MockProbe::new(ProbeResult::Success).with_delay(INTERVAL * 2 + Duration::from_secs(5)),
        );
        controller.start(false).await;

        sleep(INTERVAL * 10).await;
        controller.stop(false).await;

        assert!(probe.calls() >= 2);
        assert_eq!(probe.max_in_flight(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_does_not_overlap_old_ticker() {
        let (controller, probe, _) = fixture(
            MockProbe::new(ProbeResult::Success).with_delay(Duration::from_secs(8)),
        );

        for _ in 0..3 {
            controller.start(false).await;
            sleep(INTERVAL + Duration::from_secs(1)).await;
            controller.stop(false).await;
        }
        controller.start(false).await;
        sleep(INTERVAL * 3).await;

        assert_eq!(probe.max_in_flight(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_announced_transitions() {
        let (controller, _, notifier) = fixture(
            MockProbe::scripted(vec![failing()], ProbeResult::Success),
        );

        controller.start(true).await;
        sleep(INTERVAL + Duration::from_secs(1)).await;
        controller.stop(true).await;
        controller.drain_deliveries().await;

        let subjects = notifier.subjects();
        assert_eq!(subjects.len(), 3);
        assert_eq!(notifier.count_tagged("[INFO] Example API monitor turned ON"), 1);
        assert_eq!(notifier.count_tagged("[URGENT]"), 1);
        assert_eq!(notifier.count_tagged("[INFO] Example API monitor turned OFF"), 1);
        assert!(notifier.sent().iter().all(|r| r.recipients.joined() == "ops@example.com"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_delivery_keeps_ticking() {
        let probe = Arc::new(MockProbe::new(failing()));
        let notifier = Arc::new(RecordingNotifier::with_failure());
        let controller = MonitorController::new(settings(), probe.clone(), notifier.clone());

        controller.start(true).await;
        sleep(INTERVAL * 3 + Duration::from_secs(1)).await;
        controller.drain_deliveries().await;

        assert!(controller.is_running().await);
        assert_eq!(probe.calls(), 3);
        // ON announcement plus one per tick, each attempted once
        assert_eq!(notifier.sent().len(), 4);
    }

    struct HangingNotifier {
        attempts: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Notifier for HangingNotifier {
        async fn notify(&self, _request: &NotificationRequest) -> Result<(), DeliveryError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_delivery_is_bounded() {
        let probe = Arc::new(MockProbe::new(failing()));
        let notifier = Arc::new(HangingNotifier {
            attempts: AtomicUsize::new(0),
        });
        let controller = MonitorController::new(settings(), probe.clone(), notifier.clone());

        controller.start(false).await;
        sleep(INTERVAL * 2 + Duration::from_secs(1)).await;
        controller.shutdown().await;

        assert_eq!(probe.calls(), 2);
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 2);
        assert!(!controller.is_running().await);
    }

    struct PanickingProbe {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Probe for PanickingProbe {
        async fn check(&self, _config: &ProbeConfig) -> ProbeResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            panic!("probe exploded");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_probe_only_loses_its_tick() {
        let probe = Arc::new(PanickingProbe {
            calls: AtomicUsize::new(0),
        });
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = MonitorController::new(settings(), probe.clone(), notifier.clone());

        controller.start(false).await;
        sleep(INTERVAL * 3 + Duration::from_secs(1)).await;

        assert_eq!(probe.calls.load(Ordering::SeqCst), 3);
        assert!(controller.is_running().await);
        assert_eq!(controller.stop(false).await, ToggleOutcome::TurnedOff);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_toggles_leave_consistent_state() {
        let (controller, probe, notifier) = fixture(MockProbe::new(ProbeResult::Success));
        let controller = Arc::new(controller);

        let mut handles = Vec::new();
        for i in 0..20 {
            let controller = Arc::clone(&controller);
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    controller.start(true).await
                } else {
                    controller.stop(true).await
                }
            }));
        }
        let mut transitions = 0;
        for handle in handles {
            if handle.await.unwrap().is_transition() {
                transitions += 1;
            }
        }

        controller.start(false).await;
        sleep(INTERVAL * 2 + Duration::from_secs(1)).await;
        controller.drain_deliveries().await;

        assert_eq!(probe.max_in_flight(), 1);
        assert_eq!(probe.calls(), 2);
        assert_eq!(notifier.count_tagged("[INFO]"), transitions);
    }
}
