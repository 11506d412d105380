use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use super::MonitorSettings;
use crate::notifier::{message, DeliveryError, NotificationRequest, Notifier};
use crate::probe::{Probe, ProbeResult};

/// State shared by the controller and its ticker task
pub(crate) struct TickContext {
    pub settings: MonitorSettings,
    pub probe: Arc<dyn Probe>,
    pub notifier: Arc<dyn Notifier>,
    /// Deliveries in flight, detached from tick execution
    pub deliveries: TaskTracker,
}

impl TickContext {
    /// Send `request` in the background with a bounded timeout
    pub fn dispatch(&self, request: NotificationRequest) {
        let notifier = Arc::clone(&self.notifier);
        let limit = self.settings.delivery_timeout;
        self.deliveries
            .spawn(async move { deliver(notifier.as_ref(), &request, limit).await });
    }

    fn handle_result(&self, result: ProbeResult) {
        let url = &self.settings.probe.endpoint_url;
        match result {
            ProbeResult::Success => {
                info!(endpoint_success = "Endpoint response verified", %url);
            }
            ProbeResult::Failure(reason) => {
                warn!(endpoint_error = %reason, %url);
                self.dispatch(message::endpoint_failure(
                    &self.settings.endpoint_title,
                    url,
                    &reason,
                    &message::now(),
                    &self.settings.recipients,
                ));
            }
        }
    }
}

/// Drive one probe per interval until `cancel` fires.
///
/// Ticks run one at a time on this task; an interval that elapses while a
/// tick is still running is skipped. Each probe runs in its own task so a
/// panic only loses that tick.
pub(crate) async fn run_ticker(context: Arc<TickContext>, cancel: CancellationToken) {
    let period = context.settings.probe.interval;
    let mut timer = time::interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    debug!(?period, "ticker started");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = timer.tick() => {}
        }

        let tick_context = Arc::clone(&context);
        let mut tick = tokio::spawn(async move {
            tick_context
                .probe
                .check(&tick_context.settings.probe)
                .await
        });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tick.abort();
                let _ = (&mut tick).await;
                debug!("probe in flight abandoned");
                break;
            }
            joined = &mut tick => {
                match joined {
                    Ok(result) => context.handle_result(result),
                    Err(e) => error!("❌ Tick failed: {}", e),
                }
            }
        }
    }

    debug!("ticker stopped");
}

async fn deliver(notifier: &dyn Notifier, request: &NotificationRequest, limit: Duration) {
    let outcome = match time::timeout(limit, notifier.notify(request)).await {
        Ok(result) => result,
        Err(_) => Err(DeliveryError::TimedOut(limit)),
    };

    match outcome {
        Ok(()) => info!(
            email_success = %request.subject,
            recipients = %request.recipients
        ),
        Err(e) => error!(email_error = %e, subject = %request.subject),
    }
}
