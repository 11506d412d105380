use std::sync::Arc;

use crate::monitor::MonitorController;

/// Text responses for the three control operations
#[derive(Clone)]
pub struct ControlSurface {
    controller: Arc<MonitorController>,
}

impl ControlSurface {
    pub fn new(controller: Arc<MonitorController>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &Arc<MonitorController> {
        &self.controller
    }

    /// Endpoint, current state and usage hints
    pub async fn status(&self) -> String {
        let state = self.controller.state().await;
        format!(
            "The monitoring service for {} is currently {}.\n\n\
             /start will turn monitoring on\n\
             /stop will turn monitoring off",
            self.controller.settings().probe.endpoint_url,
            state.label()
        )
    }

    pub async fn start(&self) -> String {
        self.controller.start(true).await.to_string()
    }

    pub async fn stop(&self) -> String {
        self.controller.stop(true).await.to_string()
    }
}
