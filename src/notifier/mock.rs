use std::sync::Mutex;

use super::{DeliveryError, NotificationRequest, Notifier};

/// Notifier that keeps every request in memory
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<NotificationRequest>>,
    pub should_fail: bool,
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            should_fail: false,
        }
    }

    /// Records the request, then reports a transport failure
    pub fn with_failure() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            should_fail: true,
        }
    }

    pub fn sent(&self) -> Vec<NotificationRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent().into_iter().map(|request| request.subject).collect()
    }

    /// Number of recorded requests whose subject starts with `tag`
    pub fn count_tagged(&self, tag: &str) -> usize {
        self.subjects().iter().filter(|s| s.starts_with(tag)).count()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, request: &NotificationRequest) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(request.clone());
        if self.should_fail {
            return Err(DeliveryError::Transport("Mock failure".to_string()));
        }
        Ok(())
    }
}
