use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MonitorConfig {
    #[serde(default = "default_interval_in_seconds")]
    pub interval_in_seconds: u64,
    #[serde(default = "default_timeout_in_seconds")]
    pub timeout_in_seconds: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_in_seconds: default_interval_in_seconds(),
            timeout_in_seconds: default_timeout_in_seconds(),
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_in_seconds)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_in_seconds)
    }
}

fn default_interval_in_seconds() -> u64 {
    60
}

fn default_timeout_in_seconds() -> u64 {
    10
}
