//! Endpoint probing
//!
//! One probe is one HTTP GET against the monitored endpoint. The outcome is
//! always a value ([`ProbeResult`]); nothing here returns an error to the
//! caller or retries.

pub mod classify;
pub mod http_probe;
pub mod mock;

pub use classify::{classify, HttpResponse, TransportFailure};
pub use http_probe::HttpProbe;
pub use mock::MockProbe;

use std::fmt;
use std::time::Duration;

/// Immutable settings shared by the probe and the monitor controller
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    pub endpoint_url: String,
    pub timeout: Duration,
    pub verify_tls: bool,
    pub expected_body_substring: Option<String>,
    pub interval: Duration,
}

impl ProbeConfig {
    /// Substring the body must contain, if one is configured and non-empty
    pub fn body_check(&self) -> Option<&str> {
        self.expected_body_substring
            .as_deref()
            .filter(|text| !text.is_empty())
    }
}

/// Why a probe failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Transport failure or timeout. `verify_tls` only affects the message.
    Timeout { verify_tls: bool },
    TlsError,
    UnexpectedStatus(u16),
    BodyMismatch,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Timeout { verify_tls: false } => write!(f, "Request timed out"),
            FailureReason::Timeout { verify_tls: true } | FailureReason::TlsError => {
                write!(f, "Request timed out or SSL was expired / invalid")
            }
            FailureReason::UnexpectedStatus(code) => {
                write!(f, "Status code was not expected: {}", code)
            }
            FailureReason::BodyMismatch => write!(f, "Expected body text not found in response"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Success,
    Failure(FailureReason),
}

impl ProbeResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeResult::Success)
    }
}

/// A single check of the monitored endpoint
#[async_trait::async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self, config: &ProbeConfig) -> ProbeResult;
}
