use super::{FailureReason, ProbeConfig, ProbeResult};

/// What came back from the endpoint when the transport succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Transport-level problems, before any HTTP status is known
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    TimedOut,
    Tls(String),
    Other(String),
}

/// Turn a transport outcome into a probe result.
///
/// Priority: transport failure, then status code, then body text.
pub fn classify(outcome: Result<HttpResponse, TransportFailure>, config: &ProbeConfig) -> ProbeResult {
    let response = match outcome {
        Ok(response) => response,
        Err(TransportFailure::Tls(_)) if config.verify_tls => {
            return ProbeResult::Failure(FailureReason::TlsError);
        }
        Err(_) => {
            return ProbeResult::Failure(FailureReason::Timeout {
                verify_tls: config.verify_tls,
            });
        }
    };

    if response.status != 200 {
        return ProbeResult::Failure(FailureReason::UnexpectedStatus(response.status));
    }

    if let Some(expected) = config.body_check() {
        if !serialized_body_contains(&response.body, expected) {
            return ProbeResult::Failure(FailureReason::BodyMismatch);
        }
    }

    ProbeResult::Success
}

/// The body is searched in its JSON string form, so quotes and control
/// characters appear escaped.
fn serialized_body_contains(body: &str, expected: &str) -> bool {
    serde_json::Value::String(body.to_owned())
        .to_string()
        .contains(expected)
}
