use std::error::Error as _;

use tracing::debug;

use super::classify::{classify, HttpResponse, TransportFailure};
use super::{Probe, ProbeConfig, ProbeResult};

/// Probe backed by a reqwest client.
///
/// TLS verification is fixed when the client is built; the timeout is
/// applied to every request so the transport itself enforces it.
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(config: &ProbeConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(config.timeout)
            .user_agent(concat!("webcheck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    async fn fetch(&self, config: &ProbeConfig) -> Result<HttpResponse, TransportFailure> {
        let response = self
            .client
            .get(&config.endpoint_url)
            .timeout(config.timeout)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status().as_u16();

        // Only read the body when it will be inspected
        let body = if status == 200 && config.body_check().is_some() {
            response.text().await.map_err(transport_failure)?
        } else {
            String::new()
        };

        Ok(HttpResponse { status, body })
    }
}

#[async_trait::async_trait]
impl Probe for HttpProbe {
    async fn check(&self, config: &ProbeConfig) -> ProbeResult {
        let outcome = self.fetch(config).await;
        if let Err(failure) = &outcome {
            debug!(url = %config.endpoint_url, ?failure, "probe transport failure");
        }
        classify(outcome, config)
    }
}

fn transport_failure(err: reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        return TransportFailure::TimedOut;
    }

    // The URL is not part of the failure, keep it out of the text
    let err = err.without_url();

    let mut chain = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    let detail = std::iter::once(err.to_string())
        .chain(chain)
        .collect::<Vec<_>>()
        .join(": ");

    if mentions_tls(&detail) {
        TransportFailure::Tls(detail)
    } else {
        TransportFailure::Other(detail)
    }
}

fn mentions_tls(detail: &str) -> bool {
    let lower = detail.to_lowercase();
    ["certificate", "tls", "ssl", "handshake"]
        .iter()
        .any(|needle| lower.contains(needle))
}
