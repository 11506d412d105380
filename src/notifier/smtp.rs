use std::time::Duration;

use lettre::message::header::{self, ContentType};
use lettre::message::{Mailbox, Mailboxes, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use super::{DeliveryError, NotificationRequest, Notifier};
use crate::config::email_config::EmailConfig;

/// Sends notifications through an authenticated SMTP relay
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// `service` is a well-known provider name (`Gmail`) or a relay host
    pub fn new(
        service: &str,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let host = relay_host(service)
            .ok_or_else(|| DeliveryError::UnknownService(service.to_string()))?;

        let from = format!("WebCheck <{}>", username)
            .parse::<Mailbox>()
            .map_err(|e| DeliveryError::InvalidAddress {
                address: username.to_string(),
                reason: e.to_string(),
            })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .map_err(|e| DeliveryError::Transport(e.to_string()))?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .timeout(Some(timeout))
            .build();

        debug!(%host, "SMTP relay configured");
        Ok(Self { transport, from })
    }

    pub fn from_config(config: &EmailConfig) -> Result<Self, DeliveryError> {
        Self::new(
            &config.service,
            config.username.as_deref().unwrap_or_default(),
            config.password.as_deref().unwrap_or_default(),
            config.timeout(),
        )
    }

    /// One message for all recipients, plain text with an HTML alternative
    fn build_message(&self, request: &NotificationRequest) -> Result<Message, DeliveryError> {
        let joined = request.recipients.joined();
        let to = joined
            .parse::<Mailboxes>()
            .map_err(|e| DeliveryError::InvalidAddress {
                address: joined.clone(),
                reason: e.to_string(),
            })?;

        Message::builder()
            .from(self.from.clone())
            .mailbox(header::To::from(to))
            .subject(request.subject.clone())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(request.body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(request.html_body()),
                    ),
            )
            .map_err(|e| DeliveryError::Build(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, request: &NotificationRequest) -> Result<(), DeliveryError> {
        let message = self.build_message(request)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        debug!(code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }
}

/// Map a provider name to its submission host. Anything that looks like a
/// hostname is used as-is.
fn relay_host(service: &str) -> Option<String> {
    let service = service.trim();
    let known = match service.to_lowercase().as_str() {
        "gmail" | "googlemail" => Some("smtp.gmail.com"),
        "outlook" | "outlook365" | "hotmail" | "live" => Some("smtp-mail.outlook.com"),
        "yahoo" => Some("smtp.mail.yahoo.com"),
        "icloud" => Some("smtp.mail.me.com"),
        "zoho" => Some("smtp.zoho.com"),
        "sendgrid" => Some("smtp.sendgrid.net"),
        "mailgun" => Some("smtp.mailgun.org"),
        _ => None,
    };

    match known {
        Some(host) => Some(host.to_string()),
        None if service.contains('.') && !service.contains(char::is_whitespace) => {
            Some(service.to_string())
        }
        None => None,
    }
}
