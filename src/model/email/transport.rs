use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

/// The email transport in managed state. Shared with background tasks, hence `Arc`.
pub type Mailer = Arc<dyn EmailTransport>;

/// A rendered message, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("Email API rejected message with status {0}: {1}")]
    Rejected(u16, String),
}

/// Something that can deliver an email.
#[rocket::async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), TransportError>;
}

/// Delivers email through the Resend HTTP API.
pub struct ResendTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl ResendTransport {
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.resend.com/emails";

    pub fn new(endpoint: String, api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            from,
        }
    }
}

/// Request body for the Resend API.
#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[rocket::async_trait]
impl EmailTransport for ResendTransport {
    async fn send(&self, email: &Email) -> Result<(), TransportError> {
        let body = SendRequest {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_default();
            Err(TransportError::Rejected(status.as_u16(), detail))
        }
    }
}

/// A transport that records every message instead of sending it.
/// Delivery to any address containing `fail` is rejected.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingTransport {
    sent: std::sync::Mutex<Vec<Email>>,
}

#[cfg(test)]
impl RecordingTransport {
    /// All successfully "delivered" messages so far.
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[rocket::async_trait]
impl EmailTransport for RecordingTransport {
    async fn send(&self, email: &Email) -> Result<(), TransportError> {
        if email.to.contains("fail") {
            return Err(TransportError::Rejected(422, format!("Invalid `to`: {}", email.to)));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
