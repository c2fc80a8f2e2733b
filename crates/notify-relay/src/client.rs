//! Producer-side client for the publish endpoint.
//!
//! One attempt per notification, bounded by a request timeout. Producers
//! that need retries wrap this themselves.

use std::time::Duration;

use notify_relay_protocol::{Notification, PublishAck, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid notification: {0}")]
    Invalid(#[from] ValidationError),

    #[error("failed to reach relay: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("relay rejected notification ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected response from relay: {0}")]
    Decode(#[source] reqwest::Error),
}

/// HTTP client for `POST /notify`.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Transport)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Publish one notification. Invalid notifications never leave the
    /// process.
    pub async fn publish(&self, notification: &Notification) -> Result<PublishAck, ClientError> {
        notification.validate()?;

        let url = format!("{}/notify", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(notification)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("Relay at {} answered {}: {}", url, status, body);
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let ack = response
            .json::<PublishAck>()
            .await
            .map_err(ClientError::Decode)?;
        log::debug!("Notification [{}] accepted by {}", notification.kind, url);
        Ok(ack)
    }

    /// Announce a change to a catalogue service.
    pub async fn notify_service_event(
        &self,
        kind: &str,
        service_id: &str,
        name: &str,
        price: f64,
    ) -> Result<PublishAck, ClientError> {
        self.publish(&Notification::service_event(kind, service_id, name, price))
            .await
    }

    /// Announce a change to a service contract.
    pub async fn notify_contract_event(
        &self,
        kind: &str,
        contract_id: &str,
        service_id: &str,
        status: &str,
        amount: f64,
    ) -> Result<PublishAck, ClientError> {
        let notification =
            Notification::contract_event(kind, contract_id, service_id, status, amount);
        self.publish(&notification).await
    }

    /// Raise an `admin_alert` for the admin panel.
    pub async fn notify_admin_alert(
        &self,
        title: &str,
        message: &str,
        alert_kind: &str,
    ) -> Result<PublishAck, ClientError> {
        self.publish(&Notification::admin_alert(title, message, alert_kind))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = RelayClient::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_invalid_notification_not_sent() {
        // Nothing listens here; validation must fail before any request.
        let client = RelayClient::new("http://127.0.0.1:9", Duration::from_millis(100)).unwrap();
        let err = client
            .publish(&Notification::new("t", ""))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Invalid(ValidationError::MissingMessage)
        ));
    }

    #[tokio::test]
    async fn test_admin_alert_without_text_not_sent() {
        let client = RelayClient::new("http://127.0.0.1:9", Duration::from_millis(100)).unwrap();
        let err = client
            .notify_admin_alert("Disk", "", "warning")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Invalid(_)));
    }
}
