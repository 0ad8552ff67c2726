//! Forwarding to an HTTP receiver.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{ForwardError, ForwardMessage, Forwarder};
use crate::config::HttpSettings;

/// POSTs each message as a JSON body to a receiver endpoint
#[derive(Debug, Clone)]
pub struct HttpForwarder {
    client: Client,
    endpoint: String,
}

impl HttpForwarder {
    /// Create a forwarder for `endpoint`, reusing the fetch timeouts
    pub fn new(endpoint: impl Into<String>, settings: &HttpSettings) -> Result<Self, ForwardError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .read_timeout(Duration::from_secs(settings.read_timeout_secs))
            .build()
            .map_err(|e| ForwardError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Forwarder for HttpForwarder {
    fn name(&self) -> &str {
        "http"
    }

    async fn forward(&self, message: &ForwardMessage) -> Result<(), ForwardError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                ForwardError::Transport(format!("Failed to reach {}: {}", self.endpoint, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ForwardError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(endpoint = %self.endpoint, status = status.as_u16(), "Receiver accepted document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeederSettings;
    use crate::models::DocumentBuilder;

    #[tokio::test]
    async fn test_unreachable_receiver_is_transport_error() {
        let forwarder =
            HttpForwarder::new("http://127.0.0.1:1/documents", &HttpSettings::default()).unwrap();
        let mut builder = DocumentBuilder::new();
        builder.title("T");
        let message = ForwardMessage::from_document(
            &builder.build(),
            &FeederSettings::default(),
            "https://arxiv.org/abs/1234.5678",
        )
        .unwrap();

        let result = forwarder.forward(&message).await;
        match result {
            Err(ForwardError::Transport(msg)) => assert!(msg.contains("127.0.0.1:1")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
