//! HTTP client utilities.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::HttpSettings;
use crate::feed::FeedError;

/// Shared HTTP client with bounded connect and read timeouts
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client from settings
    pub fn new(settings: &HttpSettings) -> Result<Self, FeedError> {
        let user_agent = settings.user_agent.clone().unwrap_or_else(|| {
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
        });

        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .read_timeout(Duration::from_secs(settings.read_timeout_secs))
            .build()
            .map_err(|e| FeedError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// GET a URL and return the response body.
    ///
    /// Any non-2xx status is reported as a network error.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        tracing::debug!(url, "Fetching");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/atom+xml")
            .send()
            .await
            .map_err(|e| FeedError::Network(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Network(format!(
                "{} returned status: {}",
                url, status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Network(format!("Failed to read response: {}", e)))?;

        tracing::debug!(url, bytes = body.len(), "Fetched");
        Ok(body.to_vec())
    }

    /// Like [`fetch`](Self::fetch), but gives up as soon as `cancel` fires.
    /// A cancelled fetch returns [`FeedError::Cancelled`] and no body.
    pub async fn fetch_cancellable(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, FeedError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FeedError::Cancelled),
            result = self.fetch(url) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_from_default_settings() {
        let client = HttpClient::new(&HttpSettings::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_cancelled_before_start() {
        let client = HttpClient::new(&HttpSettings::default()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Unroutable address: only cancellation can end this quickly
        let result = client
            .fetch_cancellable("http://10.255.255.1/api/query", &cancel)
            .await;
        assert!(matches!(result, Err(FeedError::Cancelled)));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let client = HttpClient::new(&HttpSettings::default()).unwrap();
        let result = client.fetch("http://127.0.0.1:1/api/query").await;
        assert!(matches!(result, Err(FeedError::Network(_))));
    }
}
