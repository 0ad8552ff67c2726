//! Fetch, parse and forward the metadata of one arXiv article.
//!
//! The feeder is invoked with the URI of an article (usually its PDF link).
//! It derives the arXiv id from that URI, queries the arXiv API for the Atom
//! entry, parses it and hands every resulting document to a [`Forwarder`].
//! Forwarding only starts once the whole feed has been parsed.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, FeederSettings};
use crate::feed::{FeedError, FeedParser};
use crate::forward::{ForwardError, ForwardMessage, Forwarder};
use crate::models::{last_path_segment, Document};
use crate::utils::HttpClient;

/// Errors from a complete feeder run
#[derive(Debug, thiserror::Error)]
pub enum FeederError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Forward(#[from] ForwardError),
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedReport {
    pub arxiv_id: String,
    pub query_url: String,
    pub forwarded: usize,
}

/// Pipeline from an article URI to the receiving application
#[derive(Debug, Clone)]
pub struct Feeder {
    client: HttpClient,
    parser: FeedParser,
    settings: FeederSettings,
    forwarder: Arc<dyn Forwarder>,
}

impl Feeder {
    /// Build a feeder from configuration
    pub fn new(config: &Config, forwarder: Arc<dyn Forwarder>) -> Result<Self, FeederError> {
        Ok(Self {
            client: HttpClient::new(&config.http)?,
            parser: FeedParser::with_options(config.parser.options()),
            settings: config.feeder.clone(),
            forwarder,
        })
    }

    /// Fetch and parse the feed for the article at `source_uri`
    pub async fn fetch_documents(
        &self,
        source_uri: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Document>, FeedError> {
        let arxiv_id = arxiv_id_from_uri(source_uri)?;
        let url = query_url(&self.settings.api_url, &arxiv_id)?;
        self.fetch_and_parse(&url, cancel).await
    }

    async fn fetch_and_parse(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Document>, FeedError> {
        let body = self.client.fetch_cancellable(url, cancel).await?;
        self.parser.parse(body.as_slice())
    }

    /// Run the whole pipeline for one article URI.
    ///
    /// Nothing is forwarded unless the feed was fetched and parsed in full.
    /// The first forwarding failure ends the run.
    pub async fn run(
        &self,
        source_uri: &str,
        cancel: &CancellationToken,
    ) -> Result<FeedReport, FeederError> {
        let arxiv_id = arxiv_id_from_uri(source_uri)?;
        let url = query_url(&self.settings.api_url, &arxiv_id)?;

        tracing::info!(%arxiv_id, url = %url, "Fetching arXiv metadata");
        let documents = self.fetch_and_parse(&url, cancel).await?;
        if documents.is_empty() {
            tracing::warn!(%arxiv_id, "arXiv returned no entries");
        }

        for document in &documents {
            if cancel.is_cancelled() {
                return Err(FeedError::Cancelled.into());
            }
            let message = ForwardMessage::from_document(document, &self.settings, source_uri)?;
            self.forwarder.forward(&message).await?;
            tracing::debug!(
                id = message.arxiv_id.as_deref().unwrap_or("-"),
                forwarder = self.forwarder.name(),
                "Forwarded document"
            );
        }

        tracing::info!(
            %arxiv_id,
            forwarded = documents.len(),
            forwarder = self.forwarder.name(),
            "Done"
        );

        Ok(FeedReport {
            arxiv_id,
            query_url: url,
            forwarded: documents.len(),
        })
    }
}

/// Extract the arXiv id from an article URI.
///
/// The id is the last path segment with any `.pdf` suffix removed, so both
/// `https://arxiv.org/pdf/1234.5678v2.pdf` and `https://arxiv.org/abs/1234.5678v2`
/// give `1234.5678v2`.
pub fn arxiv_id_from_uri(uri: &str) -> Result<String, FeedError> {
    let segment = last_path_segment(uri.trim())
        .ok_or_else(|| FeedError::InvalidRequest(format!("No arXiv id in URI: {}", uri)))?;

    let id = segment.strip_suffix(".pdf").unwrap_or(&segment);
    if id.is_empty() {
        return Err(FeedError::InvalidRequest(format!(
            "No arXiv id in URI: {}",
            uri
        )));
    }

    Ok(id.to_string())
}

/// Build the arXiv API query URL for a single id
pub fn query_url(api_url: &str, arxiv_id: &str) -> Result<String, FeedError> {
    let mut url = url::Url::parse(api_url)
        .map_err(|e| FeedError::InvalidRequest(format!("Invalid API URL {}: {}", api_url, e)))?;
    url.query_pairs_mut().append_pair("id_list", arxiv_id);
    Ok(url.to_string())
}
