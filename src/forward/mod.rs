//! Delivery of parsed documents to a receiving application.
//!
//! Each [`Document`] becomes one [`ForwardMessage`], a flat record whose keys
//! match what the receiver expects. The [`Forwarder`] trait is the only seam
//! between the feeder and the receiver; how a message travels is up to the
//! implementation:
//!
//! - [`JsonLinesForwarder`]: one JSON object per line on any writer (stdout by default)
//! - [`HttpForwarder`]: POST the JSON object to an endpoint
//! - [`MemoryForwarder`]: keep messages in memory, for tests

mod http;
mod json_lines;
pub mod mock;

pub use http::HttpForwarder;
pub use json_lines::JsonLinesForwarder;
pub use mock::MemoryForwarder;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::FeederSettings;
use crate::models::{encode_authors, AuthorName, Document};

/// Payload delivered to the receiving application for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardMessage {
    #[serde(rename = "feeder:name")]
    pub feeder_name: String,

    /// Attachment (PDF) URL, empty when the entry has none
    #[serde(rename = "feeder:attachment", default)]
    pub attachment: String,

    /// The URI the feeder was invoked with
    #[serde(rename = "feeder:uri")]
    pub source_uri: String,

    #[serde(rename = "document:title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "document:arxiv", default, skip_serializing_if = "Option::is_none")]
    pub arxiv_id: Option<String>,

    #[serde(rename = "document:abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,

    #[serde(rename = "document:url", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(rename = "document:type")]
    pub document_type: String,

    /// JSON array of `{"forename", "surname"}` objects in feed order
    #[serde(rename = "document:authors")]
    pub authors: String,
}

impl ForwardMessage {
    /// Build the payload for one document
    pub fn from_document(
        document: &Document,
        feeder: &FeederSettings,
        source_uri: &str,
    ) -> Result<Self, ForwardError> {
        Ok(Self {
            feeder_name: feeder.name.clone(),
            attachment: document.attachment_link().unwrap_or_default().to_string(),
            source_uri: source_uri.to_string(),
            title: document.title().map(str::to_string),
            arxiv_id: document.external_id().map(str::to_string),
            abstract_text: document.abstract_text().map(str::to_string),
            url: document.primary_link().map(str::to_string),
            document_type: feeder.document_type.clone(),
            authors: encode_authors(document.authors())?,
        })
    }

    /// Decode the author list carried in `document:authors`
    pub fn author_names(&self) -> Result<Vec<AuthorName>, ForwardError> {
        Ok(serde_json::from_str(&self.authors)?)
    }
}

/// A destination for forwarded documents
#[async_trait]
pub trait Forwarder: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this destination
    fn name(&self) -> &str;

    /// Deliver one message
    async fn forward(&self, message: &ForwardMessage) -> Result<(), ForwardError>;
}

/// Errors that can occur while forwarding a document
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The payload could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// The receiver could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    /// The receiver answered with a non-2xx status
    #[error("Receiver rejected document (status {status}): {body}")]
    Rejected { status: u16, body: String },

    /// Writing to the output failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ForwardError {
    fn from(err: serde_json::Error) -> Self {
        ForwardError::Encode(format!("JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentBuilder;

    fn sample_document() -> Document {
        let mut builder = DocumentBuilder::new();
        builder
            .title("On Things")
            .abstract_text("About things.")
            .primary_link("http://arxiv.org/abs/1234.5678v1")
            .attachment_link("http://arxiv.org/pdf/1234.5678v1")
            .author("Jane Q. Public")
            .author("Plato");
        builder.build()
    }

    #[test]
    fn test_message_from_document() {
        let message = ForwardMessage::from_document(
            &sample_document(),
            &FeederSettings::default(),
            "https://arxiv.org/pdf/1234.5678.pdf",
        )
        .unwrap();

        assert_eq!(message.feeder_name, "Scholarley arXiv Feeder");
        assert_eq!(message.attachment, "http://arxiv.org/pdf/1234.5678v1");
        assert_eq!(message.source_uri, "https://arxiv.org/pdf/1234.5678.pdf");
        assert_eq!(message.title.as_deref(), Some("On Things"));
        assert_eq!(message.arxiv_id.as_deref(), Some("1234.5678v1"));
        assert_eq!(message.url.as_deref(), Some("http://arxiv.org/abs/1234.5678v1"));
        assert_eq!(message.document_type, "Journal Article");

        let authors = message.author_names().unwrap();
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].forename, "Jane Q.");
        assert_eq!(authors[0].surname, "Public");
        assert_eq!(authors[1].forename, "");
        assert_eq!(authors[1].surname, "Plato");
    }

    #[test]
    fn test_message_wire_keys() {
        let message = ForwardMessage::from_document(
            &sample_document(),
            &FeederSettings::default(),
            "https://arxiv.org/abs/1234.5678",
        )
        .unwrap();

        let value = serde_json::to_value(&message).unwrap();
        for key in [
            "feeder:name",
            "feeder:attachment",
            "feeder:uri",
            "document:title",
            "document:arxiv",
            "document:abstract",
            "document:url",
            "document:type",
            "document:authors",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert!(value["document:authors"].is_string());
    }

    #[test]
    fn test_message_for_sparse_document() {
        let message = ForwardMessage::from_document(
            &DocumentBuilder::new().build(),
            &FeederSettings::default(),
            "https://arxiv.org/abs/0000.0000",
        )
        .unwrap();

        assert_eq!(message.attachment, "");
        assert_eq!(message.authors, "[]");

        let value = serde_json::to_value(&message).unwrap();
        assert!(value.get("document:title").is_none());
        assert!(value.get("document:arxiv").is_none());
        assert_eq!(value["feeder:attachment"], "");
    }
}
