//! arXiv Atom feed retrieval and parsing.
//!
//! The [`FeedParser`] turns an Atom document into an ordered list of
//! [`Document`](crate::models::Document)s in a single forward pass. It is pure:
//! it reads from any [`std::io::Read`] and shares no state between calls, so
//! several feeds can be parsed concurrently.
//!
//! # Example
//!
//! ```rust
//! use arxiv_feeder::feed::FeedParser;
//!
//! let xml = r#"<feed>
//!   <entry>
//!     <title>On Things</title>
//!     <link rel="alternate" href="http://arxiv.org/abs/1234.5678v1"/>
//!     <author><name>Jane Q. Public</name></author>
//!   </entry>
//! </feed>"#;
//!
//! let documents = FeedParser::new().parse(xml.as_bytes()).unwrap();
//! assert_eq!(documents.len(), 1);
//! assert_eq!(documents[0].external_id(), Some("1234.5678v1"));
//! ```

mod parser;

pub use parser::{FeedParser, ParserOptions};

/// Errors that can occur while fetching or parsing a feed
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Fetch failed: timeout, connection refused or non-2xx response
    #[error("Network error: {0}")]
    Network(String),

    /// The document is not well-formed XML
    #[error("Malformed feed: {0}")]
    MalformedFeed(String),

    /// Well-formed XML without the expected feed structure
    #[error("Unexpected feed structure: {0}")]
    ParseStructure(String),

    /// The request could not be built (e.g. no arXiv id in the URI)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The caller cancelled the fetch before it completed
    #[error("Fetch cancelled")]
    Cancelled,
}

impl From<quick_xml::Error> for FeedError {
    fn from(err: quick_xml::Error) -> Self {
        FeedError::MalformedFeed(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for FeedError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        FeedError::MalformedFeed(format!("attribute: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            FeedError::ParseStructure("expected <feed>".to_string()).to_string(),
            "Unexpected feed structure: expected <feed>"
        );
        assert_eq!(FeedError::Cancelled.to_string(), "Fetch cancelled");
    }
}
