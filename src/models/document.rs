//! Document model representing one arXiv entry parsed from an Atom feed.

use serde::{Deserialize, Serialize};

/// One article parsed from an arXiv Atom feed.
///
/// Documents are produced by [`DocumentBuilder`] while the feed is being read
/// and never change afterwards. The external identifier is derived from the
/// primary link, so the two are always consistent. Deserialisation goes
/// through the builder as well; a serialised `external_id` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DocumentRecord")]
pub struct Document {
    title: Option<String>,
    abstract_text: Option<String>,
    primary_link: Option<String>,
    attachment_link: Option<String>,
    authors: Vec<String>,
    external_id: Option<String>,
}

impl Document {
    /// Article title as written in the feed
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Abstract with newlines and whitespace runs collapsed to single spaces
    pub fn abstract_text(&self) -> Option<&str> {
        self.abstract_text.as_deref()
    }

    /// URL of the `rel="alternate"` link (the abstract page)
    pub fn primary_link(&self) -> Option<&str> {
        self.primary_link.as_deref()
    }

    /// URL of the `rel="related"` link (usually the PDF)
    pub fn attachment_link(&self) -> Option<&str> {
        self.attachment_link.as_deref()
    }

    /// Author full names in feed order
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Identifier taken from the last path segment of the primary link
    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }
}

/// Serialised form of a [`Document`] without the derived identifier
#[derive(Default, Deserialize)]
#[serde(default)]
struct DocumentRecord {
    title: Option<String>,
    abstract_text: Option<String>,
    primary_link: Option<String>,
    attachment_link: Option<String>,
    authors: Vec<String>,
}

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        let mut builder = DocumentBuilder::new();
        if let Some(title) = record.title {
            builder.title(title);
        }
        if let Some(abstract_text) = record.abstract_text {
            builder.abstract_text(abstract_text);
        }
        if let Some(link) = record.primary_link {
            builder.primary_link(link);
        }
        if let Some(link) = record.attachment_link {
            builder.attachment_link(link);
        }
        for author in record.authors {
            builder.author(author);
        }
        builder.build()
    }
}

/// Incremental constructor for [`Document`], used by the feed parser.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set title
    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.document.title = Some(title.into());
        self
    }

    /// Set abstract
    pub fn abstract_text(&mut self, abstract_text: impl Into<String>) -> &mut Self {
        self.document.abstract_text = Some(abstract_text.into());
        self
    }

    /// Set the primary link and recompute the external identifier from it
    pub fn primary_link(&mut self, link: impl Into<String>) -> &mut Self {
        let link = link.into();
        self.document.external_id = last_path_segment(&link);
        self.document.primary_link = Some(link);
        self
    }

    /// Set the attachment link
    pub fn attachment_link(&mut self, link: impl Into<String>) -> &mut Self {
        self.document.attachment_link = Some(link.into());
        self
    }

    /// Append an author name
    pub fn author(&mut self, name: impl Into<String>) -> &mut Self {
        self.document.authors.push(name.into());
        self
    }

    /// Finish the document
    pub fn build(self) -> Document {
        self.document
    }
}

/// Returns the last non-empty path segment of a URL, percent-decoded.
///
/// Query strings and fragments are ignored. Strings that do not parse as an
/// absolute URL are treated as a bare path. A segment whose escapes do not
/// decode to UTF-8 is returned as written.
pub fn last_path_segment(link: &str) -> Option<String> {
    if let Ok(url) = url::Url::parse(link) {
        return url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(decode_segment);
    }

    let path = link.split(['?', '#']).next().unwrap_or(link);
    path.split('/')
        .filter(|s| !s.is_empty())
        .last()
        .map(decode_segment)
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_derives_external_id() {
        let mut builder = DocumentBuilder::new();
        builder
            .title("Attention Is All You Need")
            .primary_link("http://arxiv.org/abs/1706.03762v5")
            .author("Ashish Vaswani")
            .author("Noam Shazeer");
        let doc = builder.build();

        assert_eq!(doc.title(), Some("Attention Is All You Need"));
        assert_eq!(doc.primary_link(), Some("http://arxiv.org/abs/1706.03762v5"));
        assert_eq!(doc.external_id(), Some("1706.03762v5"));
        assert_eq!(doc.authors(), ["Ashish Vaswani", "Noam Shazeer"]);
        assert_eq!(doc.attachment_link(), None);
    }

    #[test]
    fn test_external_id_follows_primary_link() {
        let mut builder = DocumentBuilder::new();
        builder.primary_link("https://arxiv.org/abs/1111.2222");
        builder.primary_link("https://arxiv.org/abs/3333.4444");
        let doc = builder.build();

        assert_eq!(doc.external_id(), Some("3333.4444"));
    }

    #[test]
    fn test_no_primary_link_no_external_id() {
        let mut builder = DocumentBuilder::new();
        builder.title("Untitled");
        let doc = builder.build();

        assert_eq!(doc.primary_link(), None);
        assert_eq!(doc.external_id(), None);
    }

    #[test]
    fn test_empty_primary_link() {
        let mut builder = DocumentBuilder::new();
        builder.primary_link("");
        let doc = builder.build();

        assert_eq!(doc.primary_link(), Some(""));
        assert_eq!(doc.external_id(), None);
    }

    #[test]
    fn test_last_path_segment() {
        assert_eq!(
            last_path_segment("https://X/abc.123"),
            Some("abc.123".to_string())
        );
        assert_eq!(
            last_path_segment("https://arxiv.org/abs/2301.12345/"),
            Some("2301.12345".to_string())
        );
        assert_eq!(
            last_path_segment("https://arxiv.org/abs/2301.12345?context=cs#top"),
            Some("2301.12345".to_string())
        );
        // Old-style identifiers keep only their numeric tail
        assert_eq!(
            last_path_segment("http://arxiv.org/abs/hep-th/9901001v1"),
            Some("9901001v1".to_string())
        );
        assert_eq!(last_path_segment("abs/1234.5678"), Some("1234.5678".to_string()));
        assert_eq!(last_path_segment("https://arxiv.org/"), None);
        assert_eq!(last_path_segment(""), None);
    }

    #[test]
    fn test_last_path_segment_percent_decoded() {
        assert_eq!(
            last_path_segment("https://arxiv.org/abs/hep-th%2F9901001"),
            Some("hep-th/9901001".to_string())
        );
        assert_eq!(
            last_path_segment("abs/1234%2E5678"),
            Some("1234.5678".to_string())
        );
        // Invalid UTF-8 after decoding is kept verbatim
        assert_eq!(
            last_path_segment("https://arxiv.org/abs/%FF"),
            Some("%FF".to_string())
        );
    }

    #[test]
    fn test_builder_decodes_external_id() {
        let mut builder = DocumentBuilder::new();
        builder.primary_link("http://arxiv.org/abs/math%2F0211159v1");
        let doc = builder.build();

        assert_eq!(doc.primary_link(), Some("http://arxiv.org/abs/math%2F0211159v1"));
        assert_eq!(doc.external_id(), Some("math/0211159v1"));
    }

    #[test]
    fn test_deserialize_recomputes_external_id() {
        let json = r#"{
            "title": "A",
            "primary_link": "https://x/abc.1",
            "authors": ["Jane Doe"],
            "external_id": "WRONG"
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();

        assert_eq!(doc.external_id(), Some("abc.1"));
        assert_eq!(doc.title(), Some("A"));
        assert_eq!(doc.authors(), ["Jane Doe"]);
    }

    #[test]
    fn test_deserialize_without_link_has_no_external_id() {
        let doc: Document = serde_json::from_str(r#"{"external_id": "WRONG"}"#).unwrap();
        assert_eq!(doc.external_id(), None);
        assert_eq!(doc, Document::default());
    }

    #[test]
    fn test_serialize_round_trip_keeps_document() {
        let mut builder = DocumentBuilder::new();
        builder
            .title("T")
            .primary_link("https://arxiv.org/abs/2301.12345")
            .attachment_link("https://arxiv.org/pdf/2301.12345");
        let doc = builder.build();

        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
