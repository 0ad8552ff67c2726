//! Single-pass Atom feed parser built on quick-xml's pull reader.

use std::io::{BufRead, BufReader, Read};
use std::sync::OnceLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use regex::Regex;

use super::FeedError;
use crate::models::{Document, DocumentBuilder};

const FEED: &str = "feed";
const ENTRY: &str = "entry";
const TITLE: &str = "title";
const SUMMARY: &str = "summary";
const LINK: &str = "link";
const AUTHOR: &str = "author";
const NAME: &str = "name";

const REL_ALTERNATE: &str = "alternate";
const REL_RELATED: &str = "related";

/// Parser settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Match elements by local name, so `atom:entry` is read as `entry`.
    /// Disabled by default: names are compared exactly as written.
    pub process_namespaces: bool,
}

/// Parser for arXiv Atom feeds
///
/// Reads `<feed>` → `<entry>` and extracts title, summary, links and author
/// names. Unknown elements at either level are skipped with their subtrees.
#[derive(Debug, Clone, Default)]
pub struct FeedParser {
    options: ParserOptions,
}

impl FeedParser {
    /// Create a parser with namespace processing disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with explicit options
    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Parse a complete feed into documents, in feed order.
    ///
    /// The source is consumed and dropped before this returns, whether parsing
    /// succeeds or not. Any error aborts the whole parse; no partial list is
    /// returned.
    pub fn parse<R: Read>(&self, source: R) -> Result<Vec<Document>, FeedError> {
        let mut cursor = FeedCursor::new(BufReader::new(source), self.options);

        let root = cursor.next_start()?;
        cursor.expect_start(&root, FEED)?;

        let documents = cursor.read_feed()?;
        cursor.expect_eof()?;
        tracing::debug!(entries = documents.len(), "Parsed arXiv feed");
        Ok(documents)
    }
}

/// Owned view of the reader events the parser cares about
enum Token {
    Start(BytesStart<'static>),
    End(String),
    Text(String),
    Eof,
}

struct FeedCursor<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    options: ParserOptions,
}

impl<R: BufRead> FeedCursor<R> {
    fn new(source: R, options: ParserOptions) -> Self {
        let mut reader = Reader::from_reader(source);
        let config = reader.config_mut();
        // `<link .../>` is reported as a start tag followed by an end tag
        config.expand_empty_elements = true;
        config.check_end_names = true;

        Self {
            reader,
            buf: Vec::with_capacity(1024),
            options,
        }
    }

    /// Advance to the next start tag, end tag, text node or end of input.
    /// Comments, declarations and processing instructions are not reported.
    fn next(&mut self) -> Result<Token, FeedError> {
        loop {
            self.buf.clear();
            let token = match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => Token::Start(e.into_owned()),
                Event::End(e) => Token::End(element_name(e.name(), self.options)),
                Event::Text(e) => Token::Text(e.unescape()?.into_owned()),
                Event::CData(e) => Token::Text(
                    e.decode()
                        .map_err(|err| FeedError::MalformedFeed(format!("CDATA: {}", err)))?
                        .into_owned(),
                ),
                Event::Eof => Token::Eof,
                _ => continue,
            };
            return Ok(token);
        }
    }

    /// Advance to the first start tag of the document
    fn next_start(&mut self) -> Result<BytesStart<'static>, FeedError> {
        loop {
            match self.next()? {
                Token::Start(start) => return Ok(start),
                Token::Text(text) if text.trim().is_empty() => continue,
                Token::Text(_) => {
                    return Err(FeedError::MalformedFeed(
                        "text content before the root element".to_string(),
                    ))
                }
                Token::End(name) => {
                    return Err(FeedError::MalformedFeed(format!(
                        "unexpected end tag </{}> before the root element",
                        name
                    )))
                }
                Token::Eof => {
                    return Err(FeedError::MalformedFeed(
                        "document has no root element".to_string(),
                    ))
                }
            }
        }
    }

    /// Consume everything after the root element; only whitespace may follow
    fn expect_eof(&mut self) -> Result<(), FeedError> {
        loop {
            match self.next()? {
                Token::Eof => return Ok(()),
                Token::Text(text) if text.trim().is_empty() => continue,
                Token::Text(_) => {
                    return Err(FeedError::MalformedFeed(
                        "text content after the root element".to_string(),
                    ))
                }
                Token::Start(start) => {
                    return Err(FeedError::MalformedFeed(format!(
                        "unexpected <{}> after the root element",
                        self.name_of(&start)
                    )))
                }
                Token::End(name) => {
                    return Err(FeedError::MalformedFeed(format!(
                        "unexpected end tag </{}> after the root element",
                        name
                    )))
                }
            }
        }
    }

    fn name_of(&self, start: &BytesStart<'_>) -> String {
        element_name(start.name(), self.options)
    }

    fn expect_start(&self, start: &BytesStart<'_>, expected: &str) -> Result<(), FeedError> {
        let found = self.name_of(start);
        if found == expected {
            Ok(())
        } else {
            Err(FeedError::ParseStructure(format!(
                "expected <{}> but found <{}>",
                expected, found
            )))
        }
    }

    fn expect_end(&self, found: &str, expected: &str) -> Result<(), FeedError> {
        if found == expected {
            Ok(())
        } else {
            Err(FeedError::ParseStructure(format!(
                "expected </{}> but found </{}>",
                expected, found
            )))
        }
    }

    fn attribute(&self, start: &BytesStart<'_>, key: &str) -> Result<Option<String>, FeedError> {
        match start.try_get_attribute(key)? {
            Some(attr) => {
                let value = attr.decode_and_unescape_value(self.reader.decoder())?;
                Ok(Some(value.into_owned()))
            }
            None => Ok(None),
        }
    }

    /// Discard the rest of an element whose start tag was just consumed
    fn skip(&mut self, name: &str) -> Result<(), FeedError> {
        let mut depth = 1usize;
        loop {
            match self.next()? {
                Token::Start(_) => depth += 1,
                Token::End(end) => {
                    depth -= 1;
                    if depth == 0 {
                        return self.expect_end(&end, name);
                    }
                }
                Token::Text(_) => {}
                Token::Eof => return Err(unexpected_eof(name)),
            }
        }
    }

    fn read_feed(&mut self) -> Result<Vec<Document>, FeedError> {
        let mut documents = Vec::new();
        loop {
            match self.next()? {
                Token::Start(start) => {
                    let name = self.name_of(&start);
                    if name == ENTRY {
                        documents.push(self.read_entry()?);
                    } else {
                        self.skip(&name)?;
                    }
                }
                Token::End(end) => {
                    self.expect_end(&end, FEED)?;
                    return Ok(documents);
                }
                Token::Text(_) => {}
                Token::Eof => return Err(unexpected_eof(FEED)),
            }
        }
    }

    fn read_entry(&mut self) -> Result<Document, FeedError> {
        let mut builder = DocumentBuilder::new();
        loop {
            match self.next()? {
                Token::Start(start) => match self.name_of(&start).as_str() {
                    TITLE => {
                        builder.title(self.read_leaf(TITLE)?);
                    }
                    SUMMARY => {
                        builder.abstract_text(normalize_summary(&self.read_leaf(SUMMARY)?));
                    }
                    LINK => self.read_link(&start, &mut builder)?,
                    AUTHOR => {
                        if let Some(name) = self.read_author()? {
                            builder.author(name);
                        }
                    }
                    other => self.skip(other)?,
                },
                Token::End(end) => {
                    self.expect_end(&end, ENTRY)?;
                    break;
                }
                Token::Text(_) => {}
                Token::Eof => return Err(unexpected_eof(ENTRY)),
            }
        }

        let document = builder.build();
        tracing::debug!(
            id = document.external_id().unwrap_or("-"),
            authors = document.authors().len(),
            "Read feed entry"
        );
        Ok(document)
    }

    /// Text of an element expected to hold only character data.
    ///
    /// Nested markup is not supported: reading stops at the first child
    /// element and the remainder of the element is discarded.
    fn read_leaf(&mut self, name: &str) -> Result<String, FeedError> {
        let mut text = String::new();
        loop {
            match self.next()? {
                Token::Text(chunk) => text.push_str(&chunk),
                Token::End(end) => {
                    self.expect_end(&end, name)?;
                    return Ok(text);
                }
                Token::Start(child) => {
                    let child = self.name_of(&child);
                    self.skip(&child)?;
                    self.skip(name)?;
                    return Ok(text);
                }
                Token::Eof => return Err(unexpected_eof(name)),
            }
        }
    }

    fn read_link(
        &mut self,
        start: &BytesStart<'_>,
        builder: &mut DocumentBuilder,
    ) -> Result<(), FeedError> {
        match self.attribute(start, "rel")?.as_deref() {
            Some(REL_ALTERNATE) => {
                let href = self.attribute(start, "href")?.unwrap_or_default();
                builder.primary_link(href);
            }
            Some(REL_RELATED) => {
                let href = self.attribute(start, "href")?.unwrap_or_default();
                builder.attachment_link(href);
            }
            Some(_) => {}
            None => tracing::warn!("Ignoring <link> without a rel attribute"),
        }
        self.skip(LINK)
    }

    /// Name of an author; `None` when the element has no `<name>` child
    fn read_author(&mut self) -> Result<Option<String>, FeedError> {
        let mut name = None;
        let mut depth = 1usize;
        loop {
            match self.next()? {
                Token::Start(start) => {
                    if self.name_of(&start) == NAME {
                        name = Some(self.read_leaf(NAME)?);
                    } else {
                        depth += 1;
                    }
                }
                Token::End(end) => {
                    depth -= 1;
                    if depth == 0 {
                        self.expect_end(&end, AUTHOR)?;
                        return Ok(name);
                    }
                }
                Token::Text(_) => {}
                Token::Eof => return Err(unexpected_eof(AUTHOR)),
            }
        }
    }
}

fn element_name(name: QName<'_>, options: ParserOptions) -> String {
    if options.process_namespaces {
        String::from_utf8_lossy(name.local_name().as_ref()).into_owned()
    } else {
        String::from_utf8_lossy(name.as_ref()).into_owned()
    }
}

fn unexpected_eof(name: &str) -> FeedError {
    FeedError::MalformedFeed(format!("unexpected end of document inside <{}>", name))
}

/// Newlines become spaces, then any run of two or more ASCII whitespace
/// characters becomes a single space.
fn normalize_summary(text: &str) -> String {
    static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();
    // ASCII whitespace only: runs of no-break spaces are kept
    let re = WHITESPACE_RUN.get_or_init(|| Regex::new(r"(?-u:\s){2,}").expect("static regex"));
    re.replace_all(&text.replace('\n', " "), " ").into_owned()
}
