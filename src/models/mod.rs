//! Core data models for parsed feed entries.

mod author;
mod document;

pub use author::{encode_authors, AuthorName};
pub use document::{last_path_segment, Document, DocumentBuilder};
