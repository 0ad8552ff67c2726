//! # arXiv Feeder
//!
//! Fetches the Atom metadata of a single arXiv article, parses it into
//! [`Document`]s and forwards each one to a receiving application.
//!
//! ## Architecture
//!
//! - [`feed`]: streaming Atom parser ([`FeedParser`]) and the fetch/parse error taxonomy
//! - [`models`]: [`Document`] and author name splitting
//! - [`forward`]: payload shape and the [`Forwarder`] trait with its implementations
//! - [`feeder`]: the fetch → parse → forward pipeline
//! - [`utils`]: HTTP client
//! - [`config`]: configuration management

pub mod config;
pub mod feed;
pub mod feeder;
pub mod forward;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use feed::{FeedError, FeedParser};
pub use feeder::{Feeder, FeederError};
pub use forward::Forwarder;
pub use models::Document;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
