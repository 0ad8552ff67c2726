//! Utility modules supporting the feeder.
//!
//! - [`HttpClient`]: HTTP client with bounded connect/read timeouts and cancellable fetches
//!
//! # Fetching a feed
//!
//! ```rust,no_run
//! use arxiv_feeder::config::HttpSettings;
//! use arxiv_feeder::utils::HttpClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(&HttpSettings::default())?;
//! let _body = client
//!     .fetch("http://export.arxiv.org/api/query?id_list=1706.03762")
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod http;

pub use http::HttpClient;
