//! Configuration management.
//!
//! Settings are read from a TOML file and can be overridden with environment
//! variables prefixed `ARXIV_FEEDER_`, using `__` between section and key.
//!
//! # Configuration File Format
//!
//! ```toml
//! [feeder]
//! name = "Scholarley arXiv Feeder"
//! document_type = "Journal Article"
//! api_url = "http://export.arxiv.org/api/query"
//!
//! [http]
//! connect_timeout_secs = 15
//! read_timeout_secs = 10
//!
//! [parser]
//! process_namespaces = false
//!
//! [receiver]
//! endpoint = "http://localhost:8080/documents"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! For example `ARXIV_FEEDER_HTTP__READ_TIMEOUT_SECS=30` overrides
//! `http.read_timeout_secs`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::feed::ParserOptions;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "arxiv-feeder.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Payload constants and the arXiv API endpoint
    #[serde(default)]
    pub feeder: FeederSettings,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,

    /// Feed parser settings
    #[serde(default)]
    pub parser: ParserSettings,

    /// Where documents are delivered
    #[serde(default)]
    pub receiver: ReceiverSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Feeder identity and API endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeederSettings {
    /// Name sent as `feeder:name`
    #[serde(default = "default_feeder_name")]
    pub name: String,

    /// Literal sent as `document:type`
    #[serde(default = "default_document_type")]
    pub document_type: String,

    /// arXiv API query endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for FeederSettings {
    fn default() -> Self {
        Self {
            name: default_feeder_name(),
            document_type: default_document_type(),
            api_url: default_api_url(),
        }
    }
}

fn default_feeder_name() -> String {
    "Scholarley arXiv Feeder".to_string()
}

fn default_document_type() -> String {
    "Journal Article".to_string()
}

fn default_api_url() -> String {
    "http://export.arxiv.org/api/query".to_string()
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Defaults to `arxiv-feeder/<version>`
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            user_agent: None,
        }
    }
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_read_timeout() -> u64 {
    10
}

/// Feed parser settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserSettings {
    #[serde(default)]
    pub process_namespaces: bool,
}

impl ParserSettings {
    pub fn options(&self) -> ParserOptions {
        ParserOptions {
            process_namespaces: self.process_namespaces,
        }
    }
}

/// Receiver settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiverSettings {
    /// HTTP endpoint accepting JSON payloads; stdout is used when unset
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "json" for structured output, plain text otherwise
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigFileError> {
        toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

/// Load configuration from a file, with environment overrides applied on top
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(env_source())
        .build()?
        .try_deserialize()
}

/// Get the configuration from environment variables and defaults
pub fn get_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(env_source())
        .build()?
        .try_deserialize()
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix("ARXIV_FEEDER")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Look for a config file in the working directory, then in the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("arxiv-feeder").join("config.toml"))
        .filter(|path| path.is_file())
}
