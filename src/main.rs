use anyhow::{Context, Result};
use arxiv_feeder::config::{find_config_file, get_config, load_config, Config};
use arxiv_feeder::forward::{Forwarder, HttpForwarder, JsonLinesForwarder};
use arxiv_feeder::Feeder;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// arXiv Feeder - Send the metadata of an arXiv article to a reference manager
#[derive(Parser, Debug)]
#[command(name = "arxiv-feeder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch arXiv metadata for an article and forward it to a receiver", long_about = None)]
struct Cli {
    /// Article URI, e.g. https://arxiv.org/pdf/1706.03762.pdf
    #[arg(required_unless_present = "print_config")]
    uri: Option<String>,

    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Receiver endpoint; documents are printed as JSON lines when absent
    #[arg(long)]
    receiver: Option<String>,

    /// arXiv API query endpoint
    #[arg(long)]
    api_url: Option<String>,

    /// Connect timeout in seconds
    #[arg(long)]
    connect_timeout: Option<u64>,

    /// Read timeout in seconds
    #[arg(long)]
    read_timeout: Option<u64>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(receiver) = &self.receiver {
            config.receiver.endpoint = Some(receiver.clone());
        }
        if let Some(api_url) = &self.api_url {
            config.feeder.api_url = api_url.clone();
        }
        if let Some(secs) = self.connect_timeout {
            config.http.connect_timeout_secs = secs;
        }
        if let Some(secs) = self.read_timeout {
            config.http.read_timeout_secs = secs;
        }
    }
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => config.logging.level.as_str(),
        (false, 1) => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("arxiv_feeder={}", level)),
    );

    // stdout carries the JSON payloads, logs go to stderr
    let registry = tracing_subscriber::registry().with(env_filter);
    if config.logging.format.as_deref() == Some("json") {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let mut config = match &config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => get_config().context("Failed to read configuration from environment")?,
    };
    cli.apply_overrides(&mut config);

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let Some(uri) = cli.uri.as_deref() else {
        anyhow::bail!("No article URI given");
    };

    let forwarder: Arc<dyn Forwarder> = match &config.receiver.endpoint {
        Some(endpoint) => Arc::new(HttpForwarder::new(endpoint.clone(), &config.http)?),
        None => Arc::new(JsonLinesForwarder::stdout()),
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let feeder = Feeder::new(&config, forwarder)?;
    let report = feeder
        .run(uri, &cancel)
        .await
        .with_context(|| format!("Failed to feed {}", uri))?;

    tracing::info!(
        arxiv_id = %report.arxiv_id,
        forwarded = report.forwarded,
        "Fed arXiv article"
    );

    Ok(())
}
