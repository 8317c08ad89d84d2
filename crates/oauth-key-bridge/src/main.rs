//! OAuth Key Bridge - Entry Point

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use oauth_key_bridge::{config::Config, server::BridgeServer};

#[derive(Parser, Debug)]
#[command(name = "oauth-key-bridge")]
#[command(about = "Stateless OAuth 2.0 bridge for API-key services")]
#[command(version)]
struct Cli {
    /// Secret signing every authorization code and access token
    #[arg(long, env = "OAUTH_SIGNING_SECRET", hide_env_values = true)]
    signing_secret: String,

    /// HTTP server port
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Public base URL of this server (issuer)
    #[arg(long, env = "BASE_URL")]
    base_url: Option<String>,

    /// URL probed with a freshly submitted API key
    #[arg(long, env = "UPSTREAM_PROBE_URL")]
    upstream_probe_url: Option<String>,

    /// Base URL of the upstream API used by tools
    #[arg(long, env = "UPSTREAM_API_URL")]
    upstream_api_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Build the server configuration from parsed flags and env fallbacks.
    fn config(&self) -> anyhow::Result<Config> {
        if self.signing_secret.is_empty() {
            anyhow::bail!("signing secret must not be empty");
        }

        let mut config = Config::new(self.signing_secret.clone(), self.base_url.clone());
        if let Some(url) = &self.upstream_probe_url {
            config.upstream_probe_url.clone_from(url);
        }
        if let Some(url) = &self.upstream_api_url {
            config.upstream_api_url.clone_from(url);
        }
        Ok(config)
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let config = cli.config()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        issuer = %config.issuer_url,
        "Starting OAuth key bridge"
    );

    BridgeServer::new(config).run_http(cli.port).await
}
