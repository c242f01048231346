//! Peer-review portal - main entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use config_loader::ConfigLoader;
use portal::auth::JwtConfig;
use portal::config::{LogFormat, PortalConfig};
use portal::{create_app, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "portal", about = "Peer-review portal web server")]
struct Args {
    /// Directory holding portal.yaml
    #[arg(long, env = "PORTAL_CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Port to listen on, overriding the config file
    #[arg(long)]
    port: Option<u16>,

    /// Seed document to load into the store
    #[arg(long)]
    seed: Option<PathBuf>,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,portal=debug,tower_http=debug"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loader = ConfigLoader::with_dir(&args.config_dir);
    let mut config = PortalConfig::load(&loader)
        .with_context(|| format!("Failed to load config from {}", args.config_dir.display()))?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(seed) = args.seed {
        config.seed_file = Some(seed);
    }

    init_tracing(config.log_format);
    info!("Starting portal");

    let secret = config
        .jwt_secret
        .clone()
        .context("JWT_SECRET (or jwtSecret in portal.yaml) must be set")?;
    let jwt_config = JwtConfig::from_parts(secret, config.jwt_algorithm.as_deref());

    let store = config.open_store().context("Failed to load seed data")?;
    let state = AppState::new(Arc::new(store), jwt_config, config.page_size)
        .context("Failed to initialize application state")?;
    let app = create_app(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Portal listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server failed to start")?;

    Ok(())
}
