//! advd: Advocate daemon.
//!
//! Serves the [`GuidancePipeline`](advocate::GuidancePipeline) over HTTP
//! with free-tier limits and bearer-protected maintenance routes.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use advocate::server::config::{Config, Secrets};
use advocate::server::{AppState, StaticTokenAuthenticator, router};
use advocate::{Advocate, AdvocateError, FreeTierLimiter, GuidancePipeline};

/// Advocate daemon: legal guidance service.
#[derive(Parser)]
#[command(name = "advd")]
#[command(version = advocate::PKG_VERSION)]
#[command(about = "Advocate legal guidance daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "ADVOCATE_CONFIG")]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config.as_deref())?;
    let secrets = Secrets::load()?;

    let pipeline = build_pipeline(&config, &secrets)?;

    let admin_tokens = secrets.admin_tokens();
    if admin_tokens.is_empty() {
        warn!("no admin tokens configured; authenticated routes will reject every request");
    }
    let authenticator = StaticTokenAuthenticator::new(admin_tokens);
    let limiter = FreeTierLimiter::in_memory(config.free_tier_config());

    // Parse address
    let addr: SocketAddr = config
        .server
        .address
        .parse()
        .map_err(|e| AdvocateError::Configuration(format!("Invalid address: {e}")))?;

    info!(
        version = advocate::version_string(),
        %addr,
        expiry_hours = config.cache.expiry_hours,
        models = ?config.provider.models,
        "advd starting"
    );

    let state = AppState::new(Arc::new(pipeline), limiter, Arc::new(authenticator))
        .request_timeout(config.server.request_timeout());
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Build the [`GuidancePipeline`] from configuration.
fn build_pipeline(config: &Config, secrets: &Secrets) -> advocate::Result<GuidancePipeline> {
    let api_keys = secrets.api_keys();
    info!(credentials = api_keys.len(), "loaded provider credentials");

    Advocate::builder()
        .credentials(api_keys)
        .models(config.provider.models.clone())
        .base_url(config.provider.base_url.clone())
        .timeout(config.provider_timeout())
        .cache(config.cache_config())
        .build()
}
