//! Federated search proxy server.
//!
//! All tracing output goes to stderr.

use clap::Parser;
use search_proxy::{ProxyConfig, SearchServer, server};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Federated search across GitHub, Stack Overflow and Reddit.
#[derive(Parser)]
#[command(name = "search-proxy", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, env = "SEARCH_PROXY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, warnings) = ProxyConfig::load(cli.config.as_deref())?;
    search_proxy::logging::init(&config.logging)?;
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        global_timeout_ms = config.federation.global_timeout_ms,
        per_provider_timeout_ms = config.federation.per_provider_timeout_ms,
        default_result_cap = config.federation.default_result_cap,
        "search-proxy starting"
    );

    let shutdown = CancellationToken::new();
    let service = search_proxy::build_service(&config, shutdown.clone())?;
    let server = SearchServer::start(service, &config.server, shutdown.clone()).await?;

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            server::shutdown_signal().await;
            shutdown.cancel();
        }
    });

    server.wait().await.map_err(|e| {
        tracing::error!(error = %e, "search-proxy exited with error");
        anyhow::anyhow!("search-proxy failed: {e}")
    })?;

    tracing::info!("search-proxy shut down cleanly");
    Ok(())
}
