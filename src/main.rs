use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tm_analyzer::{
    analysis::OpenAiClient,
    config::Config,
    instructions::HttpDocumentSource,
    web::{AppState, WebServer},
};

/// Upper bound between store sweeps
const MAX_PURGE_INTERVAL: Duration = Duration::from_secs(600);

#[derive(Parser)]
#[command(name = "tm-analyzer")]
#[command(version)]
#[command(about = "Trademark similarity analysis service backed by a language model")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = if cli.log_level == "trace" {
        format!("tm_analyzer={},tower_http=trace", cli.log_level)
    } else {
        format!("tm_analyzer={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting trademark analyzer v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    config.warn_on_degraded_settings();

    info!(
        "Language model: {} (vision: {}) at {}",
        config.llm.model, config.llm.vision_model, config.llm.base_url
    );
    info!(
        "Instruction cache TTL {}, analysis store capacity {} / TTL {}",
        humantime::format_duration(config.instructions.ttl),
        config.analysis.store_capacity,
        humantime::format_duration(config.analysis.store_ttl)
    );

    let source = Arc::new(HttpDocumentSource::new(config.instructions.fetch_timeout)?);
    let model = Arc::new(OpenAiClient::new(config.llm.clone())?);
    let purge_interval = config.analysis.store_ttl.clamp(Duration::from_secs(1), MAX_PURGE_INTERVAL);

    let state = AppState::new(config, source, model)?;
    let store = state.store.clone();
    let web_server = WebServer::new(state)?;

    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );

    // Create a channel to signal when the server is ready or fails to bind
    let (server_ready_tx, server_ready_rx) = tokio::sync::oneshot::channel();

    let server_handle = tokio::spawn(async move {
        if let Err(e) = web_server.serve_with_signal(server_ready_tx).await {
            tracing::error!("Web server failed: {}", e);
        }
    });

    match server_ready_rx.await {
        Ok(Ok(())) => {
            info!("Web server is now listening");
        }
        Ok(Err(bind_error)) => {
            tracing::error!("Failed to bind web server: {}", bind_error);
            return Err(bind_error);
        }
        Err(_) => {
            tracing::error!("Web server task completed without signaling");
            return Err(anyhow::anyhow!("Web server failed to start"));
        }
    }

    // Expired analyses are also dropped on access; this bounds idle memory
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(purge_interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.purge_expired().await;
            if removed > 0 {
                tracing::debug!("Purged {} expired analyses", removed);
            }
        }
    });

    server_handle.await?;

    Ok(())
}
