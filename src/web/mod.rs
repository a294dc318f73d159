//! Web layer module
//!
//! HTTP interface of the analyzer: the embedded form page, the analysis and
//! export API, and a health endpoint.
//!
//! # Architecture
//!
//! - **Handlers**: thin request handlers delegating to the analysis service
//! - **Responses**: error-to-status mapping with a flat `{"error"}` body
//! - **Extractors**: request context and JSON body extraction
//! - **Middleware**: request logging and security headers

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    analysis::{AnalysisService, AnalysisStore, LanguageModel},
    config::Config,
    errors::AppResult,
    instructions::{DocumentSource, InstructionCache},
};

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod responses;

pub use extractors::{AppJson, RequestContext};
pub use responses::{ErrorResponse, handle_error};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub instructions: Arc<InstructionCache>,
    pub analysis: Arc<AnalysisService>,
    pub store: Arc<AnalysisStore>,
    /// Application start time for uptime calculation
    pub start_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Wire the components together around the given network seams
    pub fn new(
        config: Config,
        source: Arc<dyn DocumentSource>,
        model: Arc<dyn LanguageModel>,
    ) -> AppResult<Self> {
        let instructions = Arc::new(InstructionCache::new(&config.instructions, source));
        let store = Arc::new(AnalysisStore::new(&config.analysis)?);
        let analysis = Arc::new(AnalysisService::new(
            instructions.clone(),
            model,
            store.clone(),
            config.instructions.max_prompt_chars,
        ));

        Ok(Self {
            config: Arc::new(config),
            instructions,
            analysis,
            store,
            start_time: chrono::Utc::now(),
        })
    }
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(state: AppState) -> Result<Self> {
        let addr: SocketAddr =
            format!("{}:{}", state.config.web.host, state.config.web.port).parse()?;
        let app = Self::create_router(state);

        Ok(Self { app, addr })
    }

    /// Create the router with all routes and middleware
    pub fn create_router(state: AppState) -> Router {
        let body_limit = state.config.web.max_request_bytes;

        Router::new()
            .route("/", get(handlers::index::index))
            .route("/health", get(handlers::health::health_check))
            .route(
                "/static/{*path}",
                get(handlers::static_assets::serve_static_asset),
            )
            .nest("/api", Self::api_routes())
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(axum::middleware::from_fn(
                middleware::security_headers_middleware,
            ))
            .layer(axum::middleware::from_fn(
                middleware::request_logging_middleware,
            ))
            .with_state(state)
    }

    fn api_routes() -> Router<AppState> {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

        Router::new()
            .route("/analyze", post(handlers::analyze::analyze_trademarks))
            .route(
                "/export/{format}/{analysis_id}",
                get(handlers::export::export_analysis),
            )
            .layer(cors)
    }

    /// Bind, report readiness, and serve until SIGINT/SIGTERM
    pub async fn serve_with_signal(
        self,
        ready_signal: tokio::sync::oneshot::Sender<Result<()>>,
    ) -> Result<()> {
        match tokio::net::TcpListener::bind(&self.addr).await {
            Ok(listener) => {
                let _ = ready_signal.send(Ok(()));

                axum::serve(listener, self.app)
                    .with_graceful_shutdown(shutdown_signal())
                    .await?;
                Ok(())
            }
            Err(e) => {
                let message = format!("Failed to bind {}: {}", self.addr, e);
                let _ = ready_signal.send(Err(anyhow::anyhow!(message.clone())));
                Err(anyhow::anyhow!(message))
            }
        }
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, shutting down gracefully");
                    }
                    _ = sigint.recv() => {
                        tracing::info!("Received SIGINT (Ctrl+C), shutting down gracefully");
                    }
                }
            }
            _ => {
                tracing::warn!("Failed to install signal handlers, falling back to Ctrl+C");
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Received Ctrl+C, shutting down gracefully");
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, shutting down gracefully");
        }
    }
}
