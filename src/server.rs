//! HTTP server bootstrap for the panel anchor service.
//!
//! This module wires together:
//! - configuration
//! - the ledger client and anchoring pipeline
//! - the Axum router

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::anchor::{verify_contract_abi, AbiCheck, AnchorConfig};
use crate::auth::{AuthMiddlewareState, BearerAuth};
use crate::infra::AlloyLedgerClient;
use crate::metrics::MetricsRegistry;
use crate::pipeline::{AnchorContext, AnchorPipeline};
use crate::telemetry::{init_telemetry, TelemetryConfig};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server listen address.
    pub listen_addr: SocketAddr,
    /// Bearer token required on `/anchor`; `None` disables auth.
    pub auth_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT {p:?}: {e}"))?,
            None => 5000,
        };
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {host}:{port}: {e}"))?;

        let auth_token = lookup("AUTH_TOKEN").filter(|t| !t.trim().is_empty());

        Ok(Self {
            listen_addr,
            auth_token,
        })
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnchorPipeline>,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn new(pipeline: AnchorPipeline) -> Self {
        let metrics = pipeline.metrics();
        Self {
            pipeline: Arc::new(pipeline),
            metrics,
        }
    }
}

/// Start the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).map_err(|e| anyhow::anyhow!("telemetry init failed: {e}"))?;

    info!(
        "Starting {} v{}",
        telemetry.service_name,
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let anchor_config = AnchorConfig::from_env()?;

    match verify_contract_abi(&anchor_config.abi_path)? {
        AbiCheck::Verified => info!(path = %anchor_config.abi_path.display(), "Contract ABI verified"),
        AbiCheck::NotFound => warn!(
            path = %anchor_config.abi_path.display(),
            "Contract ABI file not found; using built-in addPanelEvent binding"
        ),
    }

    let ledger = Arc::new(AlloyLedgerClient::new(&anchor_config.rpc_url)?);
    let ctx = AnchorContext::from_config(&anchor_config, ledger);
    let pipeline = AnchorPipeline::new(ctx);

    info!("Configuration loaded");
    info!("  Listen address: {}", config.listen_addr);
    info!("  Contract: {}", anchor_config.contract_address);
    info!("  Oracle wallet: {}", pipeline.signer_address());
    info!(
        "  Auth: {}",
        if config.auth_token.is_some() { "bearer token" } else { "disabled" }
    );

    let auth = BearerAuth::from_token(config.auth_token.as_deref());
    let app = build_router(AppState::new(pipeline), auth);

    info!("Starting HTTP server on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Build the full application router.
pub fn build_router(state: AppState, auth: BearerAuth) -> Router {
    let auth_state = AuthMiddlewareState {
        authenticator: Arc::new(auth),
    };

    let api = crate::api::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        crate::auth::auth_middleware,
    ));

    Router::new()
        .merge(api)
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_json))
        .route("/metrics/prometheus", get(metrics_prometheus))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> &'static str {
    "Panel anchor service is running"
}

/// Health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "service": "panel-anchor",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn metrics_json(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(state.metrics.to_json().await)
}

async fn metrics_prometheus(State(state): State<AppState>) -> String {
    state.metrics.to_prometheus().await
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
