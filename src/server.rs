//! HTTP server bootstrap for EcoProof.
//!
//! Wires together:
//! - configuration
//! - database connection pool
//! - the stores (submission repository, points ledger, notification sink)
//! - the verification oracle client
//! - the Axum router

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::infra::{
    PgNotificationSink, PgPointsLedger, PgSubmissionStore, SubmissionRepository,
};
use crate::oracle::{HttpVerificationOracle, OracleConfig, UnconfiguredOracle, VerificationOracle};
use crate::workflow::SubmissionWorkflow;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Server listen address.
    pub listen_addr: SocketAddr,
    /// Maximum database connections.
    pub max_connections: u32,
    /// Oracle endpoint; when absent every verification degrades to the
    /// fallback verdict and submissions route to manual review.
    pub oracle: Option<OracleConfig>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/ecoproof".to_string());

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .expect("Invalid listen address");

        let max_connections: u32 = std::env::var("MAX_DB_CONNECTIONS")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(10);

        let oracle = match (std::env::var("ORACLE_URL"), std::env::var("ORACLE_API_KEY")) {
            (Ok(endpoint), Ok(api_key)) => {
                let mut config = OracleConfig::new(endpoint, api_key);
                if let Ok(model) = std::env::var("ORACLE_MODEL") {
                    config.model = model;
                }
                if let Some(secs) = std::env::var("ORACLE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                {
                    config.timeout = Duration::from_secs(secs);
                }
                Some(config)
            }
            _ => None,
        };

        Self {
            database_url,
            listen_addr,
            max_connections,
            oracle,
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<SubmissionWorkflow>,
    pub repository: Arc<dyn SubmissionRepository>,
}

/// Build the full application router from state.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .nest("/api", crate::api::rest::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting EcoProof v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    crate::migrations::run(&pool).await?;

    let oracle: Arc<dyn VerificationOracle> = match config.oracle.clone() {
        Some(oracle_config) => {
            info!(model = %oracle_config.model, "verification oracle configured");
            Arc::new(HttpVerificationOracle::new(oracle_config)?)
        }
        None => {
            info!("no verification oracle configured; submissions will be flagged for review");
            Arc::new(UnconfiguredOracle)
        }
    };

    let repository = Arc::new(PgSubmissionStore::new(pool.clone()));
    let ledger = Arc::new(PgPointsLedger::new(pool.clone()));
    let notifications = Arc::new(PgNotificationSink::new(pool));

    let workflow = Arc::new(SubmissionWorkflow::new(
        oracle,
        repository.clone(),
        ledger,
        notifications,
    ));

    let state = AppState {
        workflow,
        repository,
    };

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("Listening on {}", config.listen_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

/// Initialize tracing with env-filter support.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
