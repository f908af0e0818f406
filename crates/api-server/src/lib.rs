pub mod error;
pub mod rate_limit;
pub mod routes;

use serde::Serialize;
use signal_engine::{SignalCache, StockAnalyzer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use yahoo_finance::YahooFinanceClient;

pub use error::AppError;
pub use rate_limit::ClientRateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<StockAnalyzer>,
    pub cache: Arc<SignalCache>,
    pub rate_limiter: Arc<ClientRateLimiter>,
}

/// Uniform success envelope for every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data, cached: None }
    }

    pub fn from_cache(data: T) -> Self {
        Self { success: true, data, cached: Some(true) }
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_source = Arc::new(YahooFinanceClient::new());
    let analyzer = Arc::new(StockAnalyzer::new(data_source));
    let cache = Arc::new(analyzer.new_cache());

    let rate_limit: u32 = std::env::var("RATE_LIMIT_PER_MINUTE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60);
    let rate_limiter = Arc::new(ClientRateLimiter::new(rate_limit, Duration::from_secs(60)));

    let state = AppState { analyzer, cache, rate_limiter };
    let app = routes::router(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8787".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("API server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
