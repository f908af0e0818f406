use axum::extract::{ConnectInfo, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use signal_core::{Recommendation, StockSignal};
use signal_engine::{validate_ticker, MarketScanner, ScanResult, ScanStrategy};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::rate_limit::RateDecision;
use crate::{ApiResponse, AppError, AppState};

const MAX_BATCH_TICKERS: usize = 10;
const MAX_SCAN_LIMIT: usize = 50;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/analyze/:ticker", get(analyze_ticker))
        .route("/api/batch", post(analyze_batch))
        .route("/api/scanner", get(scan_market))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

async fn rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| addr.ip().to_string());

    match state.rate_limiter.check(&client) {
        RateDecision::Allowed => next.run(request).await,
        RateDecision::Limited { retry_after_secs } => {
            tracing::warn!("Rate limit exceeded for {}", client);
            let body = Json(json!({
                "success": false,
                "error": "Rate limit exceeded",
                "code": "RATE_LIMIT_EXCEEDED",
                "retryAfter": retry_after_secs,
            }));
            (StatusCode::TOO_MANY_REQUESTS, body).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}

async fn analyze_ticker(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiResponse<StockSignal>>, AppError> {
    let validation = validate_ticker(&ticker);
    if !validation.is_valid {
        return Err(AppError::validation(validation.errors.join("; ")));
    }
    let ticker = validation.sanitized_ticker;

    if let Some(cached) = state.cache.get(&ticker) {
        tracing::debug!("Cache hit for {}", ticker);
        return Ok(Json(ApiResponse::from_cache(cached)));
    }

    let signal = state.analyzer.analyze(&ticker).await?;
    state.cache.set(&ticker, signal.clone());

    Ok(Json(ApiResponse::ok(signal)))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub tickers: Vec<String>,
}

/// One row of a batch response: either a signal summary or an error
#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub ticker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_gain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn analyze_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<ApiResponse<Vec<BatchEntry>>>, AppError> {
    if request.tickers.is_empty() {
        return Err(AppError::validation("Please provide an array of tickers"));
    }
    if request.tickers.len() > MAX_BATCH_TICKERS {
        return Err(AppError::validation(format!(
            "Maximum {} tickers per request",
            MAX_BATCH_TICKERS
        )));
    }

    let mut sanitized = Vec::with_capacity(request.tickers.len());
    let mut validation_errors = Vec::new();
    for ticker in &request.tickers {
        let validation = validate_ticker(ticker);
        if validation.is_valid {
            sanitized.push(validation.sanitized_ticker);
        } else {
            validation_errors.push(format!("{}: {}", ticker, validation.errors.join(", ")));
        }
    }

    if !validation_errors.is_empty() {
        return Err(AppError::validation(format!(
            "Invalid ticker symbols found: {}",
            validation_errors.join("; ")
        )));
    }

    let results = state.analyzer.analyze_many(&sanitized).await;

    let data = results
        .into_iter()
        .map(|(ticker, result)| match result {
            Ok(signal) => BatchEntry {
                ticker,
                recommendation: Some(signal.recommendation),
                confidence: Some(signal.confidence),
                price: Some(signal.price),
                potential_gain: Some(signal.potential_gain),
                error: None,
            },
            Err(e) => {
                tracing::error!("Batch analysis failed for {}: {}", ticker, e);
                BatchEntry {
                    ticker,
                    recommendation: None,
                    confidence: None,
                    price: None,
                    potential_gain: None,
                    error: Some("Analysis failed".to_string()),
                }
            }
        })
        .collect();

    Ok(Json(ApiResponse::ok(data)))
}

#[derive(Debug, Deserialize)]
pub struct ScannerQuery {
    pub strategy: Option<String>,
    pub limit: Option<usize>,
}

async fn scan_market(
    State(state): State<AppState>,
    Query(query): Query<ScannerQuery>,
) -> Result<Json<ApiResponse<ScanResult>>, AppError> {
    let limit = query.limit.unwrap_or(20).min(MAX_SCAN_LIMIT);

    let strategy = match query.strategy.as_deref() {
        None => ScanStrategy::Trending,
        Some(raw) => ScanStrategy::parse(raw).unwrap_or_else(|| {
            tracing::warn!(
                "Unsupported scanner strategy {:?}, falling back to trending",
                raw
            );
            ScanStrategy::Trending
        }),
    };

    let scanner = MarketScanner::new(Arc::clone(&state.analyzer));
    let result = scanner.scan(strategy, limit).await?;

    Ok(Json(ApiResponse::ok(result)))
}
