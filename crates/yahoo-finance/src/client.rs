use crate::rate_limit::RateLimiter;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use signal_core::{AnalyzerError, HistoricalRange, MarketDataSource, PricePoint, Quote};
use std::time::Duration;

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const QUOTE_URL: &str = "https://query2.finance.yahoo.com/v7/finance/quote";
const TRENDING_URL: &str = "https://query1.finance.yahoo.com/v1/finance/trending/US";
const SCREENER_URL: &str =
    "https://query1.finance.yahoo.com/v1/finance/screener/predefined/saved";

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 100;

#[derive(Clone)]
pub struct YahooFinanceClient {
    client: reqwest::Client,
    rate_limiter: RateLimiter,
}

impl YahooFinanceClient {
    pub fn new() -> Self {
        // Yahoo throttles unauthenticated clients; YAHOO_RATE_LIMIT overrides
        // the requests-per-minute budget.
        let rate_limit: usize = std::env::var("YAHOO_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
        }
    }

    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, AnalyzerError> {
        self.rate_limiter.acquire().await;

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| AnalyzerError::DataSource(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnalyzerError::DataSource(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AnalyzerError::DataSource(e.to_string()))
    }

    async fn fetch_screener_symbols(
        &self,
        scr_id: &str,
        limit: usize,
    ) -> Result<Vec<String>, AnalyzerError> {
        let count = normalize_limit(limit);
        let json = self
            .get_json(
                SCREENER_URL,
                &[("scrIds", scr_id.to_string()), ("count", count.to_string())],
            )
            .await?;

        let raw = extract_symbols(&json);
        sanitize_tickers(raw, scr_id, count)
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    async fn historical(
        &self,
        ticker: &str,
        range: HistoricalRange,
    ) -> Result<Vec<PricePoint>, AnalyzerError> {
        let url = format!("{}/{}", CHART_URL, ticker);
        self.rate_limiter.acquire().await;

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", range.period1.timestamp().to_string()),
                ("period2", range.period2.timestamp().to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,split".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AnalyzerError::DataSource(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnalyzerError::DataSource(format!(
                "HTTP {} fetching history for {}",
                response.status(),
                ticker
            )));
        }

        let envelope: ChartEnvelope = response
            .json()
            .await
            .map_err(|e| AnalyzerError::DataSource(e.to_string()))?;

        if let Some(err) = envelope.chart.error {
            return Err(AnalyzerError::DataSource(format!(
                "Chart API error for {}: {}",
                ticker, err.description
            )));
        }

        let series = envelope
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| {
                AnalyzerError::DataSource(format!("No historical data available for {}", ticker))
            })?;

        validate_historical(ticker, series.into_price_points())
    }

    async fn quote(&self, ticker: &str) -> Result<Quote, AnalyzerError> {
        let json = self
            .get_json(QUOTE_URL, &[("symbols", ticker.to_string())])
            .await?;

        let result = json
            .pointer("/quoteResponse/result/0")
            .ok_or_else(|| {
                AnalyzerError::DataSource(format!("No quote data found for {}", ticker))
            })?;

        let field = |name: &str| result.get(name).and_then(|v| v.as_f64());

        let quote = Quote {
            regular_market_price: field("regularMarketPrice").unwrap_or(f64::NAN),
            regular_market_volume: field("regularMarketVolume").unwrap_or(f64::NAN),
            trailing_pe: field("trailingPE"),
            forward_pe: field("forwardPE"),
            trailing_peg_ratio: field("trailingPegRatio"),
            profit_margins: field("profitMargins"),
            debt_to_equity: field("debtToEquity"),
        };

        validate_quote(ticker, quote)
    }

    async fn trending(&self, limit: usize) -> Result<Vec<String>, AnalyzerError> {
        let count = normalize_limit(limit);
        let json = self
            .get_json(TRENDING_URL, &[("count", count.to_string())])
            .await?;

        let raw = extract_symbols(&json);
        sanitize_tickers(raw, "trending", count)
    }

    async fn gainers(&self, limit: usize) -> Result<Vec<String>, AnalyzerError> {
        self.fetch_screener_symbols("day_gainers", limit).await
    }

    async fn losers(&self, limit: usize) -> Result<Vec<String>, AnalyzerError> {
        self.fetch_screener_symbols("day_losers", limit).await
    }
}

// ---------------------------------------------------------------------------
// Chart response shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartSeries>>,
    #[serde(default)]
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    #[allow(dead_code)]
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartSeries {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuoteBlock>,
    #[serde(default)]
    adjclose: Option<Vec<AdjCloseBlock>>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseBlock {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

impl ChartSeries {
    fn into_price_points(self) -> Vec<PricePoint> {
        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();
        let adjclose = self
            .indicators
            .adjclose
            .and_then(|mut blocks| if blocks.is_empty() { None } else { Some(blocks.remove(0)) });

        let at = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let date = DateTime::<Utc>::from_timestamp(ts, 0)?;
                let close = at(&quote.close, i)?;
                Some(PricePoint {
                    date,
                    open: at(&quote.open, i).unwrap_or(close),
                    high: at(&quote.high, i).unwrap_or(close),
                    low: at(&quote.low, i).unwrap_or(close),
                    close,
                    volume: at(&quote.volume, i).unwrap_or(0.0),
                    adj_close: adjclose.as_ref().and_then(|b| at(&b.adjclose, i)),
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Sanitization
// ---------------------------------------------------------------------------

fn normalize_limit(limit: usize) -> usize {
    if limit == 0 {
        DEFAULT_LIMIT
    } else {
        limit.min(MAX_LIMIT)
    }
}

fn extract_symbols(json: &serde_json::Value) -> Vec<String> {
    json.pointer("/finance/result/0/quotes")
        .and_then(|v| v.as_array())
        .map(|quotes| {
            quotes
                .iter()
                .filter_map(|q| q.get("symbol").and_then(|s| s.as_str()))
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn sanitize_ticker_symbol(symbol: &str) -> Option<String> {
    let trimmed = symbol.trim().to_uppercase();

    if trimmed.is_empty() {
        return None;
    }
    // Indexes, currencies and exchange-qualified symbols are not analyzable
    if trimmed.contains(['^', '=', ':']) {
        return None;
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-')
    {
        return None;
    }

    Some(trimmed)
}

fn sanitize_tickers(
    raw: Vec<String>,
    context: &str,
    limit: usize,
) -> Result<Vec<String>, AnalyzerError> {
    let mut unique = Vec::new();
    for symbol in raw {
        if let Some(clean) = sanitize_ticker_symbol(&symbol) {
            if !unique.contains(&clean) {
                unique.push(clean);
            }
        }
    }

    if unique.is_empty() {
        return Err(AnalyzerError::DataSource(format!(
            "No valid tickers returned for {}",
            context
        )));
    }

    unique.truncate(limit);
    Ok(unique)
}

fn validate_historical(
    ticker: &str,
    mut data: Vec<PricePoint>,
) -> Result<Vec<PricePoint>, AnalyzerError> {
    if data.is_empty() {
        return Err(AnalyzerError::DataSource(format!(
            "No historical data available for {}",
            ticker
        )));
    }

    data.retain(|p| p.close.is_finite() && p.volume.is_finite());

    if data.is_empty() {
        return Err(AnalyzerError::DataSource(format!(
            "Historical data for {} is missing price or volume information",
            ticker
        )));
    }

    data.sort_by_key(|p| p.date);
    Ok(data)
}

fn validate_quote(ticker: &str, quote: Quote) -> Result<Quote, AnalyzerError> {
    if !quote.regular_market_price.is_finite() {
        return Err(AnalyzerError::DataSource(format!(
            "Quote missing price data for {}",
            ticker
        )));
    }
    if !quote.regular_market_volume.is_finite() {
        return Err(AnalyzerError::DataSource(format!(
            "Quote missing volume data for {}",
            ticker
        )));
    }
    Ok(quote)
}
