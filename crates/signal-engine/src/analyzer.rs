use crate::cache::SignalCache;
use crate::chart::build_chart_data;
use crate::confidence::confidence_score;
use crate::metrics::build_metrics;
use crate::recommendation::calculate_targets;
use crate::retry::{execute_with_retry, RetryPolicy};
use crate::scoring::calculate_score;
use crate::validate::validate_ticker;
use chrono::{Duration, Utc};
use signal_core::{
    AnalysisConfig, AnalyzerError, HistoricalRange, MarketDataSource, Recommendation,
    SignalSummary, StockSignal,
};
use std::sync::Arc;
use tokio::task::JoinSet;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Stock analysis engine with configurable indicator parameters.
///
/// Each instance owns its configuration; `update_config` between calls is
/// the only way to change behavior. Analyses are pure given their fetched
/// inputs, so one analyzer can serve arbitrary concurrent callers.
pub struct StockAnalyzer {
    config: AnalysisConfig,
    data_source: Arc<dyn MarketDataSource>,
}

impl StockAnalyzer {
    pub fn new(data_source: Arc<dyn MarketDataSource>) -> Self {
        Self::with_config(AnalysisConfig::default(), data_source)
    }

    pub fn with_config(config: AnalysisConfig, data_source: Arc<dyn MarketDataSource>) -> Self {
        Self { config, data_source }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: AnalysisConfig) {
        self.config = config;
    }

    pub fn data_source(&self) -> &Arc<dyn MarketDataSource> {
        &self.data_source
    }

    /// Create a fresh signal cache sized to this analyzer's TTL
    pub fn new_cache(&self) -> SignalCache {
        SignalCache::new(self.config.cache_ttl_secs)
    }

    /// Analyze a ticker end to end: validate, fetch history and quote,
    /// assemble metrics, score, derive recommendation, targets, confidence
    /// and chart series.
    pub async fn analyze(&self, ticker: &str) -> Result<StockSignal, AnalyzerError> {
        let validation = validate_ticker(ticker);
        if !validation.is_valid {
            return Err(AnalyzerError::Validation(validation.errors.join("; ")));
        }
        let ticker = validation.sanitized_ticker;

        tracing::info!("Analyzing {}", ticker);
        self.analyze_validated(&ticker)
            .await
            .map_err(|e| e.for_ticker(&ticker))
    }

    async fn analyze_validated(&self, ticker: &str) -> Result<StockSignal, AnalyzerError> {
        // Request extra calendar days: the provider only returns trading
        // days, so covering the long MA plus a display year takes ~1.5x
        // the span in wall-clock days
        let days_to_request =
            (((self.config.long_moving_average + 50) as f64) * 1.5).ceil() as i64;
        let now = Utc::now();
        let range = HistoricalRange {
            period1: now - Duration::days(days_to_request),
            period2: now,
        };

        let policy = RetryPolicy::from_config(&self.config);
        let source = &self.data_source;

        // The two fetches are independent; run them concurrently, each with
        // its own retry wrapper
        let (historical, quote) = tokio::join!(
            execute_with_retry(|| source.historical(ticker, range), policy),
            execute_with_retry(|| source.quote(ticker), policy),
        );
        let historical = historical.map_err(|e| {
            AnalyzerError::DataSource(format!(
                "Failed to fetch historical data after retries: {}",
                e
            ))
        })?;
        let quote = quote.map_err(|e| {
            AnalyzerError::DataSource(format!("Failed to fetch quote data after retries: {}", e))
        })?;

        if historical.len() < self.config.short_moving_average {
            return Err(AnalyzerError::InsufficientData(format!(
                "need at least {} data points, got {}",
                self.config.short_moving_average,
                historical.len()
            )));
        }

        let closes: Vec<f64> = historical.iter().map(|p| p.close).collect();
        let highs: Vec<f64> = historical.iter().map(|p| p.high).collect();
        let lows: Vec<f64> = historical.iter().map(|p| p.low).collect();
        let volumes: Vec<f64> = historical.iter().map(|p| p.volume).collect();
        let dates: Vec<String> = historical.iter().map(|p| p.date.to_rfc3339()).collect();

        let metrics = build_metrics(&closes, &highs, &lows, &volumes, &quote, &self.config)?;
        let chart_data = build_chart_data(&closes, &volumes, &dates, &self.config)?;

        let score_result = calculate_score(&metrics, &self.config);
        let recommendation = Recommendation::from_score(score_result.score);

        let confidence = confidence_score(
            score_result.bullish_count,
            score_result.bearish_count,
            score_result.score,
        );
        tracing::debug!(
            "{}: score {:.1}, confidence {:.1}, {} bullish / {} bearish",
            ticker,
            score_result.score,
            confidence,
            score_result.bullish_count,
            score_result.bearish_count
        );

        let current_price = metrics.current_price;
        let targets = calculate_targets(current_price, metrics.atr, recommendation);

        Ok(StockSignal {
            ticker: ticker.to_string(),
            recommendation,
            confidence: round1(confidence),
            price: round2(current_price),
            target_price: round2(targets.target),
            stop_loss: round2(targets.stop_loss),
            potential_gain: round2((targets.target - current_price) / current_price * 100.0),
            risk: round2((current_price - targets.stop_loss) / current_price * 100.0),
            risk_reward_ratio: round2(
                (targets.target - current_price) / (current_price - targets.stop_loss),
            ),
            reasons: score_result.reasons,
            metrics,
            chart_data,
            timestamp: Utc::now(),
            signal_summary: SignalSummary {
                bullish: score_result.bullish_count,
                bearish: score_result.bearish_count,
                total: 7,
            },
        })
    }

    /// Analyze many tickers concurrently with settled-result semantics:
    /// individual failures are reported per ticker, never failing the batch.
    /// Results come back in input order.
    pub async fn analyze_many(
        self: &Arc<Self>,
        tickers: &[String],
    ) -> Vec<(String, Result<StockSignal, AnalyzerError>)> {
        let mut tasks = JoinSet::new();
        for (index, ticker) in tickers.iter().enumerate() {
            let analyzer = Arc::clone(self);
            let ticker = ticker.clone();
            tasks.spawn(async move {
                let result = analyzer.analyze(&ticker).await;
                (index, ticker, result)
            });
        }

        let mut slots: Vec<Option<(String, Result<StockSignal, AnalyzerError>)>> =
            (0..tickers.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, ticker, result)) => slots[index] = Some((ticker, result)),
                Err(e) => tracing::error!("Analysis task error: {}", e),
            }
        }

        slots.into_iter().flatten().collect()
    }
}
