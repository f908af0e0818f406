use crate::analyzer::StockAnalyzer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signal_core::{AnalyzerError, Recommendation};
use std::sync::Arc;

/// How the scanner discovers candidate tickers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStrategy {
    Trending,
    Gainers,
    Losers,
}

impl ScanStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "trending" => Some(ScanStrategy::Trending),
            "gainers" => Some(ScanStrategy::Gainers),
            "losers" => Some(ScanStrategy::Losers),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStrategy::Trending => "trending",
            ScanStrategy::Gainers => "gainers",
            ScanStrategy::Losers => "losers",
        }
    }
}

/// One analyzed candidate, trimmed to the fields a scan listing shows
#[derive(Debug, Clone, Serialize)]
pub struct ScanMatch {
    pub ticker: String,
    pub recommendation: Recommendation,
    pub confidence: f64,
    pub price: f64,
    pub potential_gain: f64,
    pub risk_reward_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub strategy: ScanStrategy,
    pub total_scanned: usize,
    pub matches: Vec<ScanMatch>,
    pub timestamp: DateTime<Utc>,
}

/// Discovers tickers by market activity and fans analyses out over them
pub struct MarketScanner {
    analyzer: Arc<StockAnalyzer>,
}

impl MarketScanner {
    pub fn new(analyzer: Arc<StockAnalyzer>) -> Self {
        Self { analyzer }
    }

    pub async fn scan(
        &self,
        strategy: ScanStrategy,
        limit: usize,
    ) -> Result<ScanResult, AnalyzerError> {
        let source = self.analyzer.data_source();
        let tickers = match strategy {
            ScanStrategy::Trending => source.trending(limit).await?,
            ScanStrategy::Gainers => source.gainers(limit).await?,
            ScanStrategy::Losers => source.losers(limit).await?,
        };
        let total_scanned = tickers.len();

        tracing::info!("Scanning {} {} tickers", total_scanned, strategy.as_str());

        let results = self.analyzer.analyze_many(&tickers).await;

        let mut matches: Vec<ScanMatch> = results
            .into_iter()
            .filter_map(|(ticker, result)| match result {
                Ok(signal) => Some(ScanMatch {
                    ticker,
                    recommendation: signal.recommendation,
                    confidence: signal.confidence,
                    price: signal.price,
                    potential_gain: signal.potential_gain,
                    risk_reward_ratio: signal.risk_reward_ratio,
                }),
                Err(e) => {
                    tracing::warn!("Scanner analysis failed for {}: {}", ticker, e);
                    None
                }
            })
            .collect();

        // Best upside first
        matches.sort_by(|a, b| {
            b.potential_gain
                .partial_cmp(&a.potential_gain)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::info!(
            "Scan complete: {}/{} tickers analyzed successfully",
            matches.len(),
            total_scanned
        );

        Ok(ScanResult {
            strategy,
            total_scanned,
            matches,
            timestamp: Utc::now(),
        })
    }
}
