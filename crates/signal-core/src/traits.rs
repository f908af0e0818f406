use crate::{AnalyzerError, PricePoint, Quote};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Date window for a historical bar request
#[derive(Debug, Clone, Copy)]
pub struct HistoricalRange {
    pub period1: DateTime<Utc>,
    pub period2: DateTime<Utc>,
}

/// Upstream market-data provider. Implementations must return history in
/// ascending date order and reject empty or non-finite data.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn historical(
        &self,
        ticker: &str,
        range: HistoricalRange,
    ) -> Result<Vec<PricePoint>, AnalyzerError>;

    async fn quote(&self, ticker: &str) -> Result<Quote, AnalyzerError>;

    async fn trending(&self, limit: usize) -> Result<Vec<String>, AnalyzerError>;

    async fn gainers(&self, limit: usize) -> Result<Vec<String>, AnalyzerError>;

    async fn losers(&self, limit: usize) -> Result<Vec<String>, AnalyzerError>;
}
