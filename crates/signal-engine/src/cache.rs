use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use signal_core::StockSignal;

struct CacheEntry {
    signal: StockSignal,
    cached_at: DateTime<Utc>,
}

/// TTL cache of completed signals keyed by ticker. Lookups past the TTL
/// evict the stale entry and miss.
pub struct SignalCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl SignalCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    pub fn get(&self, ticker: &str) -> Option<StockSignal> {
        let fresh = {
            let entry = self.entries.get(ticker)?;
            if Utc::now() - entry.cached_at < self.ttl {
                Some(entry.signal.clone())
            } else {
                None
            }
        };

        if fresh.is_none() {
            self.entries.remove(ticker);
        }
        fresh
    }

    pub fn set(&self, ticker: &str, signal: StockSignal) {
        self.entries.insert(
            ticker.to_string(),
            CacheEntry { signal, cached_at: Utc::now() },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_core::{ChartData, Recommendation, SignalSummary, StockMetrics};

    fn dummy_signal(ticker: &str) -> StockSignal {
        StockSignal {
            ticker: ticker.to_string(),
            recommendation: Recommendation::Hold,
            confidence: 50.0,
            price: 100.0,
            target_price: 102.0,
            stop_loss: 98.0,
            potential_gain: 2.0,
            risk: 2.0,
            risk_reward_ratio: 1.0,
            reasons: vec![],
            metrics: StockMetrics {
                current_price: 100.0,
                sma_50: 100.0,
                sma_200: 100.0,
                ema_20: 100.0,
                rsi: 50.0,
                macd: None,
                macd_signal: None,
                macd_histogram: None,
                bb_position: 0.5,
                volume_ratio: 1.0,
                atr: 2.0,
                trend_strength: 0.0,
                pe_ratio: None,
                forward_pe: None,
                peg_ratio: None,
                profit_margin: None,
                debt_to_equity: None,
                price_change_50d: 0.0,
            },
            chart_data: ChartData {
                dates: vec![],
                prices: vec![],
                volumes: vec![],
                sma_50_values: vec![],
                sma_200_values: vec![],
                ema_20_values: vec![],
                rsi_values: vec![],
                macd_values: vec![],
                macd_signal_values: vec![],
                macd_histogram_values: vec![],
                bb_upper: vec![],
                bb_middle: vec![],
                bb_lower: vec![],
                volume_sma: vec![],
            },
            timestamp: Utc::now(),
            signal_summary: SignalSummary { bullish: 0, bearish: 0, total: 7 },
        }
    }

    #[test]
    fn hit_within_ttl() {
        let cache = SignalCache::new(300);
        cache.set("AAPL", dummy_signal("AAPL"));

        let hit = cache.get("AAPL").unwrap();
        assert_eq!(hit.ticker, "AAPL");
    }

    #[test]
    fn miss_for_unknown_ticker() {
        let cache = SignalCache::new(300);
        assert!(cache.get("MSFT").is_none());
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let cache = SignalCache::new(0);
        cache.set("AAPL", dummy_signal("AAPL"));

        assert!(cache.get("AAPL").is_none());
        // The stale entry is evicted, not just skipped
        assert!(cache.is_empty());
    }
}
