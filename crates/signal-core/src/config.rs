use serde::{Deserialize, Serialize};

/// Analysis parameters. Constructed once per analyzer instance and read-only
/// during a call; `StockAnalyzer::update_config` between calls is the only
/// supported way to change behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Window for the short moving average and the minimum usable history
    pub short_moving_average: usize,
    pub long_moving_average: usize,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    pub atr_period: usize,
    pub volume_period: usize,
    /// Seconds a cached signal stays fresh
    pub cache_ttl_secs: u64,
    pub max_retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            short_moving_average: 50,
            long_moving_average: 200,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            atr_period: 14,
            volume_period: 20,
            cache_ttl_secs: 300,
            max_retry_attempts: 3,
            retry_delay_ms: 1000,
            max_retry_delay_ms: 5000,
        }
    }
}
