pub mod analyzer;
pub mod cache;
pub mod chart;
pub mod confidence;
pub mod metrics;
pub mod recommendation;
pub mod retry;
pub mod scanner;
pub mod scoring;
pub mod validate;


pub use analyzer::StockAnalyzer;
pub use cache::SignalCache;
pub use chart::build_chart_data;
pub use confidence::confidence_score;
pub use metrics::build_metrics;
pub use recommendation::{calculate_targets, Targets};
pub use retry::{execute_with_retry, RetryPolicy};
pub use scanner::{MarketScanner, ScanMatch, ScanResult, ScanStrategy};
pub use scoring::{calculate_score, ScoreResult};
pub use validate::{is_valid_ticker, validate_ticker, ValidationResult};
