pub mod client;
pub mod rate_limit;

pub use client::YahooFinanceClient;
pub use rate_limit::RateLimiter;
