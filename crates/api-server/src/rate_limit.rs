use dashmap::DashMap;
use std::time::{Duration, Instant};

struct Bucket {
    window_start: Instant,
    count: u32,
}

/// Decision for one request against a client's budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

/// Fixed-window rate limiter keyed by client identity (IP or forwarded-for)
pub struct ClientRateLimiter {
    buckets: DashMap<String, Bucket>,
    max_requests: u32,
    window: Duration,
}

impl ClientRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn check(&self, client: &str) -> RateDecision {
        let now = Instant::now();
        let mut bucket = self
            .buckets
            .entry(client.to_string())
            .or_insert_with(|| Bucket { window_start: now, count: 0 });

        let elapsed = now.duration_since(bucket.window_start);
        if elapsed >= self.window {
            bucket.window_start = now;
            bucket.count = 0;
        }

        if bucket.count < self.max_requests {
            bucket.count += 1;
            RateDecision::Allowed
        } else {
            let retry_after = self.window.saturating_sub(elapsed);
            RateDecision::Limited {
                retry_after_secs: retry_after.as_secs().max(1),
            }
        }
    }
}
