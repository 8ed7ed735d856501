use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::application::ports::RateLimiter;

/// Fixed-window throttle over an in-memory timestamp map. Soft by design:
/// state is process-local and lost on restart.
pub struct FixedWindowLimiter {
    window: Duration,
    max_requests: usize,
    requests: Mutex<HashMap<String, Vec<Instant>>>,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
            requests: Mutex::new(HashMap::new()),
        }
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn admit(&self, key: &str) -> bool {
        let now = Instant::now();

        // Limiter bookkeeping is best-effort; a poisoned lock still serves.
        let mut requests = match self.requests.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let timestamps = requests.entry(key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            tracing::debug!(key, in_window = timestamps.len(), "Rate limit exceeded");
            return false;
        }

        timestamps.push(now);
        true
    }
}
