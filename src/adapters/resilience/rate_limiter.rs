//! Sliding-window rate limiter.
//!
//! Keeps the timestamp of every accepted request inside the window; a request
//! is accepted while fewer than `max_requests` remain after pruning.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::ports::{Clock, RateLimitConfig, RateLimitDenied, RateLimitResult, RateLimitStatus, RateLimiter};

pub struct SlidingWindowRateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    requests: Mutex<VecDeque<Timestamp>>,
}

impl SlidingWindowRateLimiter {
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            requests: Mutex::new(VecDeque::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Timestamp>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn prune(&self, requests: &mut VecDeque<Timestamp>, now: Timestamp) {
        while let Some(oldest) = requests.front() {
            if now.elapsed_since(oldest) >= self.config.window {
                requests.pop_front();
            } else {
                break;
            }
        }
    }

    fn status_of(&self, requests: &VecDeque<Timestamp>) -> RateLimitStatus {
        RateLimitStatus {
            limit: self.config.max_requests,
            remaining: self
                .config
                .max_requests
                .saturating_sub(requests.len() as u32),
            window: self.config.window,
        }
    }
}

impl RateLimiter for SlidingWindowRateLimiter {
    fn check(&self) -> RateLimitResult {
        let now = self.clock.now();
        let mut requests = self.lock();
        self.prune(&mut requests, now);

        if requests.len() as u32 >= self.config.max_requests {
            let retry_after = requests
                .front()
                .map(|oldest| self.config.window.saturating_sub(now.elapsed_since(oldest)))
                .unwrap_or(self.config.window);
            return RateLimitResult::Denied(RateLimitDenied {
                limit: self.config.max_requests,
                retry_after: retry_after.max(Duration::from_millis(1)),
            });
        }

        requests.push_back(now);
        RateLimitResult::Allowed(self.status_of(&requests))
    }

    fn status(&self) -> RateLimitStatus {
        let now = self.clock.now();
        let mut requests = self.lock();
        self.prune(&mut requests, now);
        self.status_of(&requests)
    }

    fn reset(&self) {
        self.lock().clear();
    }
}
