//! Sliding-window request rate limiter.
//!
//! Tracks request timestamps over the last 60 seconds and sleeps just long
//! enough to stay under the per-minute budget. `None` means unlimited
//! (paid API tiers); the free tier runs at 5 requests/minute.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);

pub struct RateLimiter {
    max_per_minute: Option<u32>,
    recent: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_per_minute: Option<u32>) -> Self {
        Self {
            max_per_minute,
            recent: Mutex::new(VecDeque::new()),
        }
    }

    /// Block until a request slot is available, then record the request.
    pub fn acquire(&self) {
        let Some(max) = self.max_per_minute else {
            return;
        };

        let mut recent = self.recent.lock().expect("rate limiter poisoned");
        let now = Instant::now();
        while let Some(&front) = recent.front() {
            if now.duration_since(front) >= WINDOW {
                recent.pop_front();
            } else {
                break;
            }
        }

        if recent.len() >= max as usize {
            let oldest = *recent.front().expect("window non-empty");
            let wait = WINDOW
                .checked_sub(now.duration_since(oldest))
                .unwrap_or_default()
                + Duration::from_millis(100);
            std::thread::sleep(wait);
        }

        recent.push_back(Instant::now());
    }
}
