use std::time::{Duration, Instant};

use dashmap::{DashMap, mapref::entry::Entry};

use crate::error::RateLimitError;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Keyed fixed-window counter
///
/// Windows are created lazily the first time an identity is seen and
/// reset in place once their deadline has strictly passed. The count
/// check and increment happen while holding the entry's shard lock, so
/// two concurrent requests cannot both claim the last slot.
#[derive(Debug, Default)]
pub struct FixedWindowLimiter {
    windows: DashMap<String, Window>,
}

impl FixedWindowLimiter {
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
        }
    }

    /// Record one request for `identity` against `limit` per `window`
    ///
    /// A request exactly at the deadline still counts against the old
    /// window; the next one starts a fresh count of 1.
    pub fn check(&self, identity: &str, limit: u32, window: Duration) -> Result<(), RateLimitError> {
        let now = Instant::now();

        match self.windows.entry(identity.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(Window {
                    count: 1,
                    reset_at: now + window,
                });
                Ok(())
            }
            Entry::Occupied(mut entry) => {
                let state = entry.get_mut();
                if now > state.reset_at {
                    state.count = 1;
                    state.reset_at = now + window;
                    Ok(())
                } else if state.count < limit {
                    state.count += 1;
                    Ok(())
                } else {
                    let remaining = state.reset_at.saturating_duration_since(now);
                    Err(RateLimitError::Exceeded {
                        retry_after: retry_after_secs(remaining),
                    })
                }
            }
        }
    }

    /// Drop the window for one identity
    pub fn reset(&self, identity: &str) {
        self.windows.remove(identity);
    }

    /// Drop every window
    pub fn reset_all(&self) {
        self.windows.clear();
    }
}

/// Round the remaining wait up to whole seconds, never below 1
fn retry_after_secs(remaining: Duration) -> u64 {
    let whole = remaining.as_secs();
    let secs = if remaining.subsec_nanos() > 0 { whole + 1 } else { whole };
    secs.max(1)
}
