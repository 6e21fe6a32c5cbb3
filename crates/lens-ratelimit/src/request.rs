use std::{collections::HashMap, time::Duration};

use lens_config::{RateLimitConfig, RequestRateLimit};

use crate::{error::RateLimitError, window::FixedWindowLimiter};

/// HTTP request-level rate limiter
///
/// Per-user and per-IP limits cover the whole API surface; route
/// limits stack on top for expensive endpoints. All scopes share one
/// window table with namespaced identities, so clearing a user drops
/// their route windows too.
#[derive(Debug)]
pub struct RequestLimiter {
    per_user: Option<Scope>,
    per_ip: Option<Scope>,
    routes: HashMap<String, Scope>,
    windows: FixedWindowLimiter,
}

#[derive(Debug, Clone, Copy)]
struct Scope {
    requests: u32,
    window: Duration,
}

impl RequestLimiter {
    /// Create from configuration
    pub fn new(config: &RateLimitConfig) -> Result<Self, RateLimitError> {
        let per_user = config
            .per_user
            .as_ref()
            .map(|rl| build_scope("per_user", rl))
            .transpose()?;

        let per_ip = config
            .per_ip
            .as_ref()
            .map(|rl| build_scope("per_ip", rl))
            .transpose()?;

        let mut routes = HashMap::with_capacity(config.routes.len());
        for (name, rl) in &config.routes {
            routes.insert(name.clone(), build_scope(name, rl)?);
        }

        Ok(Self {
            per_user,
            per_ip,
            routes,
            windows: FixedWindowLimiter::new(),
        })
    }

    /// Check the per-user rate limit
    pub fn check_user(&self, user_id: &str) -> Result<(), RateLimitError> {
        if let Some(scope) = self.per_user {
            self.windows
                .check(&format!("user:{user_id}"), scope.requests, scope.window)?;
        }
        Ok(())
    }

    /// Check the per-IP rate limit
    pub fn check_ip(&self, ip: &str) -> Result<(), RateLimitError> {
        if let Some(scope) = self.per_ip {
            self.windows
                .check(&format!("ip:{ip}"), scope.requests, scope.window)?;
        }
        Ok(())
    }

    /// Check a named route limit for one user
    ///
    /// Routes without a configured limit always pass.
    pub fn check_route(&self, route: &str, user_id: &str) -> Result<(), RateLimitError> {
        if let Some(scope) = self.routes.get(route) {
            self.windows.check(
                &format!("route:{route}:user:{user_id}"),
                scope.requests,
                scope.window,
            )?;
        }
        Ok(())
    }

    /// Drop all windows belonging to one user
    pub fn reset_user(&self, user_id: &str) {
        self.windows.reset(&format!("user:{user_id}"));
        for route in self.routes.keys() {
            self.windows.reset(&format!("route:{route}:user:{user_id}"));
        }
    }

    /// Drop every window across all scopes
    pub fn reset_all(&self) {
        self.windows.reset_all();
    }
}

fn build_scope(name: &str, rate_limit: &RequestRateLimit) -> Result<Scope, RateLimitError> {
    if rate_limit.requests == 0 {
        return Err(RateLimitError::Config(format!(
            "rate limit '{name}' must allow at least one request"
        )));
    }

    let window = parse_duration(&rate_limit.window)?;
    if window.is_zero() {
        return Err(RateLimitError::Config(format!(
            "rate limit '{name}' window must be greater than zero"
        )));
    }

    Ok(Scope {
        requests: rate_limit.requests,
        window,
    })
}

fn parse_duration(s: &str) -> Result<Duration, RateLimitError> {
    duration_str::parse(s).map_err(|e| RateLimitError::Config(format!("invalid duration '{s}': {e}")))
}
