//! Password attempt limiting.
//!
//! Fixed-window counter per client IP, applied to routes that check the
//! admin password so guessing is slowed to a handful of tries per minute.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Configuration for attempt limiting.
#[derive(Debug, Clone)]
pub struct AttemptLimitConfig {
    /// Attempts allowed per window.
    pub max_attempts: u32,
    /// Window duration.
    pub window: Duration,
}

impl AttemptLimitConfig {
    pub fn per_minute(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            window: Duration::from_secs(60),
        }
    }
}

impl Default for AttemptLimitConfig {
    fn default() -> Self {
        Self::per_minute(10)
    }
}

/// Attempt counters keyed by client IP.
pub struct AttemptLimiter {
    config: AttemptLimitConfig,
    state: Mutex<HashMap<IpAddr, AttemptWindow>>,
}

struct AttemptWindow {
    count: u32,
    started: Instant,
}

#[derive(Debug, PartialEq, Eq)]
enum AttemptDecision {
    Allowed { remaining: u32 },
    Exceeded { retry_after: Duration },
}

impl AttemptLimiter {
    pub fn new(config: AttemptLimitConfig) -> Self {
        Self {
            config,
            state: Mutex::new(HashMap::new()),
        }
    }

    fn check(&self, ip: IpAddr) -> AttemptDecision {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> AttemptDecision {
        let mut state = self.state.lock();

        let entry = state.entry(ip).or_insert(AttemptWindow {
            count: 0,
            started: now,
        });

        if now.duration_since(entry.started) >= self.config.window {
            entry.count = 0;
            entry.started = now;
        }

        entry.count += 1;

        if entry.count > self.config.max_attempts {
            let reset_at = entry.started + self.config.window;
            AttemptDecision::Exceeded {
                retry_after: reset_at.saturating_duration_since(now),
            }
        } else {
            AttemptDecision::Allowed {
                remaining: self.config.max_attempts - entry.count,
            }
        }
    }

    /// Drop windows that have expired. Called periodically from the server.
    pub fn prune(&self) {
        let now = Instant::now();
        let window = self.config.window;
        self.state
            .lock()
            .retain(|_, entry| now.duration_since(entry.started) < window);
    }

    pub fn tracked_clients(&self) -> usize {
        self.state.lock().len()
    }
}

/// Middleware rejecting clients that exceed their attempt budget.
pub async fn limit_attempts(
    State(limiter): State<Arc<AttemptLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // ConnectInfo is absent when the router is driven without a socket.
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limiter.check(ip) {
        AttemptDecision::Allowed { remaining } => {
            debug!(ip = %ip, remaining, "Password attempt allowed");
            next.run(request).await
        }
        AttemptDecision::Exceeded { retry_after } => {
            let retry_secs = retry_after.as_secs().max(1);
            warn!(
                ip = %ip,
                path = %request.uri().path(),
                retry_after_secs = retry_secs,
                "Password attempt limit exceeded"
            );

            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_secs.to_string())],
                Json(serde_json::json!({
                    "message": "Too many attempts. Please try again later.",
                    "retryAfterSeconds": retry_secs,
                })),
            )
                .into_response()
        }
    }
}
