//! Fixed-window rate limiting per client address

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dashmap::DashMap;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Instant;

use crate::config::RateLimit;
use crate::state::AppState;

struct Window {
    started: Instant,
    count: u32,
}

/// Counts requests per client in fixed windows
///
/// Expired windows are swept at most once per window length, so clients
/// that stop sending requests do not stay in memory.
pub struct RateLimiter {
    limit: RateLimit,
    windows: DashMap<String, Window>,
    last_sweep: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            windows: DashMap::new(),
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn limit(&self) -> &RateLimit {
        &self.limit
    }

    /// Record a request from `client`; false when it exceeds the limit
    pub fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }

    /// Clients currently holding a window
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    pub fn check_at(&self, client: &str, now: Instant) -> bool {
        self.sweep_expired(now);

        let mut window = self.windows.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.limit.window {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.limit.requests {
            return false;
        }
        window.count += 1;
        true
    }
}

impl RateLimiter {
    /// Drop windows that ended, unless a sweep already ran within the last window
    fn sweep_expired(&self, now: Instant) {
        let window = self.limit.window;
        {
            let mut last_sweep = match self.last_sweep.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if now.saturating_duration_since(*last_sweep) < window {
                return;
            }
            *last_sweep = now;
        }
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < window);
    }
}

/// Client key: the peer IP when the server exposes connection info
fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn enforce(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(limiter) = &state.limiter {
        let client = client_key(&request);
        if !limiter.check(&client) {
            tracing::warn!(client = %client, "Rate limit exceeded");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": format!("Rate limit exceeded: {}", limiter.limit()) })),
            )
                .into_response();
        }
    }
    next.run(request).await
}
