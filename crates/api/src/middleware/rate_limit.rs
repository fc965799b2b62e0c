//! Rate limiting middleware.
//!
//! Per-client rate limiting keyed by peer IP address. Each client gets a
//! governor limiter allowing `max_requests` per `window`, refilled evenly.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovRateLimiter,
};
use serde_json::json;
use std::{
    collections::HashMap,
    net::SocketAddr,
    num::NonZeroU32,
    sync::{Arc, RwLock},
    time::Duration,
};

use crate::app::AppState;

/// Key used when the peer address is unavailable (e.g. in-process tests).
const UNKNOWN_CLIENT: &str = "unknown";

type ClientRateLimiter = GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter state shared across all requests, one limiter per client key.
pub struct RateLimiterState {
    limiters: RwLock<HashMap<String, Arc<ClientRateLimiter>>>,
    quota: Quota,
    max_requests: u32,
    window_secs: u64,
}

impl RateLimiterState {
    /// Returns None when `max_requests` is 0 (rate limiting disabled).
    pub fn new(max_requests: u32, window_secs: u64) -> Option<Self> {
        let burst = NonZeroU32::new(max_requests)?;
        let window = Duration::from_secs(window_secs.max(1));
        let period = window / max_requests;
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Some(Self {
            limiters: RwLock::new(HashMap::new()),
            quota,
            max_requests,
            window_secs,
        })
    }

    fn get_or_create_limiter(&self, key: &str) -> Arc<ClientRateLimiter> {
        {
            let limiters = self.limiters.read().unwrap_or_else(|e| e.into_inner());
            if let Some(limiter) = limiters.get(key) {
                return limiter.clone();
            }
        }

        let mut limiters = self.limiters.write().unwrap_or_else(|e| e.into_inner());
        limiters
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(GovRateLimiter::direct(self.quota)))
            .clone()
    }

    /// Ok when the request is allowed, otherwise the seconds until retry.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let limiter = self.get_or_create_limiter(key);

        match limiter.check() {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(DefaultClock::default().now());
                Err(wait_time.as_secs().max(1))
            }
        }
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let active = self
            .limiters
            .read()
            .map(|l| l.len())
            .unwrap_or_default();
        f.debug_struct("RateLimiterState")
            .field("max_requests", &self.max_requests)
            .field("window_secs", &self.window_secs)
            .field("active_limiters", &active)
            .finish()
    }
}

/// Middleware that applies rate limiting per client IP.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(rate_limiter) = state.rate_limiter.as_ref() else {
        return next.run(req).await;
    };

    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

    if let Err(retry_after) = rate_limiter.check(&client) {
        tracing::warn!(client = %client, retry_after, "Rate limit exceeded");
        return rate_limited_response(retry_after);
    }

    next.run(req).await
}

/// 429 in the standard failure envelope with a Retry-After header.
fn rate_limited_response(retry_after: u64) -> Response {
    let body = json!({
        "success": false,
        "error": "rate_limited",
        "message": "Too many requests. Please try again later.",
        "retryAfter": retry_after
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}
