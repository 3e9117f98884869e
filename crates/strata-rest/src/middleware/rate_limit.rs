//! Per-client fixed-window rate limiting backed by the cache adapter.

use crate::responses::AppError;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use strata_core::{StrataError, Upstream};
use strata_repository::{cache::cache_keys, CacheInterface};
use strata_resilience::with_timeout;
use tracing::{debug, warn};

/// Header consulted first when identifying the client.
const FORWARDED_FOR: &str = "x-forwarded-for";

/// Rate limit middleware state.
#[derive(Clone)]
pub struct RateLimitState {
    pub cache: Arc<dyn CacheInterface>,
    /// Requests allowed per client per window.
    pub limit: u32,
    pub window: Duration,
    /// Upper bound for the counter round-trip.
    pub cache_timeout: Duration,
}

impl RateLimitState {
    /// A limiter allowing `limit` requests per minute.
    pub fn per_minute(cache: Arc<dyn CacheInterface>, limit: u32, cache_timeout: Duration) -> Self {
        Self {
            cache,
            limit,
            window: Duration::from_secs(60),
            cache_timeout,
        }
    }
}

/// Identifies the client by the first `X-Forwarded-For` hop, then the peer address.
pub fn client_key(request: &Request<Body>) -> String {
    let forwarded = request
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(client) = forwarded {
        return client.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.ip().to_string())
}

/// Rejects clients over their window budget with 429.
///
/// The limiter fails open: a disabled or unreachable cache lets the request through.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.cache.is_enabled() {
        return next.run(request).await;
    }

    let key = cache_keys::rate_limit(&client_key(&request));
    let cache = Arc::clone(&state.cache);
    let window = state.window;
    let count = with_timeout(state.cache_timeout, Upstream::Cache, || async move {
        cache.increment(&key, window).await
    })
    .await;

    match count {
        Ok(count) if count > i64::from(state.limit) => {
            debug!(count, limit = state.limit, "Rate limit exceeded");
            AppError(StrataError::RateLimitExceeded).into_response()
        }
        Ok(_) => next.run(request).await,
        Err(e) => {
            warn!(error = %e, "Rate limiter unavailable, allowing request");
            next.run(request).await
        }
    }
}
