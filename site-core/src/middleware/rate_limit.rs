use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use crate::error::AppError;

/// Fixed-count trailing-window limiter keyed by client IP.
///
/// Each accepted request records a hit; a request is rejected once the
/// number of hits inside the trailing window reaches `max_requests`.
pub struct SlidingWindowLimiter {
    window: Duration,
    max_requests: usize,
    message: &'static str,
    hits: DashMap<IpAddr, Vec<Instant>>,
}

impl SlidingWindowLimiter {
    pub fn new(window: Duration, max_requests: usize, message: &'static str) -> Arc<Self> {
        Arc::new(Self {
            window,
            max_requests,
            message,
            hits: DashMap::new(),
        })
    }

    /// Records a hit for `client` unless its window is already full.
    /// Returns the recorded instant so `forgive` can undo it later.
    fn try_acquire(&self, client: IpAddr, now: Instant) -> Result<Instant, AppError> {
        let mut entry = self.hits.entry(client).or_default();
        entry.retain(|hit| now.duration_since(*hit) < self.window);
        if entry.len() >= self.max_requests {
            return Err(AppError::TooManyRequests(self.message.to_string()));
        }
        entry.push(now);
        Ok(now)
    }

    /// Removes a previously recorded hit, so the request it belonged to
    /// no longer counts toward the window.
    fn forgive(&self, client: IpAddr, hit: Instant) {
        if let Some(mut entry) = self.hits.get_mut(&client) {
            if let Some(pos) = entry.iter().rposition(|h| *h == hit) {
                entry.remove(pos);
            }
        }
    }
}

fn client_ip(request: &Request) -> Option<IpAddr> {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| {
        request
            .extensions()
            .get::<axum::extract::ConnectInfo<SocketAddr>>()
            .map(|axum::extract::ConnectInfo(addr)| addr.ip())
    })
}

/// Middleware for per-route rate limiting. Every request reaching the
/// route counts, whatever its outcome.
pub async fn route_rate_limit(
    State(limiter): State<Arc<SlidingWindowLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(client) = client_ip(&request) else {
        tracing::warn!("Could not determine client IP for rate limiting");
        return Ok(next.run(request).await);
    };

    limiter.try_acquire(client, Instant::now())?;
    Ok(next.run(request).await)
}

/// Middleware for the global limiter. Requests that end in an error
/// status are removed from the window after the fact, so only
/// successful traffic consumes the quota.
pub async fn global_rate_limit(
    State(limiter): State<Arc<SlidingWindowLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(client) = client_ip(&request) else {
        tracing::warn!("Could not determine client IP for rate limiting");
        return Ok(next.run(request).await);
    };

    let hit = limiter.try_acquire(client, Instant::now())?;
    let response = next.run(request).await;

    if response.status().is_client_error() || response.status().is_server_error() {
        limiter.forgive(client, hit);
    }

    Ok(response)
}
