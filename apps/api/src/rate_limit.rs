//! Fixed-window, per-client-IP request limit for the `/api/` surface.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header::RETRY_AFTER, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitCheck {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    pub reset_after_secs: u64,
}

#[derive(Debug)]
pub struct RateLimiter {
    max: u64,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(max: u64, window: Duration) -> Self {
        Self {
            max,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, ip: IpAddr) -> RateLimitCheck {
        self.check_at(ip, Instant::now())
    }

    /// Counts one request from `ip` at `now`.
    pub fn check_at(&self, ip: IpAddr, now: Instant) -> RateLimitCheck {
        let mut windows = self.windows.lock();
        let window = self.window;
        windows.retain(|_, w| now.saturating_duration_since(w.started) < window);

        let entry = windows.entry(ip).or_insert(Window {
            started: now,
            hits: 0,
        });
        entry.hits = entry.hits.saturating_add(1);

        let allowed = entry.hits <= self.max;
        let elapsed = now.saturating_duration_since(entry.started);
        let reset_after = window.saturating_sub(elapsed);
        RateLimitCheck {
            allowed,
            limit: self.max,
            remaining: self.max.saturating_sub(entry.hits),
            reset_after_secs: reset_after.as_secs() + u64::from(reset_after.subsec_nanos() > 0),
        }
    }
}

fn client_ip(req: &Request) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

fn apply_headers(res: &mut Response, check: RateLimitCheck) {
    let headers = res.headers_mut();
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(check.limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(check.remaining));
    headers.insert(RATE_LIMIT_RESET, HeaderValue::from(check.reset_after_secs));
    if !check.allowed {
        headers.insert(RETRY_AFTER, HeaderValue::from(check.reset_after_secs));
    }
}

/// Requests without a known peer address (in-process calls) are not limited.
pub async fn api_rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if !(path == "/api" || path.starts_with("/api/")) {
        return next.run(req).await;
    }
    let Some(ip) = client_ip(&req) else {
        return next.run(req).await;
    };

    let check = state.rate_limiter.check(ip);
    let mut res = if check.allowed {
        next.run(req).await
    } else {
        warn!("Rate limit exceeded for {ip}");
        AppError::TooManyRequests.into_response()
    };
    apply_headers(&mut res, check);
    res
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));
    const OTHER: IpAddr = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 2));

    #[test]
    fn test_limit_applies_per_ip() {
        let limiter = RateLimiter::new(2, Duration::from_secs(900));
        let now = Instant::now();

        let first = limiter.check_at(CLIENT, now);
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);
        assert!(limiter.check_at(CLIENT, now).allowed);

        let third = limiter.check_at(CLIENT, now);
        assert!(!third.allowed);
        assert_eq!(third.remaining, 0);
        assert_eq!(third.reset_after_secs, 900);

        assert!(limiter.check_at(OTHER, now).allowed);
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at(CLIENT, start).allowed);
        assert!(!limiter.check_at(CLIENT, start + Duration::from_secs(30)).allowed);

        let later = limiter.check_at(CLIENT, start + Duration::from_secs(61));
        assert!(later.allowed);
        assert_eq!(later.reset_after_secs, 60);
    }
}
