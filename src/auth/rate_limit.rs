use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::AppState;

/// Attempts allowed per key and window on the credential endpoints.
const MAX_ATTEMPTS: u32 = 5;
const WINDOW: Duration = Duration::from_secs(60);

struct Window {
    opened: Instant,
    used: u32,
}

/// Fixed-window counters keyed by `ip:path`. Process-local, so each
/// replica enforces its own budget.
#[derive(Clone, Default)]
pub struct RateLimitState {
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Ok(remaining)` while under budget, otherwise `Err(retry_after)`.
    pub async fn check(&self, key: &str) -> Result<u32, Duration> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let window = windows.entry(key.to_owned()).or_insert(Window {
            opened: now,
            used: 0,
        });

        let age = now.duration_since(window.opened);
        if age > WINDOW {
            *window = Window {
                opened: now,
                used: 0,
            };
        } else if window.used >= MAX_ATTEMPTS {
            return Err(WINDOW.saturating_sub(age));
        }

        window.used += 1;
        Ok(MAX_ATTEMPTS - window.used)
    }

    /// Forget windows that closed more than one window ago.
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, w| now.duration_since(w.opened) < WINDOW * 2);
        tracing::debug!(dropped = before - windows.len(), "Rate limit windows swept");
    }
}

/// Per-IP, per-path limit on register, login and refresh.
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = format!("{}:{}", addr.ip(), req.uri().path());

    match state.rate_limiter.check(&key).await {
        Ok(remaining) => {
            tracing::debug!(key = %key, remaining, "Auth rate limit passed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            tracing::warn!(
                key = %key,
                retry_after_secs = retry_after.as_secs(),
                "Auth rate limit exceeded"
            );
            Err(AppError::RateLimited)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_attempts_counted_down() {
        let limiter = RateLimitState::new();
        let key = "10.0.0.1:/api/auth/login";

        for expected in (0..MAX_ATTEMPTS).rev() {
            assert_eq!(limiter.check(key).await, Ok(expected));
        }
        let retry_after = limiter.check(key).await.unwrap_err();
        assert!(retry_after <= WINDOW);
    }

    #[tokio::test]
    async fn test_register_and_login_limited_separately() {
        let limiter = RateLimitState::new();
        for _ in 0..MAX_ATTEMPTS {
            let _ = limiter.check("10.0.0.1:/api/auth/login").await;
        }
        assert!(limiter.check("10.0.0.1:/api/auth/login").await.is_err());
        assert!(limiter.check("10.0.0.1:/api/auth/register").await.is_ok());
        assert!(limiter.check("10.0.0.2:/api/auth/login").await.is_ok());
    }

    #[tokio::test]
    async fn test_cleanup_keeps_open_windows() {
        let limiter = RateLimitState::new();
        for _ in 0..MAX_ATTEMPTS {
            let _ = limiter.check("k").await;
        }
        limiter.cleanup().await;
        assert!(limiter.check("k").await.is_err());
    }
}
