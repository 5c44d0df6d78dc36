use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::token::TokenState;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::sources::context::LoginContext;
use crate::sources::Login;
use crate::utils::constants::{LOGIN_FAILED_MSG, TOKEN_LIFETIME};

/// Self-refreshing bearer token cache.
///
/// Two locks are involved:
/// - `token` guards the token value and its issue time; it is only ever
///   held for a copy or an overwrite, never across a login call.
/// - `refresh` decides who may run a login from [`TokenCache::ensure_fresh`].
///   It is always taken before `token` and held across the login call, so
///   a burst of stale callers collapses into a single round-trip.
#[derive(Debug)]
pub struct TokenCache<L> {
    login: L,
    lifetime: Duration,
    token: RwLock<TokenState>,
    refresh: Mutex<()>,
}

impl<L: Login> TokenCache<L> {
    pub fn new(login: L) -> Self {
        Self::with_lifetime(login, TOKEN_LIFETIME)
    }

    pub fn with_lifetime(login: L, lifetime: Duration) -> Self {
        Self {
            login,
            lifetime,
            token: RwLock::new(TokenState::default()),
            refresh: Mutex::new(()),
        }
    }

    /// Make sure a fresh token is cached, logging in at most once across
    /// all concurrent callers.
    ///
    /// Returns immediately when the cached token is younger than the
    /// lifetime. Otherwise waits for the refresh gate, checks again (a
    /// previous holder may already have logged in) and only then logs in
    /// under `ctx`. A login error is returned to this caller only; callers
    /// queued behind it re-check and try again with their own context.
    pub async fn ensure_fresh(&self, ctx: &LoginContext) -> Result<()> {
        if self.is_fresh().await {
            debug!("cached token is fresh");
            return Ok(());
        }

        let _gate = self.refresh.lock().await;

        if self.is_fresh().await {
            debug!("token was refreshed while waiting for the refresh gate");
            get_metrics().await.login_skipped.inc();
            return Ok(());
        }

        self.force_login(ctx).await
    }

    /// Log in unconditionally, storing the token on success and clearing
    /// the cached state on any failure.
    ///
    /// Not gated: concurrent calls run concurrent logins. Use
    /// [`TokenCache::ensure_fresh`] for the single-flight guarantee.
    pub async fn force_login(&self, ctx: &LoginContext) -> Result<()> {
        let metrics = get_metrics().await;
        metrics.login_attempts.inc();
        let start = get_instant();
        info!("logging in");

        let result = ctx
            .run(self.login.login(ctx))
            .await
            .and_then(|token| {
                if token.is_empty() {
                    return Err(anyhow!("login returned an empty token"));
                }
                Ok(token)
            });
        metrics.login_duration.observe(start.elapsed().as_secs_f64());

        match result {
            Ok(token) => {
                let mut state = self.token.write().await;
                state.issue(token);
                let issued_at = state.issued_at_utc().map(|ts| ts.timestamp()).unwrap_or_default();
                drop(state);

                metrics.token_issued_at_unix.set(issued_at);
                info!("login succeeded, token valid for {:?}", self.lifetime);
                Ok(())
            }
            Err(err) => {
                self.token.write().await.reset();

                metrics.token_issued_at_unix.set(0);
                metrics.login_failures.inc();
                warn!("login failed: {:#}", err);
                Err(err.context(LOGIN_FAILED_MSG))
            }
        }
    }

    /// Last known token, empty if never logged in or the last login failed.
    ///
    /// Does not wait for an in-flight login; call
    /// [`TokenCache::ensure_fresh`] first when freshness matters.
    pub async fn current_token(&self) -> String {
        self.token.read().await.value().to_owned()
    }

    /// Time since the last successful login.
    pub async fn token_age(&self) -> Option<Duration> {
        self.token.read().await.age()
    }

    pub async fn issued_at_utc(&self) -> Option<DateTime<Utc>> {
        self.token.read().await.issued_at_utc()
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    async fn is_fresh(&self) -> bool {
        self.token.read().await.is_fresh(self.lifetime)
    }
}
