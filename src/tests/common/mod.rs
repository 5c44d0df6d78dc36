// tests/common/mod.rs
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;

use crate::cache::token_cache::TokenCache;
use crate::sources::context::LoginContext;
use crate::sources::Login;

/// Scripted login capability that records how it is called.
///
/// Scripted outcomes are consumed in order; once exhausted every call
/// succeeds with `token-<call number>`.
#[derive(Debug, Default)]
pub struct MockLogin {
    delay: Duration,
    outcomes: Mutex<VecDeque<Result<String, String>>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockLogin {
    pub fn new() -> Arc<Self> {
        Self::scripted(&[], Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Self::scripted(&[], delay)
    }

    /// `Ok` entries are returned as tokens, `Err` entries as login errors.
    pub fn scripted(outcomes: &[Result<&str, &str>], delay: Duration) -> Arc<Self> {
        let outcomes = outcomes
            .iter()
            .map(|outcome| outcome.map(str::to_owned).map_err(str::to_owned))
            .collect();
        Arc::new(Self {
            delay,
            outcomes: Mutex::new(outcomes),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Keeps `in_flight` right when a login future is dropped mid-sleep.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Login for MockLogin {
    async fn login(&self, _ctx: &LoginContext) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let outcome = self.outcomes.lock().unwrap().pop_front();
        match outcome {
            Some(Ok(token)) => Ok(token),
            Some(Err(reason)) => Err(anyhow!(reason)),
            None => Ok(format!("token-{}", call)),
        }
    }
}

pub fn cache_with(login: &Arc<MockLogin>, lifetime: Duration) -> Arc<TokenCache<Arc<MockLogin>>> {
    Arc::new(TokenCache::with_lifetime(login.clone(), lifetime))
}

/// Poll until `condition` holds, giving up after `timeout`.
pub async fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    condition()
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}
