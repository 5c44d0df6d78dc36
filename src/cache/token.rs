use chrono::{DateTime, Utc};
use tokio::time::{Duration, Instant};

use crate::helpers::time::{get_instant, now_utc};

pub const TOKEN_VALUE_STUB: &'static str = "";

/// Cached bearer credential.
///
/// `value` is non-empty exactly when `issued_at` is set; both are only
/// ever replaced together through [`TokenState::issue`] or [`TokenState::reset`].
#[derive(Debug, Clone, Default)]
pub struct TokenState {
    value: String,
    issued_at: Option<Instant>,
    issued_at_utc: Option<DateTime<Utc>>,
}

impl TokenState {
    /// Store a freshly issued token stamped with the current time.
    pub fn issue(&mut self, value: String) {
        self.value = value;
        self.issued_at = Some(get_instant());
        self.issued_at_utc = Some(now_utc());
    }

    /// Back to the "never logged in" state.
    pub fn reset(&mut self) {
        self.value = TOKEN_VALUE_STUB.to_owned();
        self.issued_at = None;
        self.issued_at_utc = None;
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn issued_at_utc(&self) -> Option<DateTime<Utc>> {
        self.issued_at_utc
    }

    pub fn age(&self) -> Option<Duration> {
        self.issued_at.map(|issued_at| issued_at.elapsed())
    }

    /// Empty and stale tokens both need a login before use.
    pub fn is_fresh(&self, lifetime: Duration) -> bool {
        self.age().is_some_and(|age| age <= lifetime)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn empty_state_is_never_fresh() {
        let state = TokenState::default();
        assert_eq!(state.value(), "");
        assert!(state.age().is_none());
        assert!(!state.is_fresh(Duration::from_secs(u64::MAX / 4)));
    }

    #[tokio::test(start_paused = true)]
    async fn issued_state_ages_out_after_lifetime() {
        let lifetime = Duration::from_secs(60);
        let mut state = TokenState::default();
        state.issue("abc".to_owned());
        assert!(state.is_fresh(lifetime));
        assert!(state.issued_at_utc().is_some());

        tokio::time::advance(lifetime).await;
        assert!(state.is_fresh(lifetime), "age equal to lifetime is still fresh");

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(!state.is_fresh(lifetime));
        assert_eq!(state.value(), "abc");

        state.reset();
        assert_eq!(state.value(), TOKEN_VALUE_STUB);
        assert!(state.age().is_none());
        assert!(state.issued_at_utc().is_none());
    }
}
