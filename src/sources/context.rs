use std::future::{pending, Future};

use anyhow::{bail, Result};
use tokio::sync::watch;
use tokio::time::{sleep_until, Duration, Instant};

use crate::helpers::time::get_instant;

/// Execution context for a single login round-trip.
///
/// Carries an optional deadline and an optional cancellation signal. The
/// cancellation side is a `watch` channel: sending `true` cancels every
/// login running under a clone of this context.
#[derive(Debug, Clone, Default)]
pub struct LoginContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

impl LoginContext {
    /// No deadline, never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(get_instant() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|cancel| *cancel.borrow())
    }

    /// Drive `operation` until it completes, the deadline passes, or the
    /// context is cancelled, whichever comes first.
    pub async fn run<F, T>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let mut cancel = self.cancel.clone();
        let cancelled = async move {
            match cancel.as_mut() {
                // a dropped sender can never cancel
                Some(rx) => {
                    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                        pending::<()>().await
                    }
                }
                None => pending::<()>().await,
            }
        };
        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => bail!("login cancelled"),
            _ = expired => bail!("login deadline exceeded"),
            result = operation => result,
        }
    }
}
