use chrono::{DateTime, Utc};
use tokio::time::Instant;

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Monotonic clock used for token ages; follows the tokio clock so paused
/// test runtimes can advance it.
pub fn get_instant() -> Instant {
    Instant::now()
}
