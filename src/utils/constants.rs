//! Shared constants and invariants

use std::time::Duration;

/// Assumed lifetime of a login token. The API does not report token
/// expiry; its documentation states ten minutes, nine leaves headroom for
/// clock drift and request latency.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(9 * 60);

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;

pub const LOGIN_PATH: &str = "login";

/// Context attached to every login error.
pub const LOGIN_FAILED_MSG: &str = "failed to login";
