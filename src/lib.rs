//! # Login Token Cache
//!
//! Keeps a bearer token for a login-protected HTTP API fresh without
//! stampeding the login endpoint. The API reports no token expiry, so the
//! cache tracks token age itself and logs in again once the assumed
//! lifetime has passed.
//!
//! Modules:
//! - `cache`: token state and the single-flight refreshing cache
//! - `sources`: login capability, HTTP login and login context
//! - `client`: authenticated API client using the cache
//! - `config`: YAML configuration
//! - `observability`: prometheus metrics

pub mod cache;
pub mod client;
pub mod config;
pub mod helpers;
pub mod observability;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::cache::token_cache::TokenCache;
pub use crate::client::ApiClient;
pub use crate::config::sources::*;
pub use crate::sources::{context::LoginContext, Login};
pub use crate::utils::constants::TOKEN_LIFETIME;
