use std::future::Future;
use std::sync::Arc;

use anyhow::Result;

pub mod context;
pub mod http;

use context::LoginContext;

/// Login capability: one round-trip to the login endpoint yielding a
/// bearer token. Network errors, bad statuses and malformed bodies all
/// surface as `Err`.
pub trait Login: Send + Sync {
    fn login(&self, ctx: &LoginContext) -> impl Future<Output = Result<String>> + Send;
}

impl<L: Login> Login for Arc<L> {
    fn login(&self, ctx: &LoginContext) -> impl Future<Output = Result<String>> + Send {
        (**self).login(ctx)
    }
}
