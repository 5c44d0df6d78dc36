//! Authenticated API client built on top of [`TokenCache`].

use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cache::token_cache::TokenCache;
use crate::config::sources::ServiceConfig;
use crate::sources::context::LoginContext;
use crate::sources::http::{join_url, HttpLogin};

pub struct ApiClient {
    http: Client,
    base_url: Url,
    tokens: TokenCache<HttpLogin>,
}

impl ApiClient {
    /// Build the client and log in once, so a bad credential fails here
    /// instead of on the first request.
    pub async fn connect(service_config: &ServiceConfig, ctx: &LoginContext) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(service_config.settings.http_timeout_ms))
            .build()?;
        let base_url = service_config.api.base_url()?;
        let login = HttpLogin::from_config(http.clone(), &service_config.api).await?;

        let client = Self {
            http,
            base_url,
            tokens: TokenCache::new(login),
        };
        client.tokens.force_login(ctx).await?;
        Ok(client)
    }

    /// Request builder for `{url}/{path}` carrying a fresh bearer token.
    pub async fn request(&self, ctx: &LoginContext, method: Method, path: &str) -> Result<RequestBuilder> {
        self.tokens.ensure_fresh(ctx).await?;
        let url = join_url(&self.base_url, path)?;
        debug!("{} {}", method, url);
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(self.tokens.current_token().await))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, ctx: &LoginContext, path: &str) -> Result<T> {
        let response = self.request(ctx, Method::GET, path).await?.send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("HTTP request failed: {}", response.status()));
        }
        Ok(response.json::<T>().await?)
    }

    pub fn tokens(&self) -> &TokenCache<HttpLogin> {
        &self.tokens
    }
}
