use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::sources::ApiConfig;
use crate::sources::context::LoginContext;
use crate::sources::Login;
use crate::utils::constants::LOGIN_PATH;

/// Body of the login request.
#[derive(Serialize)]
struct LoginRequest<'a> {
    api_key: &'a str,
    api_secret: &'a str,
}

/// Body of a successful login response.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// Logs in against `{api.url}/login` with an API key and secret.
#[derive(Clone)]
pub struct HttpLogin {
    client: Client,
    url: Url,
    api_key: String,
    api_secret: String,
}

impl HttpLogin {
    pub fn new(client: Client, base_url: &Url, api_key: String, api_secret: String) -> Result<Self> {
        let url = join_url(base_url, LOGIN_PATH)?;
        Ok(Self { client, url, api_key, api_secret })
    }

    /// Resolve credentials from config and build the login capability.
    pub async fn from_config(client: Client, api: &ApiConfig) -> Result<Self> {
        let base_url = api.base_url()?;
        let api_key = api.api_key.resolve().await.context("cannot resolve api_key")?;
        let api_secret = api.api_secret.resolve().await.context("cannot resolve api_secret")?;
        Self::new(client, &base_url, api_key, api_secret)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Login for HttpLogin {
    async fn login(&self, _ctx: &LoginContext) -> Result<String> {
        debug!("POST {}", self.url);
        let response = self
            .client
            .post(self.url.clone())
            .json(&LoginRequest {
                api_key: &self.api_key,
                api_secret: &self.api_secret,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("login request failed: {}", response.status()));
        }
        let body = response.text().await?;
        let parsed: LoginResponse =
            serde_json::from_str(&body).context("malformed login response body")?;
        Ok(parsed.access_token)
    }
}

/// Append `path` to the base URL, keeping any path prefix the base carries.
pub fn join_url(base: &Url, path: &str) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|err| anyhow!("cannot join '{}' onto '{}': {}", path, base, err))
}
