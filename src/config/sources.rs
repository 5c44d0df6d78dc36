use std::env;

use anyhow::{anyhow, Result};
use reqwest::Url;
use serde::Deserialize;

use crate::config::settings::SettingsConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub api: ApiConfig,
}

/// ================================
/// Remote API
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// base url, login endpoint is `{url}/login`
    pub url: String,
    pub api_key: CredentialValue,
    pub api_secret: CredentialValue,
}

impl ApiConfig {
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.url).map_err(|err| anyhow!("api.url '{}' is not a valid url: {}", self.url, err))
    }
}

/// Credential value sources
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum CredentialValue {
    Literal {
        value: String,
    },
    FromEnv {
        from_env: String,
    },
    FromFile {
        path: String,
    },
}

impl CredentialValue {
    pub async fn resolve(&self) -> Result<String> {
        match self {
            CredentialValue::Literal { value } => Ok(value.to_owned()),
            CredentialValue::FromEnv { from_env } => {
                env::var(from_env).map_err(|err| anyhow!("env '{}': {}", from_env, err))
            }
            CredentialValue::FromFile { path } => tokio::fs::read_to_string(path)
                .await
                .map_err(|err| anyhow!("file '{}': {}", path, err))
                .map(|res| res.trim().to_string()),
        }
    }
}
