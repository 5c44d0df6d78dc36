use std::path::Path;

use anyhow::{bail, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::settings::LoggingConfig;
use crate::config::sources::ServiceConfig;
use crate::observability::metrics::get_metrics;

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path).await?;

    let expanded = expand_env_vars(&content)?;
    parse_config(expanded).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let metrics = get_metrics().await;
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
            metrics.config_errors.inc();
        })?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::default());
    }
    debug!("validation config ...");
    validate_service_config(&service_config).inspect_err(|_| metrics.config_errors.inc())?;

    Ok(service_config)
}

pub fn validate_service_config(service_config: &ServiceConfig) -> Result<()> {
    let url = service_config.api.base_url()?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("api.url must use http or https, got '{}'", url.scheme());
    }
    if service_config.settings.http_timeout_ms == 0 {
        bail!("settings.http_timeout_ms must be greater than 0");
    }
    Ok(())
}

/// Replace `${VAR}` and `${VAR:default}` with environment values.
fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    let expanded = re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    });
    Ok(expanded.to_string())
}
