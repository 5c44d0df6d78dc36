use clap::Parser;
use login_token_cache::observability::metrics::render_metrics;
use login_token_cache::utils::config_loader;
use login_token_cache::utils::logging;
use login_token_cache::utils::logging::LogLevel;
use login_token_cache::{ApiClient, LoginContext};
use anyhow::Result;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "token-login.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
    /// print an `Authorization: Bearer ...` line instead of the bare token
    #[arg(long)]
    header: bool,
    /// give up on the login after this many milliseconds
    #[arg(long, env = "LOGIN_TIMEOUT_MS")]
    login_timeout_ms: Option<u64>,
    /// dump prometheus metrics to stderr before exiting
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level.to_owned()).await?;

    // -------------------------------
    // 2. Log in
    // -------------------------------

    let ctx = match args.login_timeout_ms {
        Some(ms) => LoginContext::background().with_timeout(Duration::from_millis(ms)),
        None => LoginContext::background(),
    };
    let client = ApiClient::connect(&service_config, &ctx).await?;
    client.tokens().ensure_fresh(&ctx).await?;

    if let Some(issued_at) = client.tokens().issued_at_utc().await {
        info!("token issued at {}, assumed valid for {:?}", issued_at.to_rfc3339(), client.tokens().lifetime());
    }

    // -------------------------------
    // 3. Print
    // -------------------------------

    let token = client.tokens().current_token().await;
    if args.header {
        println!("Authorization: Bearer {}", token);
    } else {
        println!("{}", token);
    }

    if args.metrics {
        eprint!("{}", render_metrics().await?);
    }

    Ok(())
}
