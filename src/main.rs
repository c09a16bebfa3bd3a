//! Computer Asset Tracker
//!
//! REST API for computer assets and their employee assignments:
//! - Per-client token bucket rate limiting
//! - Threshold warnings when an employee holds too many computers
//! - Notification delivery with bounded retries, off the request path

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use api::middleware::rate_limit::RateLimitConfig;
use api::{router, AppState, ServerConfig};
use notifier::{NotificationClient, Notifier, NotifierConfig};
use registry::{ComputerRepository, InMemoryRegistry};
use telemetry::{health, init_tracing, LogConfig};
use worker::{
    DispatchConfig, NotificationDispatcher, ThresholdConfig, ThresholdPolicy, WorkerConfig,
    WorkerScheduler,
};

/// Application configuration.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default)]
    server: ServerConfig,

    #[serde(default)]
    rate_limit: RateLimitConfig,

    #[serde(default)]
    notifier: NotifierConfig,

    #[serde(default)]
    threshold: ThresholdConfig,

    #[serde(default)]
    dispatch: DispatchConfig,

    #[serde(default)]
    worker: WorkerConfig,

    #[serde(default)]
    log: LogConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_tracing(&config.log.clone().with_env_overrides());

    info!("Starting Asset Tracker v{}", env!("CARGO_PKG_VERSION"));

    config
        .notifier
        .validate()
        .context("Invalid notifier configuration")?;
    config
        .rate_limit
        .validate()
        .context("Invalid rate limit configuration")?;

    info!(
        notifier_url = %config.notifier.url,
        rate = config.rate_limit.rate,
        burst = config.rate_limit.burst,
        threshold = config.threshold.max_computers_per_employee,
        "Loaded configuration"
    );

    let registry: Arc<dyn ComputerRepository> = Arc::new(InMemoryRegistry::new());
    health().registry.set_healthy();

    let notifier: Arc<dyn Notifier> = Arc::new(
        NotificationClient::new(config.notifier.clone())
            .context("Failed to create notification client")?,
    );

    let shutdown = CancellationToken::new();

    // Threshold checks and lifecycle notifications run on the dispatch pool,
    // never on the request path
    let policy = Arc::new(ThresholdPolicy::new(
        registry.clone(),
        notifier.clone(),
        &config.threshold,
    ));
    let dispatch_config = config.dispatch.clone().fitted_to(&config.notifier);
    let (dispatcher, dispatch_handles) =
        NotificationDispatcher::start(policy, dispatch_config, shutdown.clone());

    // Periodic health probes
    let scheduler = Arc::new(WorkerScheduler::new(
        config.worker.clone(),
        registry.clone(),
        notifier,
    ));
    let worker_handles = scheduler.start(shutdown.clone());

    let state = AppState::with_rate_limit(registry, dispatcher, config.rate_limit.clone());
    let cleanup_handle = state.start_rate_limiter_cleanup(shutdown.clone());

    let app = router(state, &config.server);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Shutting down...");
    shutdown.cancel();

    let background = dispatch_handles
        .into_iter()
        .chain(worker_handles)
        .chain(std::iter::once(cleanup_handle));
    let drain = async {
        for handle in background {
            let _ = handle.await;
        }
    };
    if tokio::time::timeout(config.server.shutdown_timeout(), drain)
        .await
        .is_err()
    {
        warn!("Background tasks did not stop within the shutdown timeout");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("TRACKER")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Flat variables used by existing deployments
    if let Some(port) = env_parse("PORT")? {
        config.server.port = port;
    }
    if let Ok(url) = std::env::var("NOTIFIER_URL") {
        config.notifier.url = url;
    }
    if let Some(secs) = env_parse::<u64>("NOTIFIER_TIMEOUT_SECS")? {
        config.notifier.timeout_ms = secs * 1000;
    }
    if let Some(attempts) = env_parse("NOTIFIER_RETRY_ATTEMPTS")? {
        config.notifier.retry_attempts = attempts;
    }
    if let Some(delay) = env_parse("NOTIFIER_RETRY_DELAY_MS")? {
        config.notifier.retry_delay_ms = delay;
    }
    if let Some(size) = env_parse("NOTIFIER_MAX_PAYLOAD_SIZE")? {
        config.notifier.max_payload_size = size;
    }
    if let Some(rate) = env_parse("RATE_LIMIT_RPS")? {
        config.rate_limit.rate = rate;
    }
    if let Some(burst) = env_parse("RATE_LIMIT_BURST")? {
        config.rate_limit.burst = burst;
    }
    if let Ok(proxies) = std::env::var("TRUSTED_PROXIES") {
        config.rate_limit.trusted_proxies = proxies
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Some(max) = env_parse("MAX_COMPUTERS_PER_EMPLOYEE")? {
        config.threshold.max_computers_per_employee = max;
    }

    Ok(config)
}

/// Parse an optional environment variable.
fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {}: {}", name, raw)),
        Err(_) => Ok(None),
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
