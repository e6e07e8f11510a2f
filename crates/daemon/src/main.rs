//! Resque Director - Main Entry Point
//! Keeps one queue's worker fleet between its configured bounds

mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use director_core::application::{shutdown_channel, Scaler, ScalingLoop};
use director_core::domain::queue::normalize_queue_name;
use director_core::port::time_provider::SystemTimeProvider;
use director_core::port::TracingLogSink;
use director_core::ConfigStore;
use director_infra_redis::ResqueRegistry;
use director_infra_system::ShellLauncher;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str = "director=info";
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "resque-director")]
#[command(about = "Scales Resque workers on a queue to stay within min/max bounds", long_about = None)]
#[command(version)]
struct Args {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long, env = "DIRECTOR_CONFIG")]
    config: Option<String>,

    /// Queue to scale (overrides the settings file)
    #[arg(short, long, env = "DIRECTOR_QUEUE")]
    queue: Option<String>,

    /// Redis URL of the Resque deployment (overrides the settings file)
    #[arg(long, env = "DIRECTOR_REDIS_URL")]
    redis_url: Option<String>,

    /// Log output: pretty or json
    #[arg(long, env = "DIRECTOR_LOG_FORMAT")]
    log_format: Option<String>,

    /// Run a single scaling cycle and exit
    #[arg(long)]
    once: bool,
}

fn init_logging(log_format: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Failed to create env filter")?;

    match log_format {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load settings (file + DIRECTOR__* env)
    let settings = settings::load(args.config.as_deref())?;

    // 2. Initialize logging
    init_logging(args.log_format.as_deref().unwrap_or(&settings.log_format))?;
    info!("Resque Director v{} starting...", VERSION);

    // 3. Build the configuration store
    let mut options = settings.director_options();
    if let Some(queue) = args.queue.as_deref().and_then(normalize_queue_name) {
        options = options.queue(queue);
    }
    if settings.director_log {
        options = options.logger(Arc::new(TracingLogSink));
    }

    let config = Arc::new(ConfigStore::with_options(options));
    let snapshot = config.snapshot();
    let queue = snapshot
        .queue
        .clone()
        .context("No queue configured (use --queue or [director] queue)")?;

    info!(
        queue = %queue,
        min_workers = snapshot.min_workers,
        max_workers = snapshot.max_workers,
        wait_time_secs = snapshot.wait_time,
        "Director configured"
    );

    // 4. Setup dependencies (DI wiring)
    let redis_url = args.redis_url.unwrap_or_else(|| settings.redis_url.clone());
    let registry = Arc::new(
        ResqueRegistry::connect(&redis_url, &settings.namespace)
            .await
            .context("Worker registry unavailable")?,
    );

    let time_provider = Arc::new(SystemTimeProvider);
    let launcher = Arc::new(ShellLauncher::new(time_provider.clone()));
    let scaler = Arc::new(Scaler::new(config, registry, launcher, time_provider));
    let scaling_loop = ScalingLoop::with_interval(scaler, settings.poll_interval());

    // 5. One-shot mode
    if args.once {
        let outcome = scaling_loop.run_once().await?;
        info!(outcome = ?outcome, "Single scaling cycle finished");
        return Ok(());
    }

    // 6. Start the scaling loop
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let loop_handle = tokio::spawn(scaling_loop.run(shutdown_rx));

    info!("System ready. Watching queue {}", queue);
    info!("Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    shutdown_tx.shutdown();
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, loop_handle).await;

    info!("Shutdown complete.");

    Ok(())
}
