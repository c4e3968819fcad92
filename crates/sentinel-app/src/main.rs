//! Runtime entry point for the Sentinel CAD dispatch simulation.
//!
//! Owns the tokio event loop around the synchronous simulation core:
//! periodic timers (dispatch replenishment, emergency poll, countdown),
//! one-shot delays (ring connect, result dwell, lock confirmation), and
//! background generative-service calls. The interaction surface talks to
//! the loop over an [`runtime::UiCommand`] channel; this binary runs
//! headless until a renderer attaches to that channel.

mod runtime;

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use sentinel_core::SentinelConfig;
use sentinel_gen::GenerativeClient;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::runtime::{Runtime, UiCommand};

/// Default config file path, next to the binary's working directory.
const CONFIG_PATH: &str = "sentinel-config.yaml";

/// Application entry point.
///
/// Initializes logging, loads configuration, builds the generative
/// client (live when LLM env vars are present, scripted otherwise), and
/// runs the event loop until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the configuration file is malformed.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("sentinel-app starting");

    let config = SentinelConfig::load_or_default(CONFIG_PATH)?;
    info!(
        dispatch_interval_secs = config.timing.dispatch_interval_secs,
        emergency_poll_secs = config.timing.emergency_poll_secs,
        queue_floor = config.queue.floor,
        roster_seed = config.roster.seed_count,
        "configuration loaded"
    );

    let client = Arc::new(GenerativeClient::from_env());

    let (commands, receiver) = mpsc::channel::<UiCommand>(64);
    let rng = SmallRng::from_os_rng();
    let runtime = Runtime::new(config, client, rng, receiver);
    let handle = tokio::spawn(runtime.run());

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    let _ = commands.send(UiCommand::Shutdown).await;
    handle.await?;

    Ok(())
}
