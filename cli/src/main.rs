//! Cadence CLI - heartbeat driven by a declarative interval runner.
//!
//! # Architecture
//!
//! ```text
//! main() -> CadenceConfig::load() -> init_tracing() -> resolve_delay()
//!                                                          |
//!                                                          v
//!                         LocalSet::run_until(heartbeat::run(delay, max_ticks))
//!                                                          |
//!                                                          v
//!                                          max_ticks reached | Ctrl-C
//! ```
//!
//! Everything runs on a current-thread runtime so the runner's ticks share
//! one thread with the loop that re-configures it.

mod heartbeat;

use std::io::stdout;

use anyhow::{Context, Result};
use tokio::task::LocalSet;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cadence_config::{CadenceConfig, resolve_delay};

const DEFAULT_FILTER: &str = "info";

fn init_tracing(config: Option<&CadenceConfig>) {
    let env = std::env::var_os(EnvFilter::DEFAULT_ENV)
        .map(|value| value.to_string_lossy().into_owned());
    let configured = config.and_then(CadenceConfig::log_filter);
    let (env_filter, warnings) = select_filter(env.as_deref(), configured);

    // Logs go to stderr so heartbeat lines on stdout stay clean.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    for warning in warnings {
        tracing::warn!("{warning}");
    }
}

/// Pick the log filter: `RUST_LOG`, then `[log] filter`, then [`DEFAULT_FILTER`].
///
/// Invalid sources are skipped and reported in the returned warnings, which
/// can only be logged once the subscriber is installed.
fn select_filter(env: Option<&str>, configured: Option<&str>) -> (EnvFilter, Vec<String>) {
    let mut warnings = Vec::new();

    if let Some(value) = env.filter(|value| !value.trim().is_empty()) {
        match EnvFilter::try_new(value) {
            Ok(filter) => return (filter, warnings),
            Err(e) => warnings.push(format!(
                "Ignoring invalid {} filter {value:?}: {e}",
                EnvFilter::DEFAULT_ENV
            )),
        }
    }

    if let Some(value) = configured {
        match EnvFilter::try_new(value) {
            Ok(filter) => return (filter, warnings),
            Err(e) => warnings.push(format!(
                "Ignoring invalid [log] filter {value:?} in config: {e}"
            )),
        }
    }

    (EnvFilter::new(DEFAULT_FILTER), warnings)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler the tick limit is the only way out.
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Loaded before tracing so [log] can set the filter; errors are reported below.
    let loaded = CadenceConfig::load();
    init_tracing(loaded.as_ref().ok().and_then(Option::as_ref));

    let config = loaded.context("Failed to load configuration")?;
    if let Some(path) = CadenceConfig::path() {
        tracing::debug!(path = %path.display(), found = config.is_some(), "Configuration");
    }

    let delay = resolve_delay(config.as_ref()).context("Failed to resolve interval delay")?;
    if delay.is_disabled() {
        tracing::info!("Interval disabled; nothing scheduled");
        return Ok(());
    }
    let max_ticks = config.as_ref().and_then(CadenceConfig::max_ticks);

    let mut out = stdout().lock();
    let summary = LocalSet::new()
        .run_until(heartbeat::run(delay, max_ticks, &mut out, shutdown_signal()))
        .await
        .context("Failed to write heartbeat")?;

    if summary.interrupted {
        tracing::info!(
            beats = summary.beats,
            ticks = summary.stats.ticks,
            "Interrupted"
        );
    }
    Ok(())
}
