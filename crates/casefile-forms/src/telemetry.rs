//! Logging setup

use crate::config::LogConfig;
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` wins over `config.filter`.
///
/// # Errors
/// Returns error if the filter does not parse or a subscriber is already set.
pub fn init_tracing(config: &LogConfig) -> anyhow::Result<()> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(from_env.as_deref(), &config.filter)?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .context("tracing subscriber already installed")?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("tracing subscriber already installed")?;
    }
    Ok(())
}

/// Filter from the environment directive if set and valid, else `fallback`
fn build_filter(from_env: Option<&str>, fallback: &str) -> anyhow::Result<EnvFilter> {
    if let Some(directive) = from_env.filter(|d| !d.trim().is_empty()) {
        match EnvFilter::try_new(directive) {
            Ok(filter) => return Ok(filter),
            Err(err) => tracing::warn!(directive, error = %err, "ignoring invalid RUST_LOG"),
        }
    }
    EnvFilter::try_new(fallback).with_context(|| format!("invalid log filter '{fallback}'"))
}
