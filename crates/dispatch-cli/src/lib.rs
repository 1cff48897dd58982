//! Dispatch CLI - command line tools for drone trip dispatch.
//!
//! The `dispatch` binary provides:
//! - plan: pack a backlog into trips and optionally fly them
//! - compare: run every packing strategy and report metrics
//! - generate: write a seeded synthetic distance table and backlog

pub mod config;
pub mod report;
pub mod sources;

pub use config::{load_drone_config, Config};
pub use report::{write_comparison_csv, PlanReport};

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured directive when set.
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_directive))?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    Ok(())
}
