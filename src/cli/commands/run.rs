//! Run command implementation.

use crate::core::config::{Config, StoreMode};
use crate::harness::orchestrator::Orchestrator;
use crate::store::memory::MemoryStore;
use crate::store::StoreClient;
use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;
use std::sync::Arc;

/// Run the harness against the configured store.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Number of concurrent workers (overrides config).
    #[arg(long)]
    pub workers: Option<u32>,

    /// Keys per worker (overrides config).
    #[arg(long)]
    pub keys_per_worker: Option<u32>,

    /// Bucket name prefix (overrides config).
    #[arg(long)]
    pub bucket_prefix: Option<String>,

    /// Revision drift tolerance (overrides config).
    #[arg(long)]
    pub tolerance: Option<u64>,

    /// Stop each worker after this many cycles instead of running
    /// until interrupted.
    #[arg(long)]
    pub cycles: Option<u64>,
}

impl RunArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(workers) = self.workers {
            config.workload.workers = workers;
        }
        if let Some(keys) = self.keys_per_worker {
            config.workload.keys_per_worker = keys;
        }
        if let Some(prefix) = &self.bucket_prefix {
            config.workload.bucket_prefix = prefix.clone();
        }
        if let Some(tolerance) = self.tolerance {
            config.verify.revision_tolerance = tolerance;
        }
        if let Some(cycles) = self.cycles {
            config.workload.max_cycles = Some(cycles);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Build the store client the configuration selects.
fn build_store(config: &Config) -> Result<Arc<dyn StoreClient>> {
    match config.store.mode {
        StoreMode::Embedded => Ok(Arc::new(MemoryStore::new())),
        StoreMode::External => {
            let endpoint = config.store.endpoint.as_deref().unwrap_or_default();
            anyhow::bail!(
                "no wire client for {endpoint} is built into this binary; \
                external mode needs a StoreClient implementation wired in here"
            )
        }
    }
}

/// Run the harness with the given overrides and optional config file.
pub async fn run_harness(args: RunArgs, config_path: Option<&Path>) -> Result<()> {
    init_tracing();

    let mut config = Config::load(config_path)?;
    config
        .apply_env_overrides()
        .context("invalid environment override")?;
    args.apply(&mut config);
    config.validate().context("invalid configuration")?;

    let store = build_store(&config)?;
    tracing::info!(
        mode = ?config.store.mode,
        tolerance = config.verify.revision_tolerance,
        payload_size = config.workload.payload_size,
        "starting vigil"
    );

    let orchestrator = Orchestrator::new(store, Arc::new(config));
    orchestrator.run().await
}
