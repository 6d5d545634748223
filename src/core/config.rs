//! Configuration parsing and validation.
//!
//! Configuration is loaded from a TOML file, then overridden by `VIGIL_*`
//! environment variables, then by CLI flags. Every knob the harness exposes
//! lives here; nothing in the verification path reads the environment
//! directly.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Store connection settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Workload shape: workers, keys, payloads, pacing.
    #[serde(default)]
    pub workload: WorkloadConfig,

    /// Verification thresholds.
    #[serde(default)]
    pub verify: VerifyConfig,

    /// Periodic reporting.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Store selection and connection settings.
///
/// The embedded mode runs against the in-process reference store. External
/// mode carries the endpoint and credentials a wire client needs; the
/// client itself plugs in behind the [`crate::store::StoreClient`] trait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Which store the harness exercises.
    #[serde(default)]
    pub mode: StoreMode,

    /// Store endpoint URL (external mode).
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Optional username credential.
    #[serde(default)]
    pub username: Option<String>,

    /// Optional password credential.
    #[serde(default)]
    pub password: Option<String>,

    /// Replication factor requested at bucket creation.
    #[serde(default = "default_replication_factor")]
    pub replication_factor: u32,

    /// Durability mode requested at bucket creation.
    #[serde(default)]
    pub durability: DurabilityMode,
}

/// Store selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    /// In-process reference store.
    #[default]
    Embedded,
    /// External store reached through a wire client.
    External,
}

/// Durability mode requested at bucket creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DurabilityMode {
    /// Entries survive a store restart.
    #[default]
    File,
    /// Entries are kept in memory only.
    Memory,
}

/// Workload shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Bucket name prefix; worker `i` owns bucket `{prefix}-{i}`.
    #[serde(default = "default_bucket_prefix")]
    pub bucket_prefix: String,

    /// Number of concurrent workers (one bucket each).
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Keys owned by each worker.
    #[serde(default = "default_keys_per_worker")]
    pub keys_per_worker: u32,

    /// Payload size in bytes for created and updated entries.
    #[serde(default = "default_payload_size")]
    pub payload_size: usize,

    /// How a worker picks the next key to exercise.
    #[serde(default)]
    pub key_selection: KeySelection,

    /// Stop each worker after this many cycles. Unset runs until shutdown.
    #[serde(default)]
    pub max_cycles: Option<u64>,

    /// Lower bound of the randomized inter-iteration delay, milliseconds.
    #[serde(default = "default_delay_min_ms")]
    pub delay_min_ms: u64,

    /// Upper bound of the randomized inter-iteration delay, milliseconds.
    /// A 0..0 range disables the delay.
    #[serde(default = "default_delay_max_ms")]
    pub delay_max_ms: u64,

    /// Retry budget for bucket and key creation.
    #[serde(default = "default_creation_retries")]
    pub creation_retries: u32,
}

/// Key selection policy within a worker's key set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeySelection {
    /// Uniformly random key each iteration.
    #[default]
    Random,
    /// Cycle through the key set in order.
    Sequential,
}

/// Verification thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Maximum benign revision drift before a discrepancy is flagged.
    ///
    /// Absorbs replica lag on eventually-consistent reads. The right value
    /// depends on the target store's replication characteristics; the
    /// default suits a 3-replica quorum store.
    #[serde(default = "default_revision_tolerance")]
    pub revision_tolerance: u64,

    /// Consecutive reads in the stability probe preceding each update.
    /// 0 disables the probe.
    #[serde(default = "default_probe_reads")]
    pub probe_reads: u32,
}

/// Periodic reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Seconds between summary lines.
    #[serde(default = "default_report_interval_seconds")]
    pub interval_seconds: u64,
}

fn default_replication_factor() -> u32 {
    3
}

fn default_bucket_prefix() -> String {
    "vigil".to_string()
}

fn default_workers() -> u32 {
    100
}

fn default_keys_per_worker() -> u32 {
    100
}

fn default_payload_size() -> usize {
    160
}

fn default_delay_min_ms() -> u64 {
    1
}

fn default_delay_max_ms() -> u64 {
    25
}

fn default_creation_retries() -> u32 {
    3
}

fn default_revision_tolerance() -> u64 {
    2
}

fn default_probe_reads() -> u32 {
    5
}

fn default_report_interval_seconds() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            mode: StoreMode::default(),
            endpoint: None,
            username: None,
            password: None,
            replication_factor: default_replication_factor(),
            durability: DurabilityMode::default(),
        }
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            bucket_prefix: default_bucket_prefix(),
            workers: default_workers(),
            keys_per_worker: default_keys_per_worker(),
            payload_size: default_payload_size(),
            key_selection: KeySelection::default(),
            max_cycles: None,
            delay_min_ms: default_delay_min_ms(),
            delay_max_ms: default_delay_max_ms(),
            creation_retries: default_creation_retries(),
        }
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            revision_tolerance: default_revision_tolerance(),
            probe_reads: default_probe_reads(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_report_interval_seconds(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            workload: WorkloadConfig::default(),
            verify: VerifyConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

/// Environment variable names recognized by [`Config::apply_env_overrides`].
pub mod env_keys {
    pub const STORE_ENDPOINT: &str = "VIGIL_STORE_ENDPOINT";
    pub const STORE_USERNAME: &str = "VIGIL_STORE_USERNAME";
    pub const STORE_PASSWORD: &str = "VIGIL_STORE_PASSWORD";
    pub const BUCKET_PREFIX: &str = "VIGIL_BUCKET_PREFIX";
    pub const WORKERS: &str = "VIGIL_WORKERS";
    pub const KEYS_PER_WORKER: &str = "VIGIL_KEYS_PER_WORKER";
    pub const PAYLOAD_SIZE: &str = "VIGIL_PAYLOAD_SIZE";
    pub const REVISION_TOLERANCE: &str = "VIGIL_REVISION_TOLERANCE";
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load from an optional path, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Override fields from `VIGIL_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(endpoint) = std::env::var(env_keys::STORE_ENDPOINT) {
            self.store.endpoint = Some(endpoint);
        }
        if let Ok(username) = std::env::var(env_keys::STORE_USERNAME) {
            self.store.username = Some(username);
        }
        if let Ok(password) = std::env::var(env_keys::STORE_PASSWORD) {
            self.store.password = Some(password);
        }
        if let Ok(prefix) = std::env::var(env_keys::BUCKET_PREFIX) {
            self.workload.bucket_prefix = prefix;
        }
        if let Ok(value) = std::env::var(env_keys::WORKERS) {
            self.workload.workers = parse_env(env_keys::WORKERS, &value)?;
        }
        if let Ok(value) = std::env::var(env_keys::KEYS_PER_WORKER) {
            self.workload.keys_per_worker = parse_env(env_keys::KEYS_PER_WORKER, &value)?;
        }
        if let Ok(value) = std::env::var(env_keys::PAYLOAD_SIZE) {
            self.workload.payload_size = parse_env(env_keys::PAYLOAD_SIZE, &value)?;
        }
        if let Ok(value) = std::env::var(env_keys::REVISION_TOLERANCE) {
            self.verify.revision_tolerance = parse_env(env_keys::REVISION_TOLERANCE, &value)?;
        }
        Ok(())
    }

    /// Validate the configuration before use.
    pub fn validate(&self) -> Result<()> {
        if self.workload.workers == 0 {
            anyhow::bail!("workload.workers must be at least 1");
        }
        if self.workload.keys_per_worker == 0 {
            anyhow::bail!("workload.keys_per_worker must be at least 1");
        }
        if self.workload.payload_size == 0 {
            anyhow::bail!("workload.payload_size must be at least 1 byte");
        }
        if self.workload.bucket_prefix.is_empty() {
            anyhow::bail!("workload.bucket_prefix must not be empty");
        }
        if self.workload.delay_min_ms > self.workload.delay_max_ms {
            anyhow::bail!(
                "workload.delay_min_ms ({}) exceeds delay_max_ms ({})",
                self.workload.delay_min_ms,
                self.workload.delay_max_ms
            );
        }
        if self.workload.creation_retries == 0 {
            anyhow::bail!("workload.creation_retries must be at least 1");
        }
        if self.store.replication_factor == 0 {
            anyhow::bail!("store.replication_factor must be at least 1");
        }
        if self.report.interval_seconds == 0 {
            anyhow::bail!("report.interval_seconds must be at least 1");
        }
        if self.store.mode == StoreMode::External
            && self.store.endpoint.as_deref().unwrap_or("").is_empty()
        {
            anyhow::bail!("store.mode = \"external\" requires store.endpoint");
        }
        Ok(())
    }

    /// Report interval as a duration.
    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report.interval_seconds)
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("invalid value for {key}: {value:?}"))
}
