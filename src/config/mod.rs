//! Configuration management for the gleaner harvesters
//!
//! This module handles loading and validating configuration from environment
//! variables, files, and command-line arguments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetcher configuration
    pub fetcher: FetcherConfig,

    /// Harvest loop configuration
    pub harvest: HarvestConfig,

    /// Output and checkpoint configuration
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Fetcher-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Rate limit (requests per second)
    pub rate_limit: u32,

    /// Maximum number of retry attempts
    pub max_retries: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Harvest loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Consecutive no-growth iterations before a scroll harvest gives up
    pub stale_cap: u32,

    /// Absolute iteration ceiling for a scroll harvest
    pub max_iterations: u32,

    /// Materialized items between partial checkpoints
    pub checkpoint_interval: usize,

    /// Absolute page ceiling for a page walk
    pub max_pages: u32,

    /// Profiles between backup exports during enrichment
    pub backup_interval: usize,
}

/// Output and checkpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for result exports
    pub output_dir: PathBuf,

    /// Directory for checkpoint and state files
    pub checkpoint_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl LoggingConfig {
    /// Level to run at, with the verbose flag forcing debug
    pub fn effective_level(&self, verbose: bool) -> &str {
        if verbose {
            "debug"
        } else {
            &self.level
        }
    }

    /// Format to use, preferring an explicit command-line value
    pub fn effective_format<'a>(&'a self, cli: Option<&'a str>) -> &'a str {
        cli.unwrap_or(&self.format)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let rate_limit = std::env::var("GLEANER_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(2);

        let max_retries = std::env::var("GLEANER_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let request_timeout_secs = std::env::var("GLEANER_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let stale_cap = std::env::var("GLEANER_STALE_CAP")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(8);

        let max_iterations = std::env::var("GLEANER_MAX_ITERATIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(50);

        let checkpoint_interval = std::env::var("GLEANER_CHECKPOINT_INTERVAL")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1000);

        let max_pages = std::env::var("GLEANER_MAX_PAGES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(200);

        let backup_interval = std::env::var("GLEANER_BACKUP_INTERVAL")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(25);

        let output_dir = std::env::var("GLEANER_OUTPUT_DIR")
            .unwrap_or_else(|_| String::from("output"))
            .into();

        let checkpoint_dir = std::env::var("GLEANER_CHECKPOINT_DIR")
            .unwrap_or_else(|_| String::from("checkpoints"))
            .into();

        let log_level = std::env::var("GLEANER_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("GLEANER_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            fetcher: FetcherConfig {
                rate_limit,
                max_retries,
                request_timeout_secs,
            },
            harvest: HarvestConfig {
                stale_cap,
                max_iterations,
                checkpoint_interval,
                max_pages,
                backup_interval,
            },
            storage: StorageConfig {
                output_dir,
                checkpoint_dir,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.rate_limit == 0 {
            anyhow::bail!("rate_limit must be greater than 0");
        }

        if self.harvest.max_iterations == 0 {
            anyhow::bail!("max_iterations must be greater than 0");
        }

        if self.harvest.max_pages == 0 {
            anyhow::bail!("max_pages must be greater than 0");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.fetcher.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetcher: FetcherConfig {
                rate_limit: 2,
                max_retries: 3,
                request_timeout_secs: 30,
            },
            harvest: HarvestConfig {
                stale_cap: 8,
                max_iterations: 50,
                checkpoint_interval: 1000,
                max_pages: 200,
                backup_interval: 25,
            },
            storage: StorageConfig {
                output_dir: PathBuf::from("output"),
                checkpoint_dir: PathBuf::from("checkpoints"),
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}
