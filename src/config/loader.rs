// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_AGGREGATION_INTERVAL_SECONDS, DEFAULT_CACHE_CAPACITY,
    DEFAULT_DEAD_DEVICE_THRESHOLD_SECONDS, DEFAULT_LOG_FILTER,
};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for an enrichment pipeline instance.
///
/// Every section is optional and falls back to built-in defaults, so an empty
/// file is a valid configuration.
///
/// # Example
/// ```yaml
/// device_cache:
///   capacity: 5000
/// geography:
///   published_only: true
/// aggregation:
///   interval_seconds: 30
///   dead_device_threshold_seconds: 86400
/// logging:
///   filter: "mobility_enrich=debug,info"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub device_cache: DeviceCacheConfig,
    #[serde(default)]
    pub geography: GeographyConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Memo cache sizing for the device labeler.
#[derive(Debug, Deserialize)]
pub struct DeviceCacheConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for DeviceCacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Which geographies the geography labeler indexes.
#[derive(Debug, Deserialize)]
pub struct GeographyConfig {
    #[serde(default = "default_published_only")]
    pub published_only: bool,
}

impl Default for GeographyConfig {
    fn default() -> Self {
        Self {
            published_only: true,
        }
    }
}

/// Provider aggregation cycle settings.
///
/// # Fields
/// * `interval_seconds` - Time between aggregation cycles
/// * `dead_device_threshold_seconds` - A vehicle silent for longer than this is counted dead
#[derive(Debug, Deserialize)]
pub struct AggregationConfig {
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    #[serde(default = "default_dead_device_threshold_seconds")]
    pub dead_device_threshold_seconds: u64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_AGGREGATION_INTERVAL_SECONDS,
            dead_device_threshold_seconds: DEFAULT_DEAD_DEVICE_THRESHOLD_SECONDS,
        }
    }
}

impl AggregationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn dead_device_threshold(&self) -> Duration {
        Duration::from_secs(self.dead_device_threshold_seconds)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_published_only() -> bool {
    true
}

fn default_interval_seconds() -> u64 {
    DEFAULT_AGGREGATION_INTERVAL_SECONDS
}

fn default_dead_device_threshold_seconds() -> u64 {
    DEFAULT_DEAD_DEVICE_THRESHOLD_SECONDS
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl PipelineConfig {
    /// Check every setting and report all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.device_cache.capacity == 0 {
            problems.push("device_cache.capacity must be greater than 0".to_string());
        }
        if self.aggregation.interval_seconds == 0 {
            problems.push("aggregation.interval_seconds must be greater than 0".to_string());
        }
        if self.aggregation.dead_device_threshold_seconds == 0 {
            problems.push(
                "aggregation.dead_device_threshold_seconds must be greater than 0".to_string(),
            );
        }
        if self.logging.filter.trim().is_empty() {
            problems.push("logging.filter must not be empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(PipelineConfig::default());
    }
    let cfg: PipelineConfig = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load a config from a YAML file and reject out-of-range settings.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let cfg = load_config(path)?;
    cfg.validate()?;
    Ok(cfg)
}
