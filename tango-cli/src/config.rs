//! Configuration loading
//!
//! Reads the YAML file, applies command-line overrides and validates the
//! result.

use anyhow::{Context, Result};
use tango_core::{Config, Overrides};
use tracing::info;

/// Config file used when neither --config nor TANGO_CONFIG is given
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Load, override and validate the configuration
pub fn load(path: &str, overrides: Overrides) -> Result<Config> {
    let mut config =
        Config::load(path).with_context(|| format!("Failed to load configuration from {}", path))?;

    config.apply_overrides(overrides);
    config
        .validate()
        .with_context(|| format!("Configuration in {} is invalid", path))?;

    info!(
        "Loaded configuration: org={}, nodes={}",
        config.docker_hub_org,
        config.tango_nodes.len()
    );

    Ok(config)
}
