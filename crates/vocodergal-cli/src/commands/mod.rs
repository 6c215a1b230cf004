//! CLI command implementations

pub mod bands;
pub mod config;
#[cfg(feature = "cpal")]
pub mod live;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};
use vocodergal_engine::EngineConfig;

/// Loads an engine config from a JSON file, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: EngineConfig = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    Ok(config)
}
