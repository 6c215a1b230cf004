//! Config command implementation
//!
//! Prints the effective engine configuration as JSON.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;

/// Run the config command
///
/// Prints the defaults, or the validated contents of `config_path` with
/// defaults filled in.
pub fn run(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = super::load_config(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(ExitCode::SUCCESS)
}
