//! Bands command implementation
//!
//! Lists the analysis/synthesis band table.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use vocodergal_dsp::vocoder::band_centers;

/// One row of the band table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandRow {
    /// Center frequency in Hz after clamping to the sample rate.
    pub center_hz: f32,
    /// -3 dB bandwidth in Hz.
    pub bandwidth_hz: f32,
}

/// Builds the band table for a sample rate and Q.
pub fn band_table(sample_rate: u32, q: f32) -> Vec<BandRow> {
    band_centers(sample_rate as f32)
        .iter()
        .map(|&center_hz| BandRow {
            center_hz,
            bandwidth_hz: center_hz / q,
        })
        .collect()
}

/// Run the bands command
pub fn run(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = super::load_config(config_path)?;
    let q = config.processor.band_q;

    println!(
        "{} {} Hz, Q {}",
        "Bands at".cyan().bold(),
        config.sample_rate,
        q
    );
    for (i, row) in band_table(config.sample_rate, q).iter().enumerate() {
        println!(
            "  {:>2}  {:>8.1} Hz  {}",
            i,
            row.center_hz,
            format!("bw {:.1} Hz", row.bandwidth_hz).dimmed()
        );
    }
    Ok(ExitCode::SUCCESS)
}
