//! Live command implementation
//!
//! Runs the engine on the default audio devices.

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use colored::Colorize;
use vocodergal_engine::{CpalBackend, Engine, Source, VU_MAX};

use super::render::RenderParams;
use crate::wav;

/// Inputs of a live session.
#[derive(Debug, Clone)]
pub struct LiveSession {
    pub config: Option<PathBuf>,
    pub seconds: f32,
    /// Loop this file as the modulator instead of the microphone.
    pub modulator: Option<PathBuf>,
    /// Record the microphone for the whole session and save the take here.
    pub record: Option<PathBuf>,
    pub params: RenderParams,
}

const METER_WIDTH: usize = 40;

fn meter(level: f32) -> String {
    let filled = ((level / VU_MAX).clamp(0.0, 1.0) * METER_WIDTH as f32) as usize;
    format!("{}{}", "#".repeat(filled), " ".repeat(METER_WIDTH - filled))
}

fn session_length(seconds: f32) -> Result<Duration> {
    if seconds.is_nan() || seconds <= 0.0 {
        bail!("--seconds must be positive, got {}", seconds);
    }
    Duration::try_from_secs_f32(seconds)
        .with_context(|| format!("--seconds {} is not a usable duration", seconds))
}

/// Run the live command
pub fn run(session: &LiveSession) -> Result<ExitCode> {
    let length = session_length(session.seconds)?;
    let config = super::load_config(session.config.as_deref())?;
    let sample_rate = config.sample_rate;
    let engine = Engine::new(config, CpalBackend::new())?;

    if let Some(path) = &session.modulator {
        engine.set_modulator_buffer(wav::read_mono_at(path, sample_rate)?);
        engine.set_source(Source::File);
    }
    session.params.apply(&engine);
    engine.start()?;
    if session.record.is_some() {
        engine.start_recording();
    }

    println!(
        "{} {:.1}s at {} Hz ({:?})",
        "Live:".cyan().bold(),
        session.seconds,
        sample_rate,
        engine.source()
    );
    let deadline = Instant::now() + length;
    while Instant::now() < deadline {
        eprint!("\r[{}]", meter(engine.vu_level()));
        thread::sleep(Duration::from_millis(50));
    }
    eprintln!();

    engine.stop();
    if let Some(path) = &session.record {
        let captured = engine.recorded_len();
        engine.stop_recording();
        if captured == 0 {
            println!("{}", "No microphone audio was captured".yellow());
            return Ok(ExitCode::from(1));
        }
        let take = engine.modulator_data();
        wav::write_mono(path, &take, sample_rate)?;
        println!(
            "{} {} ({} samples)",
            "Saved take".green().bold(),
            path.display(),
            take.len()
        );
    }
    Ok(ExitCode::SUCCESS)
}
