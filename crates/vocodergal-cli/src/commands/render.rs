//! Render command implementation
//!
//! Runs a modulator WAV file through the engine on the offline device and
//! writes the vocoded result.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tracing::{debug, info};
use vocodergal_dsp::processing::{peak, rms};
use vocodergal_engine::{Engine, EngineConfig, OfflineDevice, Source, EXTERNAL_CARRIER};

use crate::wav;

/// Live parameter overrides. `None` keeps the configured value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderParams {
    pub pitch: Option<f32>,
    pub intensity: Option<f32>,
    pub waveform: Option<i32>,
    pub vibrato: Option<f32>,
    pub echo: Option<f32>,
    pub tremolo: Option<f32>,
    pub noise_threshold: Option<f32>,
}

impl RenderParams {
    pub(crate) fn apply(&self, engine: &Engine) {
        if let Some(v) = self.pitch {
            engine.set_pitch(v);
        }
        if let Some(v) = self.intensity {
            engine.set_intensity(v);
        }
        if let Some(v) = self.waveform {
            engine.set_waveform(v);
        }
        if let Some(v) = self.vibrato {
            engine.set_vibrato(v);
        }
        if let Some(v) = self.echo {
            engine.set_echo(v);
        }
        if let Some(v) = self.tremolo {
            engine.set_tremolo(v);
        }
        if let Some(v) = self.noise_threshold {
            engine.set_noise_threshold(v);
        }
    }
}

/// Inputs of one offline render.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub modulator: PathBuf,
    pub carrier: Option<PathBuf>,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub params: RenderParams,
    /// Frames per render cycle. Defaults to the configured callback size.
    pub frames: Option<usize>,
    /// Seconds rendered after the modulator ends, with the file paused.
    pub tail_seconds: f32,
}

/// Levels of a finished render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSummary {
    pub samples: usize,
    pub peak: f32,
    pub rms: f32,
    pub vu: f32,
}

/// Renders `modulator` through a fresh engine and returns the output.
///
/// The modulator plays once from the start as the file source; afterwards the
/// file is paused and `tail_frames` more frames are rendered so the envelopes
/// and echo can ring out.
pub fn render_samples(
    config: EngineConfig,
    modulator: Vec<f32>,
    carrier: Option<Vec<f32>>,
    params: &RenderParams,
    frames: usize,
    tail_frames: usize,
) -> Result<(Vec<f32>, f32)> {
    if frames == 0 {
        bail!("frames per cycle must be positive");
    }

    let device = OfflineDevice::new();
    let engine = Engine::new(config, device.backend())?;

    let body_frames = modulator.len();
    engine.set_modulator_buffer(modulator);
    if let Some(carrier) = carrier {
        engine.set_carrier_buffer(carrier);
        engine.set_waveform(EXTERNAL_CARRIER);
    }
    engine.set_source(Source::File);
    engine.set_file_playing(true);
    params.apply(&engine);
    engine.start()?;

    let mut rendered = Vec::with_capacity(body_frames + tail_frames);
    let mut block = vec![0.0; frames];
    pump_frames(&device, &mut block, body_frames, &mut rendered)?;
    engine.set_file_playing(false);
    pump_frames(&device, &mut block, tail_frames, &mut rendered)?;

    let vu = engine.vu_level();
    engine.stop();
    debug!(samples = rendered.len(), "render finished");
    Ok((rendered, vu))
}

fn pump_frames(
    device: &OfflineDevice,
    block: &mut [f32],
    total: usize,
    rendered: &mut Vec<f32>,
) -> Result<()> {
    let mut remaining = total;
    while remaining > 0 {
        let n = remaining.min(block.len());
        if !device.pump_into(&mut block[..n]) {
            bail!("render endpoint stopped unexpectedly");
        }
        rendered.extend_from_slice(&block[..n]);
        remaining -= n;
    }
    Ok(())
}

/// Runs a render job and writes the output file.
pub fn render(job: &RenderJob) -> Result<RenderSummary> {
    let mut config = super::load_config(job.config.as_deref())?;
    if let Some(frames) = job.frames {
        config.frames_per_callback = u32::try_from(frames).context("--frames is too large")?;
    }
    let sample_rate = config.sample_rate;
    let frames = config.frames_per_callback as usize;

    let modulator = wav::read_mono_at(&job.modulator, sample_rate)?;
    if modulator.is_empty() {
        bail!("{} contains no samples", job.modulator.display());
    }
    let carrier = job
        .carrier
        .as_deref()
        .map(|path| wav::read_mono_at(path, sample_rate))
        .transpose()?;

    if job.tail_seconds.is_nan() || job.tail_seconds < 0.0 {
        bail!("--tail must be non-negative, got {}", job.tail_seconds);
    }
    let tail_frames = (job.tail_seconds * sample_rate as f32).round() as usize;

    info!(
        modulator = %job.modulator.display(),
        samples = modulator.len(),
        external_carrier = carrier.is_some(),
        "rendering"
    );
    let (output, vu) = render_samples(config, modulator, carrier, &job.params, frames, tail_frames)?;
    wav::write_mono(&job.output, &output, sample_rate)?;

    Ok(RenderSummary {
        samples: output.len(),
        peak: peak(&output),
        rms: rms(&output),
        vu,
    })
}

/// Run the render command
pub fn run(job: &RenderJob) -> Result<ExitCode> {
    let start = Instant::now();
    println!("{} {}", "Rendering:".cyan().bold(), job.modulator.display());
    if let Some(carrier) = &job.carrier {
        println!("{} {}", "Carrier:".dimmed(), carrier.display());
    }

    let summary = render(job)?;

    println!(
        "{} {} ({} samples, {:.2}s)",
        "Wrote".green().bold(),
        job.output.display(),
        summary.samples,
        start.elapsed().as_secs_f64()
    );
    println!(
        "  peak {:.3}  rms {:.3}  vu {:.3}",
        summary.peak, summary.rms, summary.vu
    );
    Ok(ExitCode::SUCCESS)
}

/// Output path used when none is given: `voice.wav` becomes `voice.vocoded.wav`.
pub fn default_output_for(modulator: &Path) -> PathBuf {
    modulator.with_extension("vocoded.wav")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::f32::consts::TAU;

    fn tone(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| 0.5 * (TAU * freq * i as f32 / 48_000.0).sin())
            .collect()
    }

    #[test]
    fn test_render_length_includes_tail() {
        let (out, _) = render_samples(
            EngineConfig::default(),
            tone(440.0, 1_000),
            None,
            &RenderParams::default(),
            256,
            480,
        )
        .unwrap();
        assert_eq!(out.len(), 1_480);
        assert!(peak(&out) > 0.0);
        assert!(out.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_block_size_does_not_change_output() {
        let modulator = tone(300.0, 2_000);
        let params = RenderParams::default();
        let (a, _) =
            render_samples(EngineConfig::default(), modulator.clone(), None, &params, 256, 0)
                .unwrap();
        let (b, _) =
            render_samples(EngineConfig::default(), modulator, None, &params, 100, 0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_frames_is_rejected() {
        let result = render_samples(
            EngineConfig::default(),
            vec![0.0; 8],
            None,
            &RenderParams::default(),
            0,
            0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_default_output_name() {
        assert_eq!(
            default_output_for(Path::new("takes/voice.wav")),
            PathBuf::from("takes/voice.vocoded.wav")
        );
    }
}
