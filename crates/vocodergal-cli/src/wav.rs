//! WAV file I/O.
//!
//! The engine works on mono `f32` buffers at its own sample rate. Loading keeps
//! the first channel of a multi-channel file and leaves resampling to the
//! caller; saving always writes 32-bit float mono.

use std::path::Path;

use anyhow::{bail, Context, Result};

/// A mono clip decoded from a WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// Samples in `[-1, 1]` for integer sources; float sources are passed through.
    pub samples: Vec<f32>,
    /// Sample rate of the file in Hz.
    pub sample_rate: u32,
}

/// Reads the first channel of a WAV file as `f32`.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded, or if it uses
/// an integer bit depth above 32.
pub fn read_mono(path: &Path) -> Result<Clip> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .step_by(channels)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to decode float samples: {}", path.display()))?,
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                bail!(
                    "Unsupported bit depth {} in {}",
                    spec.bits_per_sample,
                    path.display()
                );
            }
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .step_by(channels)
                .map(|s| s.map(|s| s as f32 * scale))
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("Failed to decode PCM samples: {}", path.display()))?
        }
    };

    Ok(Clip {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Reads a mono clip and checks it matches `sample_rate`.
pub fn read_mono_at(path: &Path, sample_rate: u32) -> Result<Vec<f32>> {
    let clip = read_mono(path)?;
    if clip.sample_rate != sample_rate {
        bail!(
            "{} is {} Hz but the engine runs at {} Hz; resample it first",
            path.display(),
            clip.sample_rate,
            sample_rate
        );
    }
    Ok(clip.samples)
}

/// Writes `samples` as a 32-bit float mono WAV file.
pub fn write_mono(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer
        .finalize()
        .with_context(|| format!("Failed to finalize WAV file: {}", path.display()))?;
    Ok(())
}
