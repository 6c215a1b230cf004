//! Engine configuration.

use serde::{Deserialize, Serialize};
use vocodergal_dsp::{ConfigError, ProcessorConfig, DEFAULT_SAMPLE_RATE};

use crate::error::EngineResult;

/// Platform input-processing preset requested for the capture endpoint.
///
/// Backends that have no such notion ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPreset {
    /// No special processing.
    Generic,
    /// Echo cancellation, noise suppression and gain control, which keeps
    /// speaker output from feeding back into the microphone.
    #[default]
    VoiceCommunication,
    /// Tuned for speech recognition.
    VoiceRecognition,
    /// Raw signal.
    Unprocessed,
}

/// Settings for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Sample rate of both endpoints and every buffer, in Hz.
    pub sample_rate: u32,
    /// Frames per audio callback requested from the platform.
    pub frames_per_callback: u32,
    /// Channel count of both endpoints. Only mono is supported.
    pub channel_count: u16,
    /// Capture input-processing preset.
    pub input_preset: InputPreset,
    /// Capacity of the internal recorder in seconds.
    pub record_seconds: f32,
    /// Vocoder settings.
    pub processor: ProcessorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            frames_per_callback: 256,
            channel_count: 1,
            input_preset: InputPreset::default(),
            record_seconds: 10.0,
            processor: ProcessorConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Validates the engine settings and the embedded processor config.
    pub fn validate(&self) -> EngineResult<()> {
        ConfigError::check_positive("sample_rate", self.sample_rate as f32)?;
        ConfigError::check_positive("frames_per_callback", self.frames_per_callback as f32)?;
        ConfigError::check_range("channel_count", f32::from(self.channel_count), 1.0, 1.0)?;
        ConfigError::check_range("record_seconds", self.record_seconds, 0.001, 600.0)?;
        self.processor.validate()?;
        Ok(())
    }

    /// Recorder capacity in samples.
    pub fn record_capacity(&self) -> usize {
        (self.record_seconds * self.sample_rate as f32).round() as usize
    }

    /// Duration of one callback in milliseconds.
    pub fn callback_period_ms(&self) -> f32 {
        self.frames_per_callback as f32 * 1_000.0 / self.sample_rate as f32
    }
}
