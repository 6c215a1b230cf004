//! Processor configuration.
//!
//! Structural constants are fixed when a [`VocoderProcessor`] is built. The
//! initial parameter values seed the smoothers; after construction those are
//! changed through [`ProcessorControls`] instead.
//!
//! [`VocoderProcessor`]: crate::VocoderProcessor
//! [`ProcessorControls`]: crate::ProcessorControls

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DspResult};

/// Construction-time settings for a vocoder processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessorConfig {
    /// Fixed modulator gain before the highpass (10-20).
    pub preamp_gain: f32,
    /// Q of every analysis and synthesis bandpass (8-25).
    pub band_q: f32,
    /// Fraction of the noise threshold subtracted from an open band's envelope (0.4-0.6).
    pub gate_hysteresis: f32,
    /// Gain applied to the summed bands (0.5-0.7).
    pub output_normalization: f32,
    /// Modulator rumble filter cutoff in Hz (100-200).
    pub highpass_cutoff_hz: f32,
    /// Modulator rumble filter Q.
    pub highpass_q: f32,
    /// Time constant of the six parameter smoothers.
    pub smoothing_ms: f32,
    /// Envelope follower attack.
    pub envelope_attack_ms: f32,
    /// Envelope follower release.
    pub envelope_release_ms: f32,
    /// Echo line length.
    pub echo_ms: f32,
    /// Per-lap decay of the stored echo tail while echo is off.
    pub echo_decay: f32,
    /// Vibrato LFO rate.
    pub vibrato_rate_hz: f32,
    /// Tremolo LFO rate.
    pub tremolo_rate_hz: f32,
    /// Carrier frequency swing at full vibrato.
    pub vibrato_depth_hz: f32,

    /// Initial carrier pitch in Hz.
    pub pitch: f32,
    /// Initial band gain.
    pub intensity: f32,
    /// Initial per-band gate threshold.
    pub noise_threshold: f32,
    /// Initial vibrato amount.
    pub vibrato: f32,
    /// Initial echo amount.
    pub echo: f32,
    /// Initial tremolo amount.
    pub tremolo: f32,
    /// Initial waveform selector (0-3 oscillator, 4 external carrier).
    pub waveform: i32,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            preamp_gain: 10.0,
            band_q: 12.0,
            gate_hysteresis: 0.4,
            output_normalization: 0.55,
            highpass_cutoff_hz: 200.0,
            highpass_q: 0.707,
            smoothing_ms: 30.0,
            envelope_attack_ms: crate::envelope::DEFAULT_ATTACK_MS,
            envelope_release_ms: crate::envelope::DEFAULT_RELEASE_MS,
            echo_ms: 300.0,
            echo_decay: 0.95,
            vibrato_rate_hz: 5.0,
            tremolo_rate_hz: 6.0,
            vibrato_depth_hz: 20.0,
            pitch: 140.0,
            intensity: 0.8,
            noise_threshold: 0.005,
            vibrato: 0.0,
            echo: 0.0,
            tremolo: 0.0,
            waveform: 0,
        }
    }
}

impl ProcessorConfig {
    /// Checks the structural constants.
    ///
    /// Initial parameter values are not checked; they are clamped like any
    /// other setter call.
    pub fn validate(&self) -> DspResult<()> {
        ConfigError::check_range("preamp_gain", self.preamp_gain, 10.0, 20.0)?;
        ConfigError::check_range("band_q", self.band_q, 8.0, 25.0)?;
        ConfigError::check_range("gate_hysteresis", self.gate_hysteresis, 0.4, 0.6)?;
        ConfigError::check_range("output_normalization", self.output_normalization, 0.5, 0.7)?;
        ConfigError::check_range("highpass_cutoff_hz", self.highpass_cutoff_hz, 100.0, 200.0)?;
        ConfigError::check_range("highpass_q", self.highpass_q, 0.5, 10.0)?;
        ConfigError::check_positive("smoothing_ms", self.smoothing_ms)?;
        ConfigError::check_positive("envelope_attack_ms", self.envelope_attack_ms)?;
        ConfigError::check_positive("envelope_release_ms", self.envelope_release_ms)?;
        ConfigError::check_range("echo_ms", self.echo_ms, 1.0, 2_000.0)?;
        ConfigError::check_range("echo_decay", self.echo_decay, 0.0, 1.0)?;
        ConfigError::check_positive("vibrato_rate_hz", self.vibrato_rate_hz)?;
        ConfigError::check_positive("tremolo_rate_hz", self.tremolo_rate_hz)?;
        ConfigError::check_range("vibrato_depth_hz", self.vibrato_depth_hz, 0.0, 100.0)?;
        Ok(())
    }
}
