//! The 20-band vocoder processor.

use std::sync::Arc;

use crate::atomic::AtomicF32;
use crate::config::ProcessorConfig;
use crate::delay::EchoLine;
use crate::envelope::EnvelopeFollower;
use crate::error::{ConfigError, DspResult};
use crate::filter::BiquadFilter;
use crate::oscillator::{Oscillator, Waveform};
use crate::processing::soft_clip;
use crate::smoother::ParameterSmoother;

use super::bands::{band_centers, NUM_BANDS};
use super::controls::ProcessorControls;

/// Amounts at or below this are treated as off for tremolo and echo.
const EFFECT_EPSILON: f32 = 0.001;

/// One analysis/synthesis pair.
#[derive(Debug, Clone)]
struct Band {
    frequency: f32,
    modulator: BiquadFilter,
    carrier: BiquadFilter,
    envelope: EnvelopeFollower,
}

impl Band {
    fn new(frequency: f32, config: &ProcessorConfig, sample_rate: f32) -> Self {
        Self {
            frequency,
            modulator: BiquadFilter::bandpass(frequency, config.band_q, sample_rate),
            carrier: BiquadFilter::bandpass(frequency, config.band_q, sample_rate),
            envelope: EnvelopeFollower::with_times(
                sample_rate,
                config.envelope_attack_ms,
                config.envelope_release_ms,
            ),
        }
    }
}

/// Transforms a modulator and an optional external carrier into vocoded output.
///
/// All state lives inside the processor and persists across calls. Nothing in
/// [`process`](Self::process) allocates, locks, or fails.
#[derive(Debug)]
pub struct VocoderProcessor {
    sample_rate: f32,
    config: ProcessorConfig,
    controls: ProcessorControls,

    pitch: ParameterSmoother,
    vibrato: ParameterSmoother,
    intensity: ParameterSmoother,
    echo_amount: ParameterSmoother,
    tremolo: ParameterSmoother,
    noise_threshold: ParameterSmoother,

    carrier: Oscillator,
    vibrato_lfo: Oscillator,
    tremolo_lfo: Oscillator,
    highpass: BiquadFilter,
    bands: [Band; NUM_BANDS],
    echo: EchoLine,
}

fn smoother(target: &Arc<AtomicF32>, time_ms: f32, sample_rate: f32) -> ParameterSmoother {
    let mut smoother = ParameterSmoother::with_target(Arc::clone(target));
    smoother.set_time_constant(time_ms, sample_rate);
    smoother
}

impl VocoderProcessor {
    /// Builds a processor, allocating its wavetables and echo line.
    ///
    /// # Errors
    /// Returns an error if a structural constant in `config` is out of range.
    pub fn new(config: ProcessorConfig, sample_rate: f32) -> DspResult<Self> {
        ConfigError::check_positive("sample_rate", sample_rate)?;
        config.validate()?;

        let controls = ProcessorControls::new(&config);
        let tc = config.smoothing_ms;

        let mut carrier = Oscillator::new(sample_rate);
        carrier.set_waveform(controls.waveform());
        carrier.set_frequency(controls.pitch());

        let bands = band_centers(sample_rate).map(|freq| Band::new(freq, &config, sample_rate));

        Ok(Self {
            sample_rate,
            pitch: smoother(&controls.pitch, tc, sample_rate),
            vibrato: smoother(&controls.vibrato, tc, sample_rate),
            intensity: smoother(&controls.intensity, tc, sample_rate),
            echo_amount: smoother(&controls.echo, tc, sample_rate),
            tremolo: smoother(&controls.tremolo, tc, sample_rate),
            noise_threshold: smoother(&controls.noise_threshold, tc, sample_rate),
            carrier,
            vibrato_lfo: Oscillator::with(sample_rate, Waveform::Sine, config.vibrato_rate_hz),
            tremolo_lfo: Oscillator::with(sample_rate, Waveform::Sine, config.tremolo_rate_hz),
            highpass: BiquadFilter::highpass(
                config.highpass_cutoff_hz,
                config.highpass_q,
                sample_rate,
            ),
            bands,
            echo: EchoLine::with_duration(config.echo_ms, sample_rate, config.echo_decay),
            controls,
            config,
        })
    }

    /// Handle for changing parameters from other threads.
    pub fn controls(&self) -> &ProcessorControls {
        &self.controls
    }

    /// The configuration the processor was built with.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Center frequencies in use, low to high.
    pub fn band_frequencies(&self) -> [f32; NUM_BANDS] {
        self.bands.each_ref().map(|band| band.frequency)
    }

    /// Current envelope of every band.
    pub fn band_envelopes(&self) -> [f32; NUM_BANDS] {
        self.bands.each_ref().map(|band| band.envelope.value())
    }

    /// Waveform of the internal carrier oscillator.
    pub fn waveform(&self) -> Waveform {
        self.carrier.waveform()
    }

    /// Phase of the internal carrier oscillator.
    pub fn carrier_phase(&self) -> f32 {
        self.carrier.phase()
    }

    /// Echo line length in samples.
    pub fn echo_len(&self) -> usize {
        self.echo.len()
    }

    /// Processes one block.
    ///
    /// `output.len()` sets the frame count. Missing modulator samples are
    /// read as silence; when `carrier` is `Some`, frames past its end fall
    /// back to the internal oscillator. The waveform selector is sampled
    /// once per block.
    pub fn process(&mut self, input: &[f32], carrier: Option<&[f32]>, output: &mut [f32]) {
        self.carrier.set_waveform(self.controls.waveform());

        for (frame, out) in output.iter_mut().enumerate() {
            let modulator = input.get(frame).copied().unwrap_or(0.0);
            let external = carrier.and_then(|c| c.get(frame).copied());
            *out = self.process_sample(modulator, external);
        }
    }

    /// Processes a single frame. The result lies in `[-1, 1]`.
    #[inline]
    pub fn process_sample(&mut self, modulator: f32, external_carrier: Option<f32>) -> f32 {
        let pitch = self.pitch.process();
        let vibrato = self.vibrato.process();
        let intensity = self.intensity.process();
        let echo_amount = self.echo_amount.process();
        let tremolo = self.tremolo.process();
        let threshold = self.noise_threshold.process();

        let vibrato_offset = self.vibrato_lfo.process() * vibrato * self.config.vibrato_depth_hz;
        self.carrier.set_frequency(pitch + vibrato_offset);
        // Advance every frame so switching carriers keeps the phase continuous.
        let oscillator = self.carrier.process();
        let carrier = external_carrier.unwrap_or(oscillator);

        let modulator = self.highpass.process(modulator * self.config.preamp_gain);

        let gate_offset = threshold * self.config.gate_hysteresis;
        let mut sum = 0.0;
        for band in self.bands.iter_mut() {
            let envelope = band.envelope.process(band.modulator.process(modulator));
            let filtered_carrier = band.carrier.process(carrier);
            if envelope > threshold {
                sum += filtered_carrier * (envelope - gate_offset) * intensity;
            }
        }

        let mut out = sum * self.config.output_normalization;

        if tremolo > EFFECT_EPSILON {
            out *= 1.0 - (0.5 + 0.5 * self.tremolo_lfo.process()) * tremolo;
        }

        let delayed = self.echo.read();
        if echo_amount > EFFECT_EPSILON {
            out += delayed * echo_amount;
            self.echo.write(out);
        } else {
            self.echo.decay();
        }
        self.echo.advance();

        soft_clip(out)
    }
}
