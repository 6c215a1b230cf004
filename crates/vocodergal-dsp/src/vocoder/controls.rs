//! Lock-free parameter block shared between control callers and the processor.

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::atomic::AtomicF32;
use crate::config::ProcessorConfig;
use crate::oscillator::Waveform;

/// Carrier pitch range in Hz.
pub const PITCH_RANGE: RangeInclusive<f32> = 50.0..=400.0;
/// Band gain range.
pub const INTENSITY_RANGE: RangeInclusive<f32> = 0.2..=4.0;
/// Vibrato amount range.
pub const VIBRATO_RANGE: RangeInclusive<f32> = 0.0..=1.0;
/// Echo amount range.
pub const ECHO_RANGE: RangeInclusive<f32> = 0.0..=0.7;
/// Tremolo amount range.
pub const TREMOLO_RANGE: RangeInclusive<f32> = 0.0..=1.0;
/// Noise gate threshold range.
pub const NOISE_THRESHOLD_RANGE: RangeInclusive<f32> = 0.005..=0.2;

/// Smoother targets and the carrier waveform, writable from any thread.
///
/// Clones share the same atomics, so a clone handed to a control thread drives
/// the processor that created it. Every setter clamps into its documented
/// range and only moves the target; the processor glides toward it. NaN
/// inputs are ignored.
#[derive(Debug, Clone)]
pub struct ProcessorControls {
    pub(super) pitch: Arc<AtomicF32>,
    pub(super) intensity: Arc<AtomicF32>,
    pub(super) vibrato: Arc<AtomicF32>,
    pub(super) echo: Arc<AtomicF32>,
    pub(super) tremolo: Arc<AtomicF32>,
    pub(super) noise_threshold: Arc<AtomicF32>,
    waveform: Arc<AtomicU8>,
}

fn store_clamped(cell: &AtomicF32, value: f32, range: &RangeInclusive<f32>) {
    if value.is_nan() {
        return;
    }
    cell.store(value.clamp(*range.start(), *range.end()), Ordering::Relaxed);
}

impl ProcessorControls {
    /// Creates a control block seeded from the configuration's initial values.
    pub fn new(config: &ProcessorConfig) -> Self {
        let controls = Self {
            pitch: Arc::default(),
            intensity: Arc::default(),
            vibrato: Arc::default(),
            echo: Arc::default(),
            tremolo: Arc::default(),
            noise_threshold: Arc::default(),
            waveform: Arc::default(),
        };
        controls.set_pitch(config.pitch);
        controls.set_intensity(config.intensity);
        controls.set_vibrato(config.vibrato);
        controls.set_echo(config.echo);
        controls.set_tremolo(config.tremolo);
        controls.set_noise_threshold(config.noise_threshold);
        controls.set_waveform(config.waveform);
        controls
    }

    /// Sets the carrier pitch in Hz, clamped to 50-400.
    pub fn set_pitch(&self, pitch: f32) {
        store_clamped(&self.pitch, pitch, &PITCH_RANGE);
    }

    /// Sets the band gain, clamped to 0.2-4.0.
    pub fn set_intensity(&self, intensity: f32) {
        store_clamped(&self.intensity, intensity, &INTENSITY_RANGE);
    }

    /// Sets the vibrato amount, clamped to 0-1.
    pub fn set_vibrato(&self, amount: f32) {
        store_clamped(&self.vibrato, amount, &VIBRATO_RANGE);
    }

    /// Sets the echo amount, clamped to 0-0.7.
    pub fn set_echo(&self, amount: f32) {
        store_clamped(&self.echo, amount, &ECHO_RANGE);
    }

    /// Sets the tremolo amount, clamped to 0-1.
    pub fn set_tremolo(&self, amount: f32) {
        store_clamped(&self.tremolo, amount, &TREMOLO_RANGE);
    }

    /// Sets the per-band gate threshold, clamped to 0.005-0.2.
    pub fn set_noise_threshold(&self, threshold: f32) {
        store_clamped(&self.noise_threshold, threshold, &NOISE_THRESHOLD_RANGE);
    }

    /// Selects the oscillator waveform. Values outside 0-3 are ignored here;
    /// the engine interprets 4 and above as external-carrier mode.
    pub fn set_waveform(&self, selector: i32) {
        if let Some(waveform) = Waveform::from_index(selector) {
            self.waveform.store(waveform.index() as u8, Ordering::Relaxed);
        }
    }

    /// Pitch target.
    pub fn pitch(&self) -> f32 {
        self.pitch.load(Ordering::Relaxed)
    }

    /// Intensity target.
    pub fn intensity(&self) -> f32 {
        self.intensity.load(Ordering::Relaxed)
    }

    /// Vibrato target.
    pub fn vibrato(&self) -> f32 {
        self.vibrato.load(Ordering::Relaxed)
    }

    /// Echo target.
    pub fn echo(&self) -> f32 {
        self.echo.load(Ordering::Relaxed)
    }

    /// Tremolo target.
    pub fn tremolo(&self) -> f32 {
        self.tremolo.load(Ordering::Relaxed)
    }

    /// Noise threshold target.
    pub fn noise_threshold(&self) -> f32 {
        self.noise_threshold.load(Ordering::Relaxed)
    }

    /// Oscillator waveform.
    pub fn waveform(&self) -> Waveform {
        Waveform::from_index(i32::from(self.waveform.load(Ordering::Relaxed))).unwrap_or_default()
    }
}

impl Default for ProcessorControls {
    fn default() -> Self {
        Self::new(&ProcessorConfig::default())
    }
}
