//! VU metering and the output display snapshot.

use std::sync::atomic::Ordering;

use vocodergal_dsp::processing::rms;
use vocodergal_dsp::AtomicF32;

/// Length of the display snapshot.
pub const DISPLAY_LEN: usize = 256;

/// Highest reported VU level.
pub const VU_MAX: f32 = 1.2;

const VU_BOOST: f32 = 1.8;
const VU_CURVE: f32 = 0.6;
const VU_RISE: f32 = 0.25;
const VU_FALL: f32 = 0.08;

/// Perceptual VU level with fast-rise, slow-fall ballistics.
///
/// Written only by the callback; read by anyone.
#[derive(Debug, Default)]
pub struct VuMeter {
    level: AtomicF32,
}

impl VuMeter {
    /// Folds one block into the meter.
    #[inline]
    pub fn update(&self, block: &[f32]) {
        let target = (rms(block) * VU_BOOST).powf(VU_CURVE);
        let current = self.level.load(Ordering::Relaxed);
        let step = if target > current { VU_RISE } else { VU_FALL };
        let next = current + (target - current) * step;
        self.level.store(next.clamp(0.0, VU_MAX), Ordering::Relaxed);
    }

    /// Current level in `[0, 1.2]`.
    pub fn level(&self) -> f32 {
        self.level.load(Ordering::Relaxed)
    }
}

/// Most recent output samples, for drawing.
///
/// Each sample is its own atomic; a reader may see a mix of two blocks.
#[derive(Debug)]
pub struct DisplaySnapshot {
    samples: [AtomicF32; DISPLAY_LEN],
}

impl Default for DisplaySnapshot {
    fn default() -> Self {
        Self {
            samples: std::array::from_fn(|_| AtomicF32::default()),
        }
    }
}

impl DisplaySnapshot {
    /// Stores the first [`DISPLAY_LEN`] samples of `block`.
    #[inline]
    pub fn write(&self, block: &[f32]) {
        for (slot, sample) in self.samples.iter().zip(block) {
            slot.store(*sample, Ordering::Relaxed);
        }
    }

    /// Copies the snapshot out.
    pub fn read(&self) -> Vec<f32> {
        self.samples
            .iter()
            .map(|s| s.load(Ordering::Relaxed))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_keeps_meter_at_zero() {
        let meter = VuMeter::default();
        meter.update(&[0.0; 256]);
        assert_eq!(meter.level(), 0.0);
    }

    #[test]
    fn test_rise_is_faster_than_fall() {
        let meter = VuMeter::default();
        meter.update(&[0.5; 256]);
        let target = (0.5f32 * VU_BOOST).powf(VU_CURVE);
        let risen = meter.level();
        assert!((risen - target * VU_RISE).abs() < 1e-6);

        for _ in 0..100 {
            meter.update(&[0.5; 256]);
        }
        let top = meter.level();
        meter.update(&[0.0; 256]);
        assert!((top - meter.level() - top * VU_FALL).abs() < 1e-6);
    }

    #[test]
    fn test_level_is_clamped() {
        let meter = VuMeter::default();
        for _ in 0..200 {
            meter.update(&[1.0; 64]);
        }
        // 1.8^0.6 exceeds the ceiling.
        assert_eq!(meter.level(), VU_MAX);
    }

    #[test]
    fn test_display_keeps_first_samples() {
        let display = DisplaySnapshot::default();
        let block: Vec<f32> = (0..512).map(|i| i as f32).collect();
        display.write(&block);
        let shown = display.read();
        assert_eq!(shown.len(), DISPLAY_LEN);
        assert_eq!(shown[255], 255.0);

        display.write(&[9.0; 4]);
        let shown = display.read();
        assert_eq!(&shown[..5], &[9.0, 9.0, 9.0, 9.0, 4.0]);
    }
}
