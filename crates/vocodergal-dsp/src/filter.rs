//! Biquad filter implementations.
//!
//! This module provides the bandpass and highpass sections the vocoder is
//! built from. Coefficients follow the Audio EQ Cookbook formulas, normalized
//! by `a0`.

use std::f32::consts::PI;

/// Response type of a [`BiquadFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Resonant bandpass with 0 dB gain at the center frequency.
    Bandpass,
    /// Second-order highpass.
    Highpass,
}

/// Biquad filter coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoeffs {
    /// Coefficients that pass nothing. Used before a filter is configured.
    pub const SILENT: Self = Self {
        b0: 0.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Creates coefficients for the given response.
    pub fn new(kind: FilterKind, freq: f32, q: f32, sample_rate: f32) -> Self {
        match kind {
            FilterKind::Bandpass => Self::bandpass(freq, q, sample_rate),
            FilterKind::Highpass => Self::highpass(freq, q, sample_rate),
        }
    }

    /// Creates bandpass filter coefficients (constant 0 dB peak gain).
    ///
    /// # Arguments
    /// * `center` - Center frequency in Hz
    /// * `q` - Q factor (bandwidth = center / Q)
    /// * `sample_rate` - Audio sample rate in Hz
    pub fn bandpass(center: f32, q: f32, sample_rate: f32) -> Self {
        let (w0, alpha) = Self::prewarp(center, q, sample_rate);
        let cos_w0 = w0.cos();

        let b0 = alpha;
        let b1 = 0.0;
        let b2 = -alpha;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    /// Creates highpass filter coefficients.
    ///
    /// # Arguments
    /// * `cutoff` - Cutoff frequency in Hz
    /// * `q` - Q factor (resonance), 0.707 is Butterworth
    /// * `sample_rate` - Audio sample rate in Hz
    pub fn highpass(cutoff: f32, q: f32, sample_rate: f32) -> Self {
        let (w0, alpha) = Self::prewarp(cutoff, q, sample_rate);
        let cos_w0 = w0.cos();

        let b0 = (1.0 + cos_w0) / 2.0;
        let b1 = -(1.0 + cos_w0);
        let b2 = (1.0 + cos_w0) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    fn prewarp(freq: f32, q: f32, sample_rate: f32) -> (f32, f32) {
        // Clamp Q to minimum safe value to prevent division by zero
        let q = q.max(0.5);
        let w0 = 2.0 * PI * freq / sample_rate;
        (w0, w0.sin() / (2.0 * q))
    }

    fn normalized(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Biquad filter state (direct form I).
///
/// History persists across calls and across coefficient changes. Retuning a
/// running filter can ring briefly; clearing the history instead would click.
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    kind: FilterKind,
    coeffs: BiquadCoeffs,
    // Delay line for input samples
    x1: f32,
    x2: f32,
    // Delay line for output samples
    y1: f32,
    y2: f32,
}

impl BiquadFilter {
    /// Creates an unconfigured filter of the given kind. It outputs silence
    /// until [`set_coefficients`](Self::set_coefficients) is called.
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            coeffs: BiquadCoeffs::SILENT,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Creates a bandpass filter.
    pub fn bandpass(center: f32, q: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new(FilterKind::Bandpass);
        filter.set_coefficients(center, q, sample_rate);
        filter
    }

    /// Creates a highpass filter.
    pub fn highpass(cutoff: f32, q: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new(FilterKind::Highpass);
        filter.set_coefficients(cutoff, q, sample_rate);
        filter
    }

    /// Recomputes coefficients for this filter's kind. History is kept.
    pub fn set_coefficients(&mut self, freq: f32, q: f32, sample_rate: f32) {
        self.coeffs = BiquadCoeffs::new(self.kind, freq, q, sample_rate);
    }

    /// The response type.
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// The coefficients in use.
    pub fn coeffs(&self) -> BiquadCoeffs {
        self.coeffs
    }

    /// Processes a single sample through the filter.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        // Update delay lines
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sine_gain(filter: &mut BiquadFilter, freq: f32, sample_rate: f32) -> f32 {
        let n = sample_rate as usize / 2;
        let mut peak = 0.0f32;
        for i in 0..n {
            let x = (2.0 * PI * freq * i as f32 / sample_rate).sin();
            let y = filter.process(x);
            // Skip the settling period
            if i > n / 2 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn test_unconfigured_filter_is_silent() {
        let mut filter = BiquadFilter::new(FilterKind::Bandpass);
        assert_eq!(filter.process(1.0), 0.0);
    }

    #[test]
    fn test_constructors_match_coefficients() {
        let filter = BiquadFilter::highpass(200.0, 0.707, 48_000.0);
        assert_eq!(filter.kind(), FilterKind::Highpass);
        assert_eq!(filter.coeffs(), BiquadCoeffs::highpass(200.0, 0.707, 48_000.0));

        let mut filter = BiquadFilter::new(FilterKind::Bandpass);
        filter.set_coefficients(1_000.0, 12.0, 48_000.0);
        let coeffs = filter.coeffs();
        assert_eq!(coeffs, BiquadCoeffs::bandpass(1_000.0, 12.0, 48_000.0));
        // Zero-gain bandpass: symmetric zeros at DC and Nyquist.
        assert_eq!(coeffs.b1, 0.0);
        assert_eq!(coeffs.b2, -coeffs.b0);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut filter = BiquadFilter::highpass(200.0, 0.707, 48_000.0);
        let mut last = 1.0;
        for _ in 0..10_000 {
            last = filter.process(1.0);
        }
        assert!(last.abs() < 1e-3);
    }

    #[test]
    fn test_bandpass_passes_center_and_rejects_far_bands() {
        let sr = 48_000.0;
        let at_center = sine_gain(&mut BiquadFilter::bandpass(1_000.0, 12.0, sr), 1_000.0, sr);
        let far_away = sine_gain(&mut BiquadFilter::bandpass(1_000.0, 12.0, sr), 8_000.0, sr);
        assert!((at_center - 1.0).abs() < 0.05, "center gain {}", at_center);
        assert!(far_away < at_center * 0.1, "far gain {}", far_away);
    }

    #[test]
    fn test_retune_keeps_history() {
        let mut filter = BiquadFilter::bandpass(1_000.0, 12.0, 48_000.0);
        for _ in 0..16 {
            filter.process(0.5);
        }
        filter.set_coefficients(2_000.0, 12.0, 48_000.0);
        // With zero input the output is driven purely by the retained history.
        assert!(filter.process(0.0).abs() > 0.0);
    }

    proptest! {
        #[test]
        fn impulse_response_is_bounded(
            freq in 20.0f32..20_000.0,
            q in 0.5f32..99.0,
            highpass in any::<bool>(),
        ) {
            let sr = 48_000.0;
            let kind = if highpass { FilterKind::Highpass } else { FilterKind::Bandpass };
            let mut filter = BiquadFilter::new(kind);
            filter.set_coefficients(freq.min(sr * 0.45), q, sr);

            let mut peak = filter.process(1.0).abs();
            for _ in 0..48_000 {
                let y = filter.process(0.0);
                prop_assert!(y.is_finite());
                peak = peak.max(y.abs());
            }
            prop_assert!(peak < 10.0, "peak {}", peak);
        }
    }
}
