//! Buffer-level helpers for clipping, metering and normalization.

/// Hyperbolic-tangent soft clip. Output always lies in `[-1, 1]`.
#[inline]
pub fn soft_clip(sample: f32) -> f32 {
    sample.tanh()
}

/// Largest absolute sample value, 0 for an empty buffer.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
}

/// Root mean square, 0 for an empty buffer.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Scales `samples` so the largest magnitude becomes `target_peak`.
///
/// Silent buffers are left untouched.
pub fn normalize_peak(samples: &mut [f32], target_peak: f32) {
    let current_peak = peak(samples);
    if current_peak > 0.0 {
        let gain = target_peak / current_peak;
        for sample in samples.iter_mut() {
            *sample *= gain;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    #[test]
    fn test_soft_clip_limits() {
        assert_eq!(soft_clip(0.0), 0.0);
        assert!(soft_clip(100.0) <= 1.0);
        assert!(soft_clip(-100.0) >= -1.0);
        assert!((soft_clip(0.01) - 0.01).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_peak() {
        let mut samples = vec![0.1, -0.45, 0.2];
        normalize_peak(&mut samples, 0.9);
        assert!((samples[1] + 0.9).abs() < 1e-6);
        assert!((samples[0] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_silence_is_noop() {
        let mut samples = vec![0.0; 48_000];
        normalize_peak(&mut samples, 0.9);
        assert!(samples.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_rms_of_square_wave() {
        let samples: Vec<f32> = (0..100).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
        assert!((rms(&samples) - 0.5).abs() < 1e-6);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn test_normalize_noise() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut samples: Vec<f32> = (0..1024).map(|_| rng.gen_range(-0.2..0.2)).collect();
        normalize_peak(&mut samples, 0.9);
        assert!((peak(&samples) - 0.9).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn soft_clip_is_bounded(x in -1.0e6f32..1.0e6) {
            let y = soft_clip(x);
            prop_assert!((-1.0..=1.0).contains(&y));
        }
    }
}
