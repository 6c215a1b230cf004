//! Envelope follower.
//!
//! Tracks the magnitude of a band-limited signal with separate attack and
//! release time constants, the way an analog vocoder's rectifier and RC
//! smoother do.

/// Default attack time constant in milliseconds.
pub const DEFAULT_ATTACK_MS: f32 = 2.0;

/// Default release time constant in milliseconds.
pub const DEFAULT_RELEASE_MS: f32 = 30.0;

/// One-pole coefficient for a time constant in milliseconds.
///
/// Returns 0 (no smoothing) for non-positive inputs.
pub fn time_constant_coeff(time_ms: f32, sample_rate: f32) -> f32 {
    let samples = sample_rate * time_ms * 0.001;
    if samples > 0.0 {
        (-1.0 / samples).exp()
    } else {
        0.0
    }
}

/// Asymmetric attack/release magnitude tracker.
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    attack_ms: f32,
    release_ms: f32,
    attack_coeff: f32,
    release_coeff: f32,
    envelope: f32,
}

impl EnvelopeFollower {
    /// Creates a follower with the default 2 ms attack and 30 ms release.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_times(sample_rate, DEFAULT_ATTACK_MS, DEFAULT_RELEASE_MS)
    }

    /// Creates a follower with explicit time constants in milliseconds.
    pub fn with_times(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        let mut follower = Self {
            attack_ms,
            release_ms,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            envelope: 0.0,
        };
        follower.set_sample_rate(sample_rate);
        follower
    }

    /// Recomputes both coefficients for a new sample rate. The envelope is kept.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.attack_coeff = time_constant_coeff(self.attack_ms, sample_rate);
        self.release_coeff = time_constant_coeff(self.release_ms, sample_rate);
    }

    /// Current envelope value.
    pub fn value(&self) -> f32 {
        self.envelope
    }

    /// Rectifies `input` and moves the envelope toward it.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let rectified = input.abs();
        let coeff = if rectified > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (1.0 - coeff) * rectified;
        self.envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_coefficients_order() {
        let follower = EnvelopeFollower::new(48_000.0);
        assert!(follower.attack_coeff < follower.release_coeff);
        assert!(follower.release_coeff < 1.0);
    }

    #[test]
    fn test_attack_reaches_level() {
        let mut follower = EnvelopeFollower::new(48_000.0);
        // 10 attack time constants
        for _ in 0..960 {
            follower.process(0.8);
        }
        assert!((follower.value() - 0.8).abs() < 1e-3);
    }

    #[test]
    fn test_rectifies_negative_input() {
        let mut follower = EnvelopeFollower::new(48_000.0);
        let positive = follower.process(0.5);
        let mut other = EnvelopeFollower::new(48_000.0);
        let negative = other.process(-0.5);
        assert_eq!(positive, negative);
    }

    #[test]
    fn test_decays_to_zero() {
        let mut follower = EnvelopeFollower::new(48_000.0);
        for _ in 0..1_000 {
            follower.process(1.0);
        }
        for _ in 0..48_000 {
            follower.process(0.0);
        }
        assert!(follower.value() < 1e-6);
    }

    #[test]
    fn test_release_is_slower_than_attack() {
        let mut rising = EnvelopeFollower::new(48_000.0);
        let mut falling = EnvelopeFollower::new(48_000.0);
        for _ in 0..10_000 {
            falling.process(1.0);
        }
        for _ in 0..96 {
            rising.process(1.0);
            falling.process(0.0);
        }
        // After 2 ms the attack has covered more than the release has.
        assert!(rising.value() > 1.0 - falling.value());
    }

    proptest! {
        #[test]
        fn envelope_moves_toward_rectified_input(
            inputs in prop::collection::vec(-2.0f32..2.0, 1..512)
        ) {
            let mut follower = EnvelopeFollower::new(48_000.0);
            for x in inputs {
                let before = follower.value();
                let after = follower.process(x);
                let eps = 1e-6;
                if x.abs() > before {
                    prop_assert!(after >= before - eps);
                    prop_assert!(after <= x.abs() + eps);
                } else {
                    prop_assert!(after <= before + eps);
                    prop_assert!(after >= x.abs() - eps);
                }
            }
        }
    }
}
