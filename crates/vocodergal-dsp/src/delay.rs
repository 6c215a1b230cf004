//! Circular echo line.

/// Fixed-capacity ring buffer holding the echo tail.
///
/// The read and write positions coincide: each frame reads the sample stored
/// one full buffer length ago and then either replaces it or lets it decay.
#[derive(Debug, Clone)]
pub struct EchoLine {
    buffer: Vec<f32>,
    index: usize,
    decay: f32,
}

impl EchoLine {
    /// Creates a zeroed line holding `length` samples (at least one).
    pub fn new(length: usize, decay: f32) -> Self {
        Self {
            buffer: vec![0.0; length.max(1)],
            index: 0,
            decay,
        }
    }

    /// Creates a line long enough for `time_ms` at `sample_rate`.
    pub fn with_duration(time_ms: f32, sample_rate: f32, decay: f32) -> Self {
        let length = (time_ms * 0.001 * sample_rate).round() as usize;
        Self::new(length, decay)
    }

    /// Capacity in samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Always false; a line holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Current position, always in `[0, len)`.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Sample stored at the current position.
    #[inline]
    pub fn read(&self) -> f32 {
        self.buffer[self.index]
    }

    /// Overwrites the sample at the current position.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.index] = sample;
    }

    /// Scales the sample at the current position by the decay factor.
    #[inline]
    pub fn decay(&mut self) {
        self.buffer[self.index] *= self.decay;
    }

    /// Moves to the next position, wrapping at capacity.
    #[inline]
    pub fn advance(&mut self) {
        self.index = (self.index + 1) % self.buffer.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_to_length() {
        let line = EchoLine::with_duration(300.0, 48_000.0, 0.95);
        assert_eq!(line.len(), 14_400);
    }

    #[test]
    fn test_zero_length_is_clamped() {
        let mut line = EchoLine::new(0, 0.95);
        assert_eq!(line.len(), 1);
        line.write(0.5);
        line.advance();
        assert_eq!(line.position(), 0);
        assert_eq!(line.read(), 0.5);
    }

    #[test]
    fn test_written_sample_returns_after_one_lap() {
        let mut line = EchoLine::new(4, 0.95);
        line.write(0.7);
        for _ in 0..4 {
            line.advance();
        }
        assert_eq!(line.read(), 0.7);
    }

    #[test]
    fn test_decay_scales_in_place() {
        let mut line = EchoLine::new(2, 0.95);
        line.write(1.0);
        line.decay();
        assert!((line.read() - 0.95).abs() < 1e-7);
    }

    #[test]
    fn test_position_wraps() {
        let mut line = EchoLine::new(3, 0.95);
        for _ in 0..7 {
            line.advance();
            assert!(line.position() < 3);
        }
        assert_eq!(line.position(), 1);
    }
}
