//! One-pole parameter smoother.
//!
//! The target lives in an [`AtomicF32`] shared with the control thread; the
//! current value is owned by whoever calls [`ParameterSmoother::process`],
//! which in practice is the audio thread.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::atomic::AtomicF32;
use crate::envelope::time_constant_coeff;

/// Distance below which the current value snaps onto the target.
const SNAP_EPSILON: f32 = 1e-6;

/// Converts stepped control values into a per-frame exponential glide.
#[derive(Debug)]
pub struct ParameterSmoother {
    target: Arc<AtomicF32>,
    current: f32,
    coeff: f32,
}

impl ParameterSmoother {
    /// Creates a smoother resting at `initial`. With no time constant set the
    /// smoother jumps straight to its target.
    pub fn new(initial: f32) -> Self {
        Self {
            target: Arc::new(AtomicF32::new(initial)),
            current: initial,
            coeff: 0.0,
        }
    }

    /// Creates a smoother driven by an existing shared target, resting at the
    /// target's current value.
    pub fn with_target(target: Arc<AtomicF32>) -> Self {
        let current = target.load(Ordering::Relaxed);
        Self {
            target,
            current,
            coeff: 0.0,
        }
    }

    /// Sets the time constant. After `time_ms` the remaining distance to the
    /// target has shrunk to about 37%.
    pub fn set_time_constant(&mut self, time_ms: f32, sample_rate: f32) {
        self.coeff = time_constant_coeff(time_ms, sample_rate);
    }

    /// Updates the destination. Safe from any thread; the current value is
    /// left alone.
    #[inline]
    pub fn set_target(&self, value: f32) {
        self.target.store(value, Ordering::Relaxed);
    }

    /// The destination value.
    pub fn target(&self) -> f32 {
        self.target.load(Ordering::Relaxed)
    }

    /// Shared handle to the target, for control-thread writers.
    pub fn target_handle(&self) -> Arc<AtomicF32> {
        Arc::clone(&self.target)
    }

    /// The value most recently returned by [`process`](Self::process).
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Advances one step toward the target and returns the new value.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let target = self.target.load(Ordering::Relaxed);
        let next = target + self.coeff * (self.current - target);
        // Near large targets the step can fall below one ulp and stall.
        self.current = if (next - target).abs() < SNAP_EPSILON || next == self.current {
            target
        } else {
            next
        };
        self.current
    }
}
