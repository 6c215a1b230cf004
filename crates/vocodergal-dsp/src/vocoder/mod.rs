//! Multiband vocoder.
//!
//! The modulator is pre-amplified, highpassed and split into [`NUM_BANDS`]
//! bandpass bands. Each band's envelope gates and scales the same band of the
//! carrier; the bands are summed, normalized, optionally tremoloed and echoed,
//! and finally soft clipped.

mod bands;
mod controls;
mod processor;

#[cfg(test)]
mod tests_controls;
#[cfg(test)]
mod tests_processor;

// Re-export public API
pub use bands::{band_centers, BAND_FREQUENCIES, NUM_BANDS};
pub use controls::{
    ProcessorControls, ECHO_RANGE, INTENSITY_RANGE, NOISE_THRESHOLD_RANGE, PITCH_RANGE,
    TREMOLO_RANGE, VIBRATO_RANGE,
};
pub use processor::VocoderProcessor;
