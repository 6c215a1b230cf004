//! VocoderGal DSP Core
//!
//! This crate implements the signal path of the VocoderGal voice transformer:
//! a modulator (usually a microphone voice) is split into 20 resonant bands,
//! each band's envelope is tracked, and the envelopes shape the same bands of
//! a carrier (a wavetable oscillator or an externally supplied signal).
//!
//! # Realtime Safety
//!
//! Everything reachable from [`VocoderProcessor::process`] is allocation-free
//! and lock-free. Construction allocates (wavetables, echo line); processing
//! never does. Parameters cross threads through [`ProcessorControls`], a block
//! of atomics the control thread writes and the audio thread reads once per
//! frame through [`ParameterSmoother`]s.
//!
//! # Signal Chain
//!
//! ```text
//! modulator ─► preamp ─► highpass ─┬─► band[0..20] ─► gate ─┐
//! carrier (osc | external) ────────┘                        ▼
//!                               normalize ─► tremolo ─► echo ─► tanh
//! ```
//!
//! # Crate Structure
//!
//! - [`oscillator`] - Wavetable oscillator (sawtooth, square, triangle, sine)
//! - [`filter`] - Biquad bandpass/highpass filters
//! - [`envelope`] - Asymmetric envelope follower
//! - [`smoother`] - One-pole parameter smoother with an atomic target
//! - [`delay`] - Circular echo line
//! - [`processing`] - Soft clip, RMS and peak normalization helpers
//! - [`config`] - Serializable processor configuration
//! - [`vocoder`] - The 20-band vocoder processor

pub mod atomic;
pub mod config;
pub mod delay;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod oscillator;
pub mod processing;
pub mod smoother;
pub mod vocoder;

// Re-export main types at crate root
pub use atomic::AtomicF32;
pub use config::ProcessorConfig;
pub use error::{ConfigError, DspResult};
pub use oscillator::{Oscillator, Waveform};
pub use smoother::ParameterSmoother;
pub use vocoder::{ProcessorControls, VocoderProcessor, BAND_FREQUENCIES, NUM_BANDS};

/// Native sample rate of the engine in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;
