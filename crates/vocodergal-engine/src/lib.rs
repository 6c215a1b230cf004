//! VocoderGal Audio Engine
//!
//! This crate runs the [`VocoderProcessor`](vocodergal_dsp::VocoderProcessor)
//! against a duplex audio device. It owns the realtime callback, the looped
//! modulator and carrier buffers, the internal recorder and the meters, and
//! exposes a thread-safe control surface through [`Engine`].
//!
//! # Threads
//!
//! One realtime thread, driven by the render endpoint, calls the engine's
//! [`AudioCallback`]. Any number of control threads call [`Engine`] methods.
//! Scalars cross over as atomics, bulk buffers are swapped whole with
//! `arc-swap`, recorded audio flows through a `ringbuf` SPSC queue. The
//! callback never blocks, never allocates in steady state and never logs.
//!
//! # Example
//!
//! ```
//! use vocodergal_engine::{Engine, EngineConfig, OfflineDevice, Source};
//!
//! let device = OfflineDevice::new();
//! let engine = Engine::new(EngineConfig::default(), device.backend())?;
//! engine.set_modulator_buffer(vec![0.5; 4_800]);
//! engine.set_source(Source::File);
//! engine.start()?;
//!
//! let block = device.pump(256).expect("render is running");
//! assert_eq!(block.len(), 256);
//! engine.stop();
//! # Ok::<(), vocodergal_engine::EngineError>(())
//! ```
//!
//! # Crate Structure
//!
//! - [`backend`] - Capability traits between the engine and an audio stack
//! - [`offline`] - Simulated device for rendering and tests
//! - `cpal_backend` - Hardware endpoints through `cpal` (feature `cpal`)
//! - [`config`] - Serializable engine configuration
//! - [`error`] - Engine error types

pub mod backend;
mod buffers;
mod callback;
pub mod config;
#[cfg(feature = "cpal")]
pub mod cpal_backend;
mod engine;
pub mod error;
mod meter;
pub mod offline;
mod recorder;
mod state;

// Re-export main types at crate root
pub use backend::{
    AudioBackend, AudioCallback, CallbackStatus, CaptureReader, CaptureStream, Endpoint,
    StreamConfig,
};
pub use config::{EngineConfig, InputPreset};
#[cfg(feature = "cpal")]
pub use cpal_backend::CpalBackend;
pub use engine::{Engine, RECORDING_PEAK};
pub use error::{EndpointKind, EngineError, EngineResult};
pub use meter::{DISPLAY_LEN, VU_MAX};
pub use offline::{OfflineBackend, OfflineDevice};
pub use state::{Source, EXTERNAL_CARRIER};
