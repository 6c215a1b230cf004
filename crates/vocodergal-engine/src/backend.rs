//! Capability contract between the engine and a platform audio stack.
//!
//! A backend opens two independently owned endpoints. The render endpoint is
//! handed the engine's [`AudioCallback`] and invokes it at the hardware
//! cadence; the capture endpoint yields a [`CaptureReader`] that the callback
//! polls. Neither side holds a reference back into the engine.

use crate::config::{EngineConfig, InputPreset};
use crate::error::EngineResult;

/// Parameters shared by both endpoints of a duplex session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channels presented to the engine. Always 1.
    pub channel_count: u16,
    /// Frames per callback the engine asks for. Platforms may deliver other sizes.
    pub frames_per_callback: u32,
    /// Capture-side processing preset.
    pub input_preset: InputPreset,
}

impl From<&EngineConfig> for StreamConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            channel_count: config.channel_count,
            frames_per_callback: config.frames_per_callback,
            input_preset: config.input_preset,
        }
    }
}

/// What the render endpoint should do after a callback returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackStatus {
    /// Keep calling.
    Continue,
    /// Stop invoking the callback.
    Stop,
}

/// The periodic render callback.
///
/// Implementations run on the realtime thread and must neither block nor
/// allocate in steady state.
pub trait AudioCallback: Send {
    /// Fills `output` (mono, one sample per frame) and reports whether to continue.
    fn on_audio_ready(&mut self, output: &mut [f32]) -> CallbackStatus;
}

/// Non-blocking source of captured mono samples, polled from the callback.
pub trait CaptureReader: Send {
    /// Whether the capture endpoint is currently delivering audio.
    fn is_alive(&self) -> bool;

    /// Copies up to `buf.len()` samples into `buf` and returns how many were
    /// written. Never blocks.
    fn read(&mut self, buf: &mut [f32]) -> usize;
}

/// An opened platform stream.
pub trait Endpoint: Send {
    /// Begins running.
    fn start(&mut self) -> EngineResult<()>;

    /// Stops running. For a render endpoint this returns only once any
    /// in-flight callback has returned.
    fn stop(&mut self);

    /// Releases the underlying resource. Calling it twice is harmless.
    fn close(&mut self);
}

/// An opened capture endpoint and the reader the callback polls.
pub struct CaptureStream {
    /// Lifecycle handle, kept by the engine.
    pub endpoint: Box<dyn Endpoint>,
    /// Sample source, moved into the callback.
    pub reader: Box<dyn CaptureReader>,
}

impl std::fmt::Debug for CaptureStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureStream").finish_non_exhaustive()
    }
}

/// Opens capture and render endpoints.
pub trait AudioBackend: Send {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Opens the capture endpoint, initially stopped.
    fn open_capture(&mut self, config: &StreamConfig) -> EngineResult<CaptureStream>;

    /// Opens the render endpoint, initially stopped, which will drive `callback`.
    fn open_render(
        &mut self,
        config: &StreamConfig,
        callback: Box<dyn AudioCallback>,
    ) -> EngineResult<Box<dyn Endpoint>>;
}
