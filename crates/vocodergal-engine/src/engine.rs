//! The engine control surface.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, info, warn};
use vocodergal_dsp::processing::normalize_peak;
use vocodergal_dsp::{ProcessorControls, VocoderProcessor};

use crate::backend::{AudioBackend, CaptureStream, Endpoint, StreamConfig};
use crate::callback::{EngineCallback, RealtimeState};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::recorder::{recorder, RecorderOutput};
use crate::state::{SharedState, Source, EXTERNAL_CARRIER};

/// Peak level a finished recording is normalized to.
pub const RECORDING_PEAK: f32 = 0.9;

/// A running duplex session. Both endpoints are owned here and released
/// together.
struct Session {
    capture: Box<dyn Endpoint>,
    render: Box<dyn Endpoint>,
}

impl Session {
    fn shutdown(mut self) {
        // Stopping render waits out an in-flight callback before anything closes.
        self.render.stop();
        self.capture.stop();
        self.render.close();
        self.capture.close();
    }
}

struct Lifecycle {
    backend: Box<dyn AudioBackend>,
    session: Option<Session>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|e| {
        warn!("{} mutex poisoned; continuing", what);
        e.into_inner()
    })
}

/// Realtime vocoder engine.
///
/// Owns the processor, the recorder and both endpoints. Every method takes
/// `&self` and may be called from any thread, concurrently with the audio
/// callback.
pub struct Engine {
    config: EngineConfig,
    shared: Arc<SharedState>,
    controls: ProcessorControls,
    realtime: Arc<Mutex<RealtimeState>>,
    recorder: RecorderOutput,
    running: AtomicBool,
    lifecycle: Mutex<Lifecycle>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("source", &self.source())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Builds a stopped engine on `backend`.
    ///
    /// Everything the callback needs is allocated here.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidConfig`](crate::EngineError::InvalidConfig)
    /// if `config` does not validate.
    pub fn new(config: EngineConfig, backend: impl AudioBackend + 'static) -> EngineResult<Self> {
        config.validate()?;

        let processor = VocoderProcessor::new(config.processor.clone(), config.sample_rate as f32)?;
        let controls = processor.controls().clone();
        let (recorder_input, recorder_output) = recorder(
            config.record_capacity(),
            config.frames_per_callback as usize,
        );
        let realtime = RealtimeState::new(
            processor,
            recorder_input,
            config.frames_per_callback as usize,
        );

        info!(
            backend = backend.name(),
            sample_rate = config.sample_rate,
            frames = config.frames_per_callback,
            record_capacity = recorder_output.capacity(),
            "engine created"
        );

        Ok(Self {
            shared: Arc::new(SharedState::new(config.processor.waveform.max(0))),
            controls,
            realtime: Arc::new(Mutex::new(realtime)),
            recorder: recorder_output,
            running: AtomicBool::new(false),
            lifecycle: Mutex::new(Lifecycle {
                backend: Box::new(backend),
                session: None,
            }),
            config,
        })
    }

    /// Opens and starts both endpoints. Does nothing if already running.
    ///
    /// On failure every endpoint opened so far is closed again and the engine
    /// stays stopped. Failures are not retried.
    pub fn start(&self) -> EngineResult<()> {
        let mut lifecycle = lock(&self.lifecycle, "lifecycle");
        if lifecycle.session.is_some() {
            return Ok(());
        }

        let stream_config = StreamConfig::from(&self.config);
        let session = self
            .open_session(lifecycle.backend.as_mut(), &stream_config)
            .map_err(|e| {
                error!(error = %e, "engine failed to start");
                e
            })?;

        lifecycle.session = Some(session);
        self.running.store(true, Ordering::Release);
        info!(
            sample_rate = stream_config.sample_rate,
            frames = stream_config.frames_per_callback,
            "engine started"
        );
        Ok(())
    }

    fn open_session(
        &self,
        backend: &mut dyn AudioBackend,
        config: &StreamConfig,
    ) -> EngineResult<Session> {
        let CaptureStream {
            endpoint: mut capture,
            reader,
        } = backend.open_capture(config)?;

        let callback = EngineCallback::new(
            Arc::clone(&self.shared),
            Arc::clone(&self.realtime),
            reader,
        );
        let mut render = match backend.open_render(config, Box::new(callback)) {
            Ok(render) => render,
            Err(e) => {
                capture.close();
                return Err(e);
            }
        };

        if let Err(e) = capture.start() {
            render.close();
            capture.close();
            return Err(e);
        }
        if let Err(e) = render.start() {
            capture.stop();
            render.close();
            capture.close();
            return Err(e);
        }

        Ok(Session { capture, render })
    }

    /// Stops and closes both endpoints. Safe to call at any time; returns
    /// once no callback can still be running.
    pub fn stop(&self) {
        // Held until shutdown completes so a concurrent start() waits for it.
        let mut lifecycle = lock(&self.lifecycle, "lifecycle");
        if let Some(session) = lifecycle.session.take() {
            session.shutdown();
            self.running.store(false, Ordering::Release);
            info!("engine stopped");
        }
    }

    /// Whether a session is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parameter handle shared with the processor.
    pub fn controls(&self) -> &ProcessorControls {
        &self.controls
    }

    // Parameters

    /// Carrier pitch in Hz, clamped to 50-400.
    pub fn set_pitch(&self, pitch: f32) {
        self.controls.set_pitch(pitch);
    }

    /// Band gain, clamped to 0.2-4.0.
    pub fn set_intensity(&self, intensity: f32) {
        self.controls.set_intensity(intensity);
    }

    /// Waveform selector: 0 sawtooth, 1 square, 2 triangle, 3 sine, 4 or
    /// above the external carrier buffer. Negative values are ignored.
    pub fn set_waveform(&self, selector: i32) {
        if selector < 0 {
            return;
        }
        self.shared.set_waveform_type(selector);
        if selector < EXTERNAL_CARRIER {
            self.controls.set_waveform(selector);
        }
    }

    /// Vibrato amount, clamped to 0-1.
    pub fn set_vibrato(&self, amount: f32) {
        self.controls.set_vibrato(amount);
    }

    /// Echo amount, clamped to 0-0.7.
    pub fn set_echo(&self, amount: f32) {
        self.controls.set_echo(amount);
    }

    /// Tremolo amount, clamped to 0-1.
    pub fn set_tremolo(&self, amount: f32) {
        self.controls.set_tremolo(amount);
    }

    /// Per-band gate threshold, clamped to 0.005-0.2.
    pub fn set_noise_threshold(&self, threshold: f32) {
        self.controls.set_noise_threshold(threshold);
    }

    /// Current waveform selector.
    pub fn waveform_type(&self) -> i32 {
        self.shared.waveform_type()
    }

    // Sources

    /// Selects the modulator source.
    pub fn set_source(&self, source: Source) {
        if self.shared.source() != source {
            info!(?source, "switching modulator source");
        }
        self.shared.set_source(source);
    }

    /// Current modulator source.
    pub fn source(&self) -> Source {
        self.shared.source()
    }

    /// Pauses or resumes the looped modulator buffer. The cursor is kept.
    pub fn set_file_playing(&self, playing: bool) {
        self.shared.set_file_playing(playing);
    }

    /// Whether the modulator buffer plays when selected.
    pub fn is_file_playing(&self) -> bool {
        self.shared.file_playing()
    }

    /// Mutes or unmutes the microphone as a modulator. Capture for recording
    /// and metering continues either way.
    pub fn set_mic_active(&self, active: bool) {
        debug!(active, "mic active");
        self.shared.set_mic_active(active);
    }

    /// Whether the microphone feeds the vocoder when selected.
    pub fn is_mic_active(&self) -> bool {
        self.shared.mic_active()
    }

    /// Rewinds the modulator buffer.
    pub fn reset_file_index(&self) {
        self.shared.file_cursor.reset();
    }

    /// Read position in the modulator buffer.
    pub fn file_position(&self) -> usize {
        self.shared.file_cursor.position()
    }

    /// Replaces the modulator buffer and rewinds it. Samples must already be
    /// at the engine's sample rate.
    pub fn set_modulator_buffer(&self, samples: impl Into<Vec<f32>>) {
        let samples = samples.into();
        let len = samples.len();
        self.shared.modulator.publish(samples);
        self.shared.file_cursor.reset();
        info!(samples = len, "modulator buffer loaded");
    }

    /// Length of the modulator buffer.
    pub fn modulator_len(&self) -> usize {
        self.shared.modulator.len()
    }

    /// Copy of the modulator buffer.
    pub fn modulator_data(&self) -> Vec<f32> {
        self.shared.modulator.snapshot()
    }

    /// Replaces the external carrier buffer and rewinds it.
    pub fn set_carrier_buffer(&self, samples: impl Into<Vec<f32>>) {
        let samples = samples.into();
        let len = samples.len();
        self.shared.carrier.publish(samples);
        self.shared.carrier_cursor.reset();
        info!(samples = len, "external carrier loaded");
    }

    /// Length of the external carrier buffer.
    pub fn carrier_len(&self) -> usize {
        self.shared.carrier.len()
    }

    // Recording

    /// Starts capturing the microphone into the recorder. No-op while a take
    /// is running; discards a take the recorder ended on its own.
    pub fn start_recording(&self) {
        if self.recorder.start() {
            info!(capacity = self.recorder.capacity(), "recording started");
        }
    }

    /// Ends the take and, if anything was captured, normalizes it to a 0.9
    /// peak and publishes it as the modulator buffer.
    ///
    /// Also collects a take that ended because the recorder filled. No-op
    /// otherwise.
    pub fn stop_recording(&self) {
        let Some(mut take) = self.recorder.stop() else {
            return;
        };
        if take.is_empty() {
            info!("recording stopped with no samples captured");
            return;
        }
        normalize_peak(&mut take, RECORDING_PEAK);
        let len = take.len();
        self.shared.modulator.publish(take);
        self.shared.file_cursor.reset();
        info!(samples = len, "recording stopped");
    }

    /// Whether a take is running.
    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Whether the recorder filled up and ended a take that
    /// [`stop_recording`](Self::stop_recording) has not collected yet.
    pub fn has_pending_take(&self) -> bool {
        self.recorder.has_pending_take()
    }

    /// Samples captured in the current or last take.
    pub fn recorded_len(&self) -> usize {
        self.recorder.captured()
    }

    // Telemetry

    /// Smoothed input level in `[0, 1.2]`.
    pub fn vu_level(&self) -> f32 {
        self.shared.vu.level()
    }

    /// The first samples of the most recent output block.
    pub fn waveform_data(&self) -> Vec<f32> {
        self.shared.display.read()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}
