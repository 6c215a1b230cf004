//! In-process simulated audio device.
//!
//! The [`OfflineDevice`] stands in for hardware: the driver feeds capture
//! samples, pumps render cycles of any size and inspects endpoint state. Its
//! capture path takes a short mutex, so it is meant for rendering files and
//! tests rather than for a real audio thread.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::backend::{
    AudioBackend, AudioCallback, CallbackStatus, CaptureReader, CaptureStream, Endpoint,
    StreamConfig,
};
use crate::error::{EndpointKind, EngineError, EngineResult};

/// Injected failures, one switch per lifecycle step.
#[derive(Debug, Default, Clone, Copy)]
struct Faults {
    open_capture: bool,
    open_render: bool,
    start_capture: bool,
    start_render: bool,
}

#[derive(Debug, Default)]
struct DeviceState {
    faults: Faults,
    capture_open: bool,
    render_open: bool,
    config: Option<StreamConfig>,
}

#[derive(Default)]
struct DeviceShared {
    state: Mutex<DeviceState>,
    capture: Mutex<VecDeque<f32>>,
    capture_running: AtomicBool,
    render_running: AtomicBool,
    // Held for the duration of each callback; stop() acquires it to wait one out.
    callback: Mutex<Option<Box<dyn AudioCallback>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Handle to a simulated duplex device. Clones refer to the same device.
#[derive(Clone, Default)]
pub struct OfflineDevice {
    shared: Arc<DeviceShared>,
}

impl std::fmt::Debug for OfflineDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineDevice")
            .field("capture_open", &self.is_capture_open())
            .field("render_open", &self.is_render_open())
            .finish()
    }
}

impl OfflineDevice {
    /// Creates an idle device with no endpoints open.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that opens endpoints on this device.
    pub fn backend(&self) -> OfflineBackend {
        OfflineBackend {
            device: self.clone(),
        }
    }

    /// Queues samples for the capture endpoint to deliver.
    pub fn feed_capture(&self, samples: &[f32]) {
        lock(&self.shared.capture).extend(samples.iter().copied());
    }

    /// Number of queued capture samples not yet read.
    pub fn pending_capture(&self) -> usize {
        lock(&self.shared.capture).len()
    }

    /// Runs one render cycle of `frames` frames.
    ///
    /// Returns `None` when the render endpoint is not running.
    pub fn pump(&self, frames: usize) -> Option<Vec<f32>> {
        let mut output = vec![0.0; frames];
        self.pump_into(&mut output).then_some(output)
    }

    /// Runs one render cycle into `output`. Returns whether the callback ran.
    pub fn pump_into(&self, output: &mut [f32]) -> bool {
        if !self.shared.render_running.load(Ordering::Acquire) {
            return false;
        }
        let mut slot = lock(&self.shared.callback);
        let Some(callback) = slot.as_mut() else {
            return false;
        };
        if callback.on_audio_ready(output) == CallbackStatus::Stop {
            self.shared.render_running.store(false, Ordering::Release);
        }
        true
    }

    /// Runs `cycles` render cycles and concatenates their output.
    pub fn pump_cycles(&self, cycles: usize, frames: usize) -> Vec<f32> {
        let mut rendered = Vec::with_capacity(cycles * frames);
        let mut block = vec![0.0; frames];
        for _ in 0..cycles {
            if !self.pump_into(&mut block) {
                break;
            }
            rendered.extend_from_slice(&block);
        }
        rendered
    }

    /// Makes the next capture open fail.
    pub fn fail_open_capture(&self, fail: bool) {
        lock(&self.shared.state).faults.open_capture = fail;
    }

    /// Makes the next render open fail.
    pub fn fail_open_render(&self, fail: bool) {
        lock(&self.shared.state).faults.open_render = fail;
    }

    /// Makes starting the capture endpoint fail.
    pub fn fail_start_capture(&self, fail: bool) {
        lock(&self.shared.state).faults.start_capture = fail;
    }

    /// Makes starting the render endpoint fail.
    pub fn fail_start_render(&self, fail: bool) {
        lock(&self.shared.state).faults.start_render = fail;
    }

    /// Whether a capture endpoint is open.
    pub fn is_capture_open(&self) -> bool {
        lock(&self.shared.state).capture_open
    }

    /// Whether a render endpoint is open.
    pub fn is_render_open(&self) -> bool {
        lock(&self.shared.state).render_open
    }

    /// Whether the capture endpoint is running.
    pub fn is_capture_running(&self) -> bool {
        self.shared.capture_running.load(Ordering::Acquire)
    }

    /// Whether the render endpoint is running.
    pub fn is_render_running(&self) -> bool {
        self.shared.render_running.load(Ordering::Acquire)
    }

    /// Configuration of the most recently opened endpoint.
    pub fn stream_config(&self) -> Option<StreamConfig> {
        lock(&self.shared.state).config
    }
}

/// [`AudioBackend`] over an [`OfflineDevice`].
#[derive(Debug, Clone)]
pub struct OfflineBackend {
    device: OfflineDevice,
}

impl OfflineBackend {
    /// The device this backend opens endpoints on.
    pub fn device(&self) -> &OfflineDevice {
        &self.device
    }
}

impl AudioBackend for OfflineBackend {
    fn name(&self) -> &str {
        "offline"
    }

    fn open_capture(&mut self, config: &StreamConfig) -> EngineResult<CaptureStream> {
        let shared = &self.device.shared;
        let mut state = lock(&shared.state);
        if state.faults.open_capture {
            return Err(EngineError::open_failed(EndpointKind::Capture, "injected failure"));
        }
        if state.capture_open {
            return Err(EngineError::open_failed(EndpointKind::Capture, "device busy"));
        }
        state.capture_open = true;
        state.config = Some(*config);
        debug!(sample_rate = config.sample_rate, "offline capture opened");

        Ok(CaptureStream {
            endpoint: Box::new(OfflineEndpoint {
                shared: Arc::clone(shared),
                kind: EndpointKind::Capture,
                open: true,
            }),
            reader: Box::new(OfflineReader {
                shared: Arc::clone(shared),
            }),
        })
    }

    fn open_render(
        &mut self,
        config: &StreamConfig,
        callback: Box<dyn AudioCallback>,
    ) -> EngineResult<Box<dyn Endpoint>> {
        let shared = &self.device.shared;
        let mut state = lock(&shared.state);
        if state.faults.open_render {
            return Err(EngineError::open_failed(EndpointKind::Render, "injected failure"));
        }
        if state.render_open {
            return Err(EngineError::open_failed(EndpointKind::Render, "device busy"));
        }
        state.render_open = true;
        state.config = Some(*config);
        *lock(&shared.callback) = Some(callback);
        debug!(sample_rate = config.sample_rate, "offline render opened");

        Ok(Box::new(OfflineEndpoint {
            shared: Arc::clone(shared),
            kind: EndpointKind::Render,
            open: true,
        }))
    }
}

struct OfflineEndpoint {
    shared: Arc<DeviceShared>,
    kind: EndpointKind,
    open: bool,
}

impl OfflineEndpoint {
    fn running(&self) -> &AtomicBool {
        match self.kind {
            EndpointKind::Capture => &self.shared.capture_running,
            EndpointKind::Render => &self.shared.render_running,
        }
    }
}

impl Endpoint for OfflineEndpoint {
    fn start(&mut self) -> EngineResult<()> {
        if !self.open {
            return Err(EngineError::start_failed(self.kind, "endpoint closed"));
        }
        let faults = lock(&self.shared.state).faults;
        let fail = match self.kind {
            EndpointKind::Capture => faults.start_capture,
            EndpointKind::Render => faults.start_render,
        };
        if fail {
            return Err(EngineError::start_failed(self.kind, "injected failure"));
        }
        self.running().store(true, Ordering::Release);
        Ok(())
    }

    fn stop(&mut self) {
        self.running().store(false, Ordering::Release);
        if self.kind == EndpointKind::Render {
            // Wait out a callback that is already running.
            drop(lock(&self.shared.callback));
        }
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.stop();
        self.open = false;
        let mut state = lock(&self.shared.state);
        match self.kind {
            EndpointKind::Capture => state.capture_open = false,
            EndpointKind::Render => {
                state.render_open = false;
                lock(&self.shared.callback).take();
            }
        }
    }
}

impl Drop for OfflineEndpoint {
    fn drop(&mut self) {
        self.close();
    }
}

struct OfflineReader {
    shared: Arc<DeviceShared>,
}

impl CaptureReader for OfflineReader {
    fn is_alive(&self) -> bool {
        self.shared.capture_running.load(Ordering::Acquire)
    }

    fn read(&mut self, buf: &mut [f32]) -> usize {
        let mut queue = lock(&self.shared.capture);
        let count = buf.len().min(queue.len());
        for (slot, sample) in buf.iter_mut().zip(queue.drain(..count)) {
            *slot = sample;
        }
        count
    }
}
