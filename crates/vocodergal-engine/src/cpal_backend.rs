//! Hardware endpoints through `cpal`.
//!
//! Capture runs in cpal's input callback and hands mono samples to the render
//! side through a `ringbuf` queue. Render calls the engine callback into a
//! mono scratch buffer and fans it out to the device's channels.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapRb};
use tracing::{debug, error, info};

use crate::backend::{
    AudioBackend, AudioCallback, CallbackStatus, CaptureReader, CaptureStream, Endpoint,
    StreamConfig,
};
use crate::error::{EndpointKind, EngineError, EngineResult};

/// Capture queue length in callbacks.
const CAPTURE_QUEUE_CALLBACKS: usize = 8;

/// Owned cpal stream handle.
struct SendStream(cpal::Stream);

// SAFETY: the handle is only played, paused and dropped by the endpoint that
// owns it, and the engine serializes those calls behind its lifecycle mutex.
// cpal's callbacks run on their own thread and never touch the handle.
unsafe impl Send for SendStream {}

type SharedCallback = Arc<Mutex<Box<dyn AudioCallback>>>;

/// Backend on the host's default input and output devices.
pub struct CpalBackend {
    host: cpal::Host,
}

impl std::fmt::Debug for CpalBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpalBackend")
            .field("host", &self.host.id())
            .finish()
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpalBackend {
    /// Uses the platform's default host.
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }
}

fn check_format(
    endpoint: EndpointKind,
    supported: &cpal::SupportedStreamConfig,
) -> EngineResult<()> {
    if supported.sample_format() == cpal::SampleFormat::F32 {
        Ok(())
    } else {
        Err(EngineError::UnsupportedFormat {
            endpoint,
            detail: format!("device offers {:?}, need f32", supported.sample_format()),
        })
    }
}

fn device_config(config: &StreamConfig, channels: u16) -> cpal::StreamConfig {
    cpal::StreamConfig {
        channels,
        sample_rate: cpal::SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Fixed(config.frames_per_callback),
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &str {
        "cpal"
    }

    fn open_capture(&mut self, config: &StreamConfig) -> EngineResult<CaptureStream> {
        let endpoint = EndpointKind::Capture;
        let device = self
            .host
            .default_input_device()
            .ok_or(EngineError::NoDevice { endpoint })?;
        let supported = device
            .default_input_config()
            .map_err(|e| EngineError::open_failed(endpoint, e.to_string()))?;
        check_format(endpoint, &supported)?;

        let channels = usize::from(supported.channels()).max(1);
        let capacity = config.frames_per_callback as usize * CAPTURE_QUEUE_CALLBACKS;
        let (mut producer, consumer) = HeapRb::<f32>::new(capacity).split();
        let alive = Arc::new(AtomicBool::new(false));
        let alive_on_error = Arc::clone(&alive);

        let stream = device
            .build_input_stream(
                &device_config(config, supported.channels()),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // First channel only; overflow is dropped.
                    for frame in data.chunks(channels) {
                        if let Some(sample) = frame.first() {
                            let _ = producer.try_push(*sample);
                        }
                    }
                },
                move |err| {
                    error!("capture stream error: {}", err);
                    alive_on_error.store(false, Ordering::Release);
                },
                None,
            )
            .map_err(|e| EngineError::open_failed(endpoint, e.to_string()))?;
        // Some hosts start streams on creation.
        if let Err(e) = stream.pause() {
            debug!("capture pause after build failed: {}", e);
        }

        info!(
            device = %device.name().unwrap_or_default(),
            channels,
            preset = ?config.input_preset,
            "capture endpoint opened"
        );

        Ok(CaptureStream {
            endpoint: Box::new(CpalEndpoint {
                kind: endpoint,
                stream: Some(SendStream(stream)),
                alive: Some(Arc::clone(&alive)),
                callback: None,
            }),
            reader: Box::new(CpalReader { consumer, alive }),
        })
    }

    fn open_render(
        &mut self,
        config: &StreamConfig,
        callback: Box<dyn AudioCallback>,
    ) -> EngineResult<Box<dyn Endpoint>> {
        let endpoint = EndpointKind::Render;
        let device = self
            .host
            .default_output_device()
            .ok_or(EngineError::NoDevice { endpoint })?;
        let supported = device
            .default_output_config()
            .map_err(|e| EngineError::open_failed(endpoint, e.to_string()))?;
        check_format(endpoint, &supported)?;

        let channels = usize::from(supported.channels()).max(1);
        let callback: SharedCallback = Arc::new(Mutex::new(callback));
        let in_stream = Arc::clone(&callback);
        let mut mono = vec![0.0f32; config.frames_per_callback as usize];
        let mut finished = false;

        let stream = device
            .build_output_stream(
                &device_config(config, supported.channels()),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / channels;
                    if finished {
                        data.fill(0.0);
                        return;
                    }
                    // Only grows if the host delivers a larger block than requested.
                    if mono.len() < frames {
                        mono.resize(frames, 0.0);
                    }
                    let Ok(mut callback) = in_stream.try_lock() else {
                        data.fill(0.0);
                        return;
                    };
                    let status = callback.on_audio_ready(&mut mono[..frames]);
                    for (frame, sample) in data.chunks_mut(channels).zip(&mono[..frames]) {
                        frame.fill(*sample);
                    }
                    finished = status == CallbackStatus::Stop;
                },
                |err| error!("render stream error: {}", err),
                None,
            )
            .map_err(|e| EngineError::open_failed(endpoint, e.to_string()))?;
        if let Err(e) = stream.pause() {
            debug!("render pause after build failed: {}", e);
        }

        info!(
            device = %device.name().unwrap_or_default(),
            channels, "render endpoint opened"
        );

        Ok(Box::new(CpalEndpoint {
            kind: endpoint,
            stream: Some(SendStream(stream)),
            alive: None,
            callback: Some(callback),
        }))
    }
}

struct CpalEndpoint {
    kind: EndpointKind,
    stream: Option<SendStream>,
    alive: Option<Arc<AtomicBool>>,
    callback: Option<SharedCallback>,
}

impl Endpoint for CpalEndpoint {
    fn start(&mut self) -> EngineResult<()> {
        let Some(stream) = &self.stream else {
            return Err(EngineError::start_failed(self.kind, "endpoint closed"));
        };
        stream
            .0
            .play()
            .map_err(|e| EngineError::start_failed(self.kind, e.to_string()))?;
        if let Some(alive) = &self.alive {
            alive.store(true, Ordering::Release);
        }
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(alive) = &self.alive {
            alive.store(false, Ordering::Release);
        }
        if let Some(stream) = &self.stream {
            if let Err(e) = stream.0.pause() {
                debug!("{} pause failed: {}", self.kind, e);
            }
        }
        if let Some(callback) = &self.callback {
            // Wait out a callback that is already running.
            drop(callback.lock().unwrap_or_else(|e| e.into_inner()));
        }
    }

    fn close(&mut self) {
        if self.stream.is_none() {
            return;
        }
        self.stop();
        self.stream = None;
        self.callback = None;
        debug!("{} endpoint closed", self.kind);
    }
}

impl Drop for CpalEndpoint {
    fn drop(&mut self) {
        self.close();
    }
}

struct CpalReader {
    consumer: HeapCons<f32>,
    alive: Arc<AtomicBool>,
}

impl CaptureReader for CpalReader {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    fn read(&mut self, buf: &mut [f32]) -> usize {
        self.consumer.pop_slice(buf)
    }
}
