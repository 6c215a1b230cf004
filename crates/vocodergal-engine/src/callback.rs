//! The realtime audio callback.

use std::sync::{Arc, Mutex};

use vocodergal_dsp::VocoderProcessor;

use crate::backend::{AudioCallback, CallbackStatus, CaptureReader};
use crate::recorder::RecorderInput;
use crate::state::{SharedState, Source};

/// State only the callback touches.
///
/// It outlives any single session: the engine keeps it across stop/start so
/// filter history, smoothers and scratch capacity carry over.
pub struct RealtimeState {
    processor: VocoderProcessor,
    recorder: RecorderInput,
    mic: Vec<f32>,
    input: Vec<f32>,
    carrier: Vec<f32>,
}

impl RealtimeState {
    /// Wraps a processor with scratch space for `frames` frames.
    pub fn new(processor: VocoderProcessor, recorder: RecorderInput, frames: usize) -> Self {
        Self {
            processor,
            recorder,
            mic: vec![0.0; frames],
            input: vec![0.0; frames],
            carrier: vec![0.0; frames],
        }
    }

    fn ensure_capacity(&mut self, frames: usize) {
        if self.input.len() < frames {
            self.mic.resize(frames, 0.0);
            self.input.resize(frames, 0.0);
            self.carrier.resize(frames, 0.0);
        }
    }
}

/// The engine's single [`AudioCallback`] implementation.
pub struct EngineCallback {
    shared: Arc<SharedState>,
    realtime: Arc<Mutex<RealtimeState>>,
    capture: Box<dyn CaptureReader>,
}

impl EngineCallback {
    pub fn new(
        shared: Arc<SharedState>,
        realtime: Arc<Mutex<RealtimeState>>,
        capture: Box<dyn CaptureReader>,
    ) -> Self {
        Self {
            shared,
            realtime,
            capture,
        }
    }
}

impl AudioCallback for EngineCallback {
    fn on_audio_ready(&mut self, output: &mut [f32]) -> CallbackStatus {
        // Contended only while a previous session is being torn down.
        let Ok(mut guard) = self.realtime.try_lock() else {
            output.fill(0.0);
            return CallbackStatus::Continue;
        };
        let rt = &mut *guard;
        let shared = &*self.shared;
        let frames = output.len();

        rt.ensure_capacity(frames);
        let mic = &mut rt.mic[..frames];
        let input = &mut rt.input[..frames];
        let carrier = &mut rt.carrier[..frames];
        mic.fill(0.0);

        let source = shared.source();
        let mut got_input = false;

        if self.capture.is_alive() {
            let read = self.capture.read(mic);
            if read > 0 {
                rt.recorder.capture(&mic[..read]);
                if source == Source::Mic && shared.mic_active() {
                    input.copy_from_slice(mic);
                    got_input = true;
                }
            }
        }

        if source == Source::File && shared.file_playing() {
            let modulator = shared.modulator.load();
            if !modulator.is_empty() {
                shared.file_cursor.fill(&modulator, input);
                got_input = true;
            }
        }

        let mut has_carrier = false;
        if shared.external_carrier() {
            let external = shared.carrier.load();
            if !external.is_empty() {
                shared.carrier_cursor.fill(&external, carrier);
                has_carrier = true;
            }
        }

        if !got_input {
            input.fill(0.0);
        }

        shared.vu.update(if got_input { &*input } else { &*mic });

        let carrier = has_carrier.then_some(&*carrier);
        rt.processor.process(input, carrier, output);

        shared.display.write(output);
        CallbackStatus::Continue
    }
}
