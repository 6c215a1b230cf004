//! Scalar state shared between control callers and the audio callback.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::buffers::{LoopCursor, SampleSlot};
use crate::meter::{DisplaySnapshot, VuMeter};

/// Selector values at or above this pick the external carrier.
pub const EXTERNAL_CARRIER: i32 = 4;

/// Where the modulator comes from. The two sources are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Live capture.
    #[default]
    Mic,
    /// The looped modulator buffer.
    File,
}

impl Source {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Source::File,
            _ => Source::Mic,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Source::Mic => 0,
            Source::File => 1,
        }
    }
}

/// Everything the callback reads that a control caller may change.
///
/// Scalars are independent, so relaxed ordering suffices; bulk buffers go
/// through [`SampleSlot`].
#[derive(Debug)]
pub struct SharedState {
    source: AtomicU8,
    mic_active: AtomicBool,
    file_playing: AtomicBool,
    waveform_type: AtomicI32,
    pub modulator: SampleSlot,
    pub carrier: SampleSlot,
    pub file_cursor: LoopCursor,
    pub carrier_cursor: LoopCursor,
    pub vu: VuMeter,
    pub display: DisplaySnapshot,
}

impl SharedState {
    /// Creates state with the mic selected and active, file playback enabled.
    pub fn new(waveform_type: i32) -> Self {
        Self {
            source: AtomicU8::new(Source::Mic.as_u8()),
            mic_active: AtomicBool::new(true),
            file_playing: AtomicBool::new(true),
            waveform_type: AtomicI32::new(waveform_type),
            modulator: SampleSlot::default(),
            carrier: SampleSlot::default(),
            file_cursor: LoopCursor::default(),
            carrier_cursor: LoopCursor::default(),
            vu: VuMeter::default(),
            display: DisplaySnapshot::default(),
        }
    }

    pub fn source(&self) -> Source {
        Source::from_u8(self.source.load(Ordering::Relaxed))
    }

    pub fn set_source(&self, source: Source) {
        self.source.store(source.as_u8(), Ordering::Relaxed);
    }

    pub fn mic_active(&self) -> bool {
        self.mic_active.load(Ordering::Relaxed)
    }

    pub fn set_mic_active(&self, active: bool) {
        self.mic_active.store(active, Ordering::Relaxed);
    }

    pub fn file_playing(&self) -> bool {
        self.file_playing.load(Ordering::Relaxed)
    }

    pub fn set_file_playing(&self, playing: bool) {
        self.file_playing.store(playing, Ordering::Relaxed);
    }

    pub fn waveform_type(&self) -> i32 {
        self.waveform_type.load(Ordering::Relaxed)
    }

    pub fn set_waveform_type(&self, selector: i32) {
        self.waveform_type.store(selector, Ordering::Relaxed);
    }

    /// Whether the external carrier is selected.
    pub fn external_carrier(&self) -> bool {
        self.waveform_type() >= EXTERNAL_CARRIER
    }
}
