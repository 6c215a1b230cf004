//! Wavetable oscillator.
//!
//! Four single-cycle tables are computed once at construction; `process()`
//! only indexes into them, which keeps the per-sample cost constant and free
//! of transcendental calls.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

/// Length of each wavetable. A power of two so wrapping is a mask.
pub const TABLE_SIZE: usize = 2048;

/// Oscillator waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    /// Sawtooth, `2·phase − 1`. Rich in harmonics, the classic vocoder carrier.
    #[default]
    Sawtooth,
    /// Square, `+1` for the first half cycle and `−1` for the second.
    Square,
    /// Triangle, `4·|phase − 0.5| − 1`.
    Triangle,
    /// Sine, `sin(2π·phase)`.
    Sine,
}

impl Waveform {
    /// All waveforms in selector order.
    pub const ALL: [Waveform; 4] = [
        Waveform::Sawtooth,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Sine,
    ];

    /// Maps a selector value (0-3) to a waveform.
    ///
    /// Returns `None` for anything else, including the values the engine
    /// reserves for external-carrier mode.
    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Selector value of this waveform.
    pub fn index(self) -> usize {
        match self {
            Waveform::Sawtooth => 0,
            Waveform::Square => 1,
            Waveform::Triangle => 2,
            Waveform::Sine => 3,
        }
    }

    /// Evaluates the waveform at a phase in `[0, 1)`.
    pub fn evaluate(self, phase: f32) -> f32 {
        match self {
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 4.0 * (phase - 0.5).abs() - 1.0,
            Waveform::Sine => (TAU * phase).sin(),
        }
    }
}

/// Precomputed single-cycle tables, one per [`Waveform`].
#[derive(Debug, Clone)]
struct Wavetables {
    tables: [[f32; TABLE_SIZE]; 4],
}

impl Wavetables {
    fn generate() -> Box<Self> {
        let mut tables = Box::new(Self {
            tables: [[0.0; TABLE_SIZE]; 4],
        });
        for waveform in Waveform::ALL {
            let table = &mut tables.tables[waveform.index()];
            for (i, slot) in table.iter_mut().enumerate() {
                *slot = waveform.evaluate(i as f32 / TABLE_SIZE as f32);
            }
        }
        tables
    }
}

/// Phase-accumulating wavetable oscillator.
#[derive(Debug, Clone)]
pub struct Oscillator {
    tables: Box<Wavetables>,
    sample_rate: f32,
    frequency: f32,
    phase: f32,
    waveform: Waveform,
}

impl Oscillator {
    /// Default frequency in Hz.
    pub const DEFAULT_FREQUENCY: f32 = 140.0;

    /// Creates a sawtooth oscillator at 140 Hz.
    ///
    /// Allocates the wavetables; call from a non-realtime context.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            tables: Wavetables::generate(),
            sample_rate,
            frequency: Self::DEFAULT_FREQUENCY,
            phase: 0.0,
            waveform: Waveform::Sawtooth,
        }
    }

    /// Builder-style constructor for LFO use.
    pub fn with(sample_rate: f32, waveform: Waveform, frequency: f32) -> Self {
        let mut osc = Self::new(sample_rate);
        osc.set_waveform(waveform);
        osc.set_frequency(frequency);
        osc
    }

    /// Sets the frequency in Hz. Unconstrained.
    #[inline]
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    /// Sets the waveform. Takes effect on the next sample; phase is kept.
    #[inline]
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Current waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Current phase in `[0, 1)`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Returns the table sample at the current phase, then advances the phase.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let index = (self.phase * TABLE_SIZE as f32) as usize & (TABLE_SIZE - 1);
        let sample = self.tables.tables[self.waveform.index()][index];

        self.phase = (self.phase + self.frequency / self.sample_rate).rem_euclid(1.0);
        // rem_euclid can round a tiny negative remainder up to exactly 1.0
        if !(self.phase < 1.0) {
            self.phase = 0.0;
        }

        sample
    }
}
