//! Band layout.

/// Number of analysis/synthesis bands.
pub const NUM_BANDS: usize = 20;

/// Band center frequencies in Hz.
///
/// Spans 100 Hz to 14 kHz with extra density between 1 and 5 kHz, where
/// consonants and formant detail carry intelligibility.
pub const BAND_FREQUENCIES: [f32; NUM_BANDS] = [
    100.0, 160.0, 240.0, 350.0, 480.0, 640.0, 840.0, 1_100.0, 1_400.0, 1_750.0, 2_150.0,
    2_600.0, 3_100.0, 3_700.0, 4_400.0, 5_300.0, 6_500.0, 8_000.0, 10_500.0, 14_000.0,
];

/// Highest usable center as a fraction of the sample rate.
const MAX_CENTER_RATIO: f32 = 0.45;

/// Center frequencies actually used at `sample_rate`.
///
/// Bands above `0.45 * sample_rate` are pulled down to that limit so their
/// filters stay stable below Nyquist.
pub fn band_centers(sample_rate: f32) -> [f32; NUM_BANDS] {
    let limit = sample_rate * MAX_CENTER_RATIO;
    BAND_FREQUENCIES.map(|freq| freq.min(limit))
}
