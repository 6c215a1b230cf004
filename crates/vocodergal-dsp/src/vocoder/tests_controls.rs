//! Tests for the shared parameter block.

use pretty_assertions::assert_eq;

use super::*;
use crate::config::ProcessorConfig;
use crate::Waveform;

#[test]
fn test_initial_values_come_from_config() {
    let controls = ProcessorControls::new(&ProcessorConfig::default());
    assert_eq!(controls.pitch(), 140.0);
    assert_eq!(controls.intensity(), 0.8);
    assert_eq!(controls.noise_threshold(), 0.005);
    assert_eq!(controls.echo(), 0.0);
    assert_eq!(controls.waveform(), Waveform::Sawtooth);
}

#[test]
fn test_setters_clamp() {
    let controls = ProcessorControls::default();

    controls.set_pitch(1_000.0);
    assert_eq!(controls.pitch(), 400.0);
    controls.set_pitch(10.0);
    assert_eq!(controls.pitch(), 50.0);

    controls.set_intensity(0.0);
    assert_eq!(controls.intensity(), 0.2);
    controls.set_intensity(9.0);
    assert_eq!(controls.intensity(), 4.0);

    controls.set_vibrato(-1.0);
    assert_eq!(controls.vibrato(), 0.0);
    controls.set_tremolo(2.0);
    assert_eq!(controls.tremolo(), 1.0);

    controls.set_echo(1.0);
    assert_eq!(controls.echo(), 0.7);

    controls.set_noise_threshold(0.0);
    assert_eq!(controls.noise_threshold(), 0.005);
    controls.set_noise_threshold(1.0);
    assert_eq!(controls.noise_threshold(), 0.2);
}

#[test]
fn test_initial_values_are_clamped() {
    let controls = ProcessorControls::new(&ProcessorConfig {
        pitch: 5_000.0,
        noise_threshold: 0.003,
        ..Default::default()
    });
    assert_eq!(controls.pitch(), 400.0);
    assert_eq!(controls.noise_threshold(), 0.005);
}

#[test]
fn test_nan_is_ignored() {
    let controls = ProcessorControls::default();
    controls.set_pitch(220.0);
    controls.set_pitch(f32::NAN);
    assert_eq!(controls.pitch(), 220.0);
}

#[test]
fn test_waveform_selector() {
    let controls = ProcessorControls::default();
    controls.set_waveform(2);
    assert_eq!(controls.waveform(), Waveform::Triangle);
    // External carrier and invalid selectors leave the oscillator alone.
    controls.set_waveform(4);
    controls.set_waveform(-1);
    assert_eq!(controls.waveform(), Waveform::Triangle);
}

#[test]
fn test_clones_share_state() {
    let controls = ProcessorControls::default();
    let remote = controls.clone();
    std::thread::spawn(move || remote.set_echo(0.5))
        .join()
        .unwrap();
    assert_eq!(controls.echo(), 0.5);
}
