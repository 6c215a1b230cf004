//! Tests for the vocoder processor.

use std::f32::consts::TAU;

use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::*;
use crate::config::ProcessorConfig;
use crate::error::ConfigError;
use crate::oscillator::Waveform;

const SR: f32 = 48_000.0;

fn processor(config: ProcessorConfig) -> VocoderProcessor {
    VocoderProcessor::new(config, SR).unwrap()
}

fn sine(freq: f32, len: usize) -> Vec<f32> {
    (0..len).map(|i| (TAU * freq * i as f32 / SR).sin()).collect()
}

fn noise(seed: u64, len: usize) -> Vec<f32> {
    let mut rng = Pcg32::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn run(processor: &mut VocoderProcessor, input: &[f32], carrier: Option<&[f32]>) -> Vec<f32> {
    let mut output = vec![0.0; input.len()];
    processor.process(input, carrier, &mut output);
    output
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = ProcessorConfig {
        preamp_gain: 50.0,
        ..Default::default()
    };
    assert!(matches!(
        VocoderProcessor::new(config, SR),
        Err(ConfigError::OutOfRange {
            field: "preamp_gain",
            ..
        })
    ));
    assert!(VocoderProcessor::new(ProcessorConfig::default(), 0.0).is_err());
}

#[test]
fn test_band_layout() {
    let vocoder = processor(ProcessorConfig::default());
    assert_eq!(vocoder.band_frequencies(), BAND_FREQUENCIES);
    assert_eq!(vocoder.echo_len(), 14_400);
    assert_eq!(vocoder.sample_rate(), SR);
    assert_eq!(vocoder.config(), &ProcessorConfig::default());
}

#[test]
fn test_silent_modulator_is_silent() {
    let mut vocoder = processor(ProcessorConfig::default());
    let input = vec![0.0; 4_096];
    let carrier = noise(1, 4_096);
    let output = run(&mut vocoder, &input, Some(&carrier));
    assert!(output.iter().all(|s| *s == 0.0));
}

#[test]
fn test_tone_opens_matching_band() {
    let mut vocoder = processor(ProcessorConfig {
        intensity: 1.2,
        noise_threshold: 0.01,
        ..Default::default()
    });
    let output = run(&mut vocoder, &sine(1_000.0, 4_800), None);

    let peak = output.iter().fold(0.0f32, |a, s| a.max(s.abs()));
    assert!(peak > 0.01, "peak {}", peak);

    let envelopes = vocoder.band_envelopes();
    let loudest = envelopes
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| BAND_FREQUENCIES[i])
        .unwrap();
    assert!((840.0..=1_100.0).contains(&loudest), "loudest band {}", loudest);
}

#[test]
fn test_oscillator_advances_under_external_carrier() {
    let input = sine(500.0, 1_000);
    let external = noise(2, 1_000);

    let mut internal = processor(ProcessorConfig::default());
    let mut with_external = processor(ProcessorConfig::default());
    run(&mut internal, &input, None);
    run(&mut with_external, &input, Some(&external));

    assert!(internal.carrier_phase() > 0.0);
    assert_eq!(internal.carrier_phase(), with_external.carrier_phase());
}

#[test]
fn test_short_carrier_falls_back_to_oscillator() {
    let input = sine(1_000.0, 512);
    let mut reference = processor(ProcessorConfig::default());
    let mut partial = processor(ProcessorConfig::default());

    let expected = run(&mut reference, &input, None);
    let output = run(&mut partial, &input, Some(&[][..]));
    assert_eq!(output, expected);
}

#[test]
fn test_tremolo_only_attenuates() {
    let input = sine(1_000.0, 9_600);
    let mut plain = processor(ProcessorConfig::default());
    let mut tremolo = processor(ProcessorConfig {
        tremolo: 1.0,
        ..Default::default()
    });

    let dry = run(&mut plain, &input, None);
    let wet = run(&mut tremolo, &input, None);
    for (d, w) in dry.iter().zip(&wet) {
        assert!(w.abs() <= d.abs() + 1e-6);
    }
    assert!(wet.iter().zip(&dry).any(|(w, d)| (w - d).abs() > 1e-3));
}

#[test]
fn test_echo_starts_after_one_line_length() {
    let config = ProcessorConfig {
        echo_ms: 10.0,
        ..Default::default()
    };
    let input = sine(1_000.0, 2_400);
    let mut dry = processor(config.clone());
    let mut wet = processor(ProcessorConfig { echo: 0.7, ..config });
    let len = wet.echo_len();
    assert_eq!(len, 480);

    let a = run(&mut dry, &input, None);
    let b = run(&mut wet, &input, None);
    assert_eq!(a[..len], b[..len]);
    assert!(a[len..].iter().zip(&b[len..]).any(|(x, y)| (x - y).abs() > 1e-4));
}

#[test]
fn test_echo_off_decays_stored_tail() {
    let mut vocoder = processor(ProcessorConfig {
        echo_ms: 10.0,
        echo: 0.7,
        smoothing_ms: 0.1,
        ..Default::default()
    });
    let len = vocoder.echo_len();
    // Past the echo amount glide on either side of a switch.
    let settled = 64;

    let tone: Vec<f32> = sine(1_000.0, 3 * len).iter().map(|x| 0.05 * x).collect();
    let out = run(&mut vocoder, &tone, None);
    // The line stores the pre-clip output of the last lap.
    let tail: Vec<f64> = out[2 * len..].iter().map(|&y| f64::from(y).atanh()).collect();

    vocoder.controls().set_echo(0.0);
    let laps = 40;
    let silent = run(&mut vocoder, &vec![0.0; laps * len], None);
    assert!(silent[(laps - 1) * len..].iter().all(|&y| y == 0.0));

    vocoder.controls().set_echo(0.7);
    let echoed = run(&mut vocoder, &vec![0.0; len], None);

    let expected = 0.95f64.powi(laps as i32);
    let mut tail_sum = 0.0;
    let mut echo_sum = 0.0;
    for i in settled..len {
        let delayed = f64::from(echoed[i]).atanh() / 0.7;
        assert!(
            delayed.abs() <= expected * tail[i].abs() + 1e-4,
            "frame {}: {} vs tail {}",
            i,
            delayed,
            tail[i]
        );
        tail_sum += tail[i].abs();
        echo_sum += delayed.abs();
    }
    // Decayed rather than cleared.
    assert!(tail_sum > 0.1);
    assert!(echo_sum > 0.9 * expected * tail_sum, "{} vs {}", echo_sum, expected * tail_sum);
}

#[test]
fn test_setters_glide_rather_than_jump() {
    let input = sine(1_000.0, 2_049);
    let mut steady = processor(ProcessorConfig::default());
    let mut stepped = processor(ProcessorConfig::default());
    run(&mut steady, &input[..2_048], None);
    run(&mut stepped, &input[..2_048], None);

    stepped.controls().set_intensity(4.0);
    let a = run(&mut steady, &input[2_048..], None)[0];
    let b = run(&mut stepped, &input[2_048..], None)[0];
    // A fivefold gain step moves the next frame by well under one percent.
    assert!((a - b).abs() <= 0.01 * a.abs() + 1e-6, "{} vs {}", a, b);
}

#[test]
fn test_waveform_change_is_applied_per_block() {
    let mut vocoder = processor(ProcessorConfig::default());
    vocoder.controls().set_waveform(3);
    run(&mut vocoder, &[0.0; 4], None);
    assert_eq!(vocoder.waveform(), Waveform::Sine);

    vocoder.controls().set_waveform(4);
    run(&mut vocoder, &[0.0; 4], None);
    assert_eq!(vocoder.waveform(), Waveform::Sine);
}

#[test]
fn test_full_scale_noise_stays_bounded() {
    let mut vocoder = processor(ProcessorConfig {
        intensity: 4.0,
        echo: 0.7,
        noise_threshold: 0.005,
        ..Default::default()
    });
    let input = noise(3, 48_000);
    let output = run(&mut vocoder, &input, None);
    assert!(output.iter().all(|s| s.is_finite() && (-1.0..=1.0).contains(s)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn output_is_bounded(
        seed in any::<u64>(),
        intensity in 0.2f32..4.0,
        echo in 0.0f32..0.7,
        tremolo in 0.0f32..1.0,
        vibrato in 0.0f32..1.0,
        waveform in 0i32..4,
        external in any::<bool>(),
    ) {
        let mut vocoder = processor(ProcessorConfig {
            intensity,
            echo,
            tremolo,
            vibrato,
            waveform,
            ..Default::default()
        });
        let input = noise(seed, 2_048);
        let carrier = noise(seed.wrapping_add(1), 2_048);
        let output = run(&mut vocoder, &input, external.then_some(carrier.as_slice()));
        for s in output {
            prop_assert!((-1.0..=1.0).contains(&s));
        }
    }
}
