//! End-to-end WAV renders through the offline device.

use std::f32::consts::TAU;
use std::path::Path;

use pretty_assertions::assert_eq;
use vocodergal_cli::commands::render::{render, RenderJob, RenderParams};
use vocodergal_cli::wav;

fn write_tone(path: &Path, freq: f32, len: usize, sample_rate: u32) {
    let samples: Vec<f32> = (0..len)
        .map(|i| 0.6 * (TAU * freq * i as f32 / sample_rate as f32).sin())
        .collect();
    wav::write_mono(path, &samples, sample_rate).unwrap();
}

fn job(dir: &Path) -> RenderJob {
    RenderJob {
        modulator: dir.join("voice.wav"),
        carrier: None,
        output: dir.join("out.wav"),
        config: None,
        params: RenderParams::default(),
        frames: None,
        tail_seconds: 0.1,
    }
}

#[test]
fn renders_voice_to_float_wav() {
    let dir = tempfile::tempdir().unwrap();
    write_tone(&dir.path().join("voice.wav"), 500.0, 9_600, 48_000);

    let summary = render(&job(dir.path())).unwrap();
    assert_eq!(summary.samples, 9_600 + 4_800);
    assert!(summary.peak > 0.0 && summary.peak <= 1.0);
    assert!(summary.rms > 0.0);
    assert!(summary.vu >= 0.0);

    let out = wav::read_mono(&dir.path().join("out.wav")).unwrap();
    assert_eq!(out.sample_rate, 48_000);
    assert_eq!(out.samples.len(), summary.samples);
}

#[test]
fn external_carrier_changes_output() {
    let dir = tempfile::tempdir().unwrap();
    write_tone(&dir.path().join("voice.wav"), 500.0, 4_800, 48_000);
    write_tone(&dir.path().join("carrier.wav"), 2_000.0, 4_800, 48_000);

    let internal = job(dir.path());
    render(&internal).unwrap();
    let internal_out = wav::read_mono(&internal.output).unwrap();

    let external = RenderJob {
        carrier: Some(dir.path().join("carrier.wav")),
        output: dir.path().join("external.wav"),
        ..job(dir.path())
    };
    render(&external).unwrap();
    let external_out = wav::read_mono(&external.output).unwrap();

    assert_eq!(internal_out.samples.len(), external_out.samples.len());
    assert_ne!(internal_out.samples, external_out.samples);
}

#[test]
fn mismatched_rate_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write_tone(&dir.path().join("voice.wav"), 500.0, 4_410, 44_100);

    let err = render(&job(dir.path())).unwrap_err();
    assert!(format!("{:#}", err).contains("resample"));
    assert!(!dir.path().join("out.wav").exists());
}

#[test]
fn config_file_and_overrides_apply() {
    let dir = tempfile::tempdir().unwrap();
    write_tone(&dir.path().join("voice.wav"), 500.0, 2_000, 16_000);
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"sample_rate": 16000, "frames_per_callback": 160}"#).unwrap();

    let summary = render(&RenderJob {
        config: Some(config),
        params: RenderParams {
            pitch: Some(90.0),
            echo: Some(0.5),
            ..Default::default()
        },
        frames: Some(64),
        ..job(dir.path())
    })
    .unwrap();
    assert_eq!(summary.samples, 2_000 + 1_600);
    assert_eq!(wav::read_mono(&dir.path().join("out.wav")).unwrap().sample_rate, 16_000);
}

#[test]
fn negative_tail_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_tone(&dir.path().join("voice.wav"), 500.0, 480, 48_000);

    let result = render(&RenderJob {
        tail_seconds: -1.0,
        ..job(dir.path())
    });
    assert!(result.is_err());
}
