use std::process::{Command, Stdio};

use mixdown_core::{
    ClipFormat, ExportFormat, SampleDepth, export::EncoderSettings, export_clip,
    fixtures::tone_clip, load_clip,
};
use tempfile::tempdir;

fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

#[test]
fn wav_round_trip_preserves_format_and_duration() {
    let temp = tempdir().expect("tempdir should be creatable");

    for depth in [
        SampleDepth::Int16,
        SampleDepth::Int24,
        SampleDepth::Int32,
        SampleDepth::Float32,
    ] {
        let format = ClipFormat::new(44_100, 2, depth);
        let clip = tone_clip(format, 440.0, 0.5, 1.25).expect("tone should build");
        let path = temp.path().join(format!("tone-{}.wav", depth.bits()));

        export_clip(&clip, &path, ExportFormat::Wav, &EncoderSettings::default())
            .expect("wav export should succeed");
        let reloaded = load_clip(&path).expect("wav should decode");

        assert_eq!(reloaded.format(), format, "depth {depth:?}");
        assert_eq!(reloaded.frames(), clip.frames());
        assert!((reloaded.peak() - clip.peak()).abs() < 1e-3);
    }
}

#[test]
fn mp3_round_trip_keeps_duration_within_codec_tolerance() {
    if !ffmpeg_available() {
        eprintln!("ffmpeg not on PATH, skipping mp3 round trip");
        return;
    }

    let temp = tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("nested").join("hasil_mix.mp3");
    let clip = tone_clip(ClipFormat::new(44_100, 2, SampleDepth::Int16), 330.0, 0.5, 5.0)
        .expect("tone should build");

    export_clip(&clip, &path, ExportFormat::Mp3, &EncoderSettings::default())
        .expect("mp3 export should succeed");
    let reloaded = load_clip(&path).expect("mp3 should decode");

    assert_eq!(reloaded.sample_rate(), 44_100);
    assert_eq!(reloaded.channels(), 2);
    assert!(
        (reloaded.duration_seconds() - clip.duration_seconds()).abs() < 0.1,
        "decoded {} s",
        reloaded.duration_seconds()
    );
    assert!(reloaded.peak() > 0.3);
}
