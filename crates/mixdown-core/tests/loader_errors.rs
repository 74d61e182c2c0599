use mixdown_core::load_clip;
use tempfile::tempdir;

#[test]
fn non_audio_file_is_rejected() {
    let temp = tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("notes.mp3");
    std::fs::write(&path, "definitely not audio").expect("file should be writable");

    let error = load_clip(&path).expect_err("text should not decode");
    assert!(format!("{error:#}").contains("notes.mp3"));
}

#[test]
fn wav_without_samples_is_rejected() {
    let temp = tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("empty.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 48_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    hound::WavWriter::create(&path, spec)
        .expect("wav should be creatable")
        .finalize()
        .expect("wav should finalize");

    assert!(load_clip(&path).is_err());
}

#[test]
fn stereo_wav_keeps_its_channels() {
    let temp = tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("stereo.wav");
    mixdown_core::fixtures::write_tone_wav(&path, 32_000, 2, 440.0, 0.5)
        .expect("fixture should write");

    let clip = load_clip(&path).expect("stereo should decode");
    assert_eq!(clip.channels(), 2);
    assert_eq!(clip.sample_rate(), 32_000);
    assert_eq!(clip.frames(), 16_000);
    assert_eq!(clip.duration_ms(), 500);
}
