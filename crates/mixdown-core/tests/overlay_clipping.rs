use mixdown_core::{AudioClip, ClipFormat, SampleDepth, export::export_wav, load_clip, overlay};
use tempfile::tempdir;

fn clip(depth: SampleDepth, samples: Vec<f32>) -> AudioClip {
    AudioClip::new(ClipFormat::new(48_000, 2, depth), samples).expect("clip should build")
}

#[test]
fn sums_beyond_full_scale_are_hard_clipped() {
    let first = clip(SampleDepth::Int16, vec![0.75, -0.75, 0.5, 0.0]);
    let second = clip(SampleDepth::Int16, vec![0.75, -0.75, 0.25, 0.0]);

    let mixed = overlay(&first, &second).expect("overlay should succeed");
    assert_eq!(mixed.clip.samples(), &[1.0, -1.0, 0.75, 0.0]);
    assert_eq!(mixed.clipped_samples, 2);
}

#[test]
fn sums_exactly_at_full_scale_are_not_counted() {
    let first = clip(SampleDepth::Float32, vec![0.5, -0.5]);
    let second = clip(SampleDepth::Float32, vec![0.5, -0.5]);

    let mixed = overlay(&first, &second).expect("overlay should succeed");
    assert_eq!(mixed.clip.samples(), &[1.0, -1.0]);
    assert_eq!(mixed.clipped_samples, 0);
}

#[test]
fn clipped_mix_exports_at_integer_full_scale() {
    let temp = tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("clipped.wav");
    let first = clip(SampleDepth::Int16, vec![0.9; 8]);
    let second = clip(SampleDepth::Int16, vec![0.9; 8]);

    let mixed = overlay(&first, &second).expect("overlay should succeed");
    export_wav(&mixed.clip, &path).expect("export should succeed");

    let mut reader = hound::WavReader::open(&path).expect("wav should open");
    let samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<Result<_, _>>()
        .expect("samples should read");
    assert_eq!(samples, vec![i16::MAX; 8]);

    let reloaded = load_clip(&path).expect("clipped wav should decode");
    assert!(reloaded.peak() > 0.999);
}
