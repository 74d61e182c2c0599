use std::{f32::consts::TAU, path::Path};

use anyhow::{Context, Result};

use crate::clip::{AudioClip, ClipError, ClipFormat};

/// Sine tone at `frequency_hz`, identical on every channel.
pub fn tone_clip(
    format: ClipFormat,
    frequency_hz: f32,
    amplitude: f32,
    seconds: f64,
) -> Result<AudioClip, ClipError> {
    let frames = format.frames_for_seconds(seconds);
    let channels = usize::from(format.channels);
    let mut samples = Vec::with_capacity(frames * channels);
    for frame in 0..frames {
        let phase = frame as f32 / format.sample_rate as f32 * frequency_hz * TAU;
        let value = phase.sin() * amplitude;
        samples.extend(std::iter::repeat_n(value, channels));
    }
    AudioClip::new(format, samples)
}

/// Writes a 16-bit PCM sine tone to `path`.
pub fn write_tone_wav(
    path: &Path,
    sample_rate: u32,
    channels: u16,
    frequency_hz: f32,
    seconds: f32,
) -> Result<()> {
    let frame_count = (seconds * sample_rate as f32).round() as usize;
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create fixture wav: {}", path.display()))?;
    for frame in 0..frame_count {
        let phase = frame as f32 / sample_rate as f32 * frequency_hz * TAU;
        let sample = (phase.sin() * 0.4 * f32::from(i16::MAX)).round() as i16;
        for _ in 0..channels {
            writer
                .write_sample(sample)
                .context("failed to write fixture sample")?;
        }
    }
    writer.finalize().context("failed to finalize fixture wav")?;
    Ok(())
}
