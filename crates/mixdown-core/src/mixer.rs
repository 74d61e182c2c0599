use tracing::{debug, instrument, warn};

use crate::clip::{AudioClip, ClipError};

#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub clip: AudioClip,
    /// Samples whose sum left `[-1.0, 1.0]` and were clamped.
    pub clipped_samples: usize,
}

/// Sums two equal-length clips sample by sample in the first clip's format.
///
/// Sums outside full scale are hard-clipped to `[-1.0, 1.0]`; nothing is normalized.
#[instrument(skip(first, second), fields(
    frames = first.frames(),
    sample_rate = first.sample_rate(),
    channels = first.channels()
))]
pub fn overlay(first: &AudioClip, second: &AudioClip) -> Result<Overlay, ClipError> {
    if first.sample_rate() != second.sample_rate() {
        return Err(ClipError::SampleRateMismatch {
            first: first.sample_rate(),
            second: second.sample_rate(),
        });
    }
    if first.channels() != second.channels() {
        return Err(ClipError::ChannelMismatch {
            first: first.channels(),
            second: second.channels(),
        });
    }
    if first.frames() != second.frames() {
        return Err(ClipError::LengthMismatch {
            first: first.frames(),
            second: second.frames(),
        });
    }

    let mut clipped_samples = 0_usize;
    let mixed: Vec<f32> = first
        .samples()
        .iter()
        .zip(second.samples())
        .map(|(left, right)| {
            let sum = left + right;
            if sum.abs() > 1.0 {
                clipped_samples += 1;
            }
            sum.clamp(-1.0, 1.0)
        })
        .collect();

    if clipped_samples > 0 {
        warn!(clipped_samples, "overlay exceeded full scale, samples clipped");
    }
    let clip = AudioClip::new(first.format(), mixed)?;
    debug!(peak = clip.peak(), "overlay complete");

    Ok(Overlay {
        clip,
        clipped_samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{ClipFormat, SampleDepth};

    fn mono(samples: Vec<f32>) -> AudioClip {
        AudioClip::new(ClipFormat::new(8_000, 1, SampleDepth::Int16), samples)
            .expect("clip should build")
    }

    #[test]
    fn sums_position_wise() {
        let mixed = overlay(&mono(vec![0.25, -0.5, 0.0]), &mono(vec![0.25, 0.25, -0.125]))
            .expect("overlay should succeed");
        assert_eq!(mixed.clip.samples(), &[0.5, -0.25, -0.125]);
        assert_eq!(mixed.clipped_samples, 0);
    }

    #[test]
    fn keeps_first_clip_depth() {
        let first = mono(vec![0.0; 4]).with_depth(SampleDepth::Int24);
        let second = mono(vec![0.0; 4]).with_depth(SampleDepth::Float32);
        let mixed = overlay(&first, &second).expect("overlay should succeed");
        assert_eq!(mixed.clip.depth(), SampleDepth::Int24);
    }

    #[test]
    fn rejects_unequal_lengths() {
        let error = overlay(&mono(vec![0.0; 3]), &mono(vec![0.0; 5])).expect_err("should fail");
        assert_eq!(
            error,
            ClipError::LengthMismatch {
                first: 3,
                second: 5
            }
        );
    }

    #[test]
    fn rejects_unequal_rates() {
        let other_rate = AudioClip::new(ClipFormat::new(16_000, 1, SampleDepth::Int16), vec![0.0])
            .expect("clip should build");
        assert!(matches!(
            overlay(&mono(vec![0.0]), &other_rate),
            Err(ClipError::SampleRateMismatch { .. })
        ));
    }
}
