use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::clip::{AudioClip, ClipError};

/// Which clip received trailing silence, and how many frames of it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "clip", content = "frames", rename_all = "snake_case")]
pub enum Padding {
    None,
    First(usize),
    Second(usize),
}

/// Appends silence to `clip` until it lasts `target_seconds`. Returns the frames added.
///
/// Clips already at or beyond the target are left untouched.
pub fn pad_to_duration(clip: &mut AudioClip, target_seconds: f64) -> Result<usize, ClipError> {
    let target_frames = clip.format().frames_for_seconds(target_seconds);
    let missing = target_frames.saturating_sub(clip.frames());
    if missing == 0 {
        return Ok(0);
    }

    let silence = AudioClip::silent_frames(clip.format(), missing)?;
    clip.append(&silence)?;
    Ok(missing)
}

/// Pads the shorter of two clips with silence so both end together.
///
/// Both clips must share a sample rate, otherwise whole-frame padding cannot make them equal.
#[instrument(skip(first, second), fields(
    first_ms = first.duration_ms(),
    second_ms = second.duration_ms()
))]
pub fn equalize_durations(
    first: &mut AudioClip,
    second: &mut AudioClip,
) -> Result<Padding, ClipError> {
    if first.sample_rate() != second.sample_rate() {
        return Err(ClipError::SampleRateMismatch {
            first: first.sample_rate(),
            second: second.sample_rate(),
        });
    }

    let first_seconds = first.duration_seconds();
    let second_seconds = second.duration_seconds();

    let padding = if first_seconds < second_seconds {
        Padding::First(pad_to_duration(first, second_seconds)?)
    } else if second_seconds < first_seconds {
        Padding::Second(pad_to_duration(second, first_seconds)?)
    } else {
        Padding::None
    };

    debug!(?padding, duration_ms = first.duration_ms(), "durations equalized");
    Ok(padding)
}
