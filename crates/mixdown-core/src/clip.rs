use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_CHANNELS: u16 = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SampleDepth {
    Int16,
    Int24,
    Int32,
    Float32,
}

impl SampleDepth {
    #[must_use]
    pub fn bits(self) -> u16 {
        match self {
            Self::Int16 => 16,
            Self::Int24 => 24,
            Self::Int32 | Self::Float32 => 32,
        }
    }

    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClipFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub depth: SampleDepth,
}

impl ClipFormat {
    #[must_use]
    pub fn new(sample_rate: u32, channels: u16, depth: SampleDepth) -> Self {
        Self {
            sample_rate,
            channels,
            depth,
        }
    }

    /// Rate and channel layout match; depth may differ.
    #[must_use]
    pub fn is_layout_compatible(&self, other: &Self) -> bool {
        self.sample_rate == other.sample_rate && self.channels == other.channels
    }

    #[must_use]
    pub fn frames_for_seconds(&self, seconds: f64) -> usize {
        if seconds <= 0.0 {
            return 0;
        }
        (seconds * f64::from(self.sample_rate)).round() as usize
    }
}

impl Default for ClipFormat {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE, DEFAULT_CHANNELS, SampleDepth::Int16)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClipError {
    #[error("invalid clip format: {0}")]
    InvalidFormat(String),
    #[error("sample count {samples} is not a multiple of {channels} channels")]
    RaggedFrames { samples: usize, channels: u16 },
    #[error("sample rates differ: {first} Hz vs {second} Hz")]
    SampleRateMismatch { first: u32, second: u32 },
    #[error("channel counts differ: {first} vs {second}")]
    ChannelMismatch { first: u16, second: u16 },
    #[error("clip lengths differ: {first} frames vs {second} frames")]
    LengthMismatch { first: usize, second: usize },
}

/// Decoded audio held as interleaved `f32` samples in `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    format: ClipFormat,
    samples: Vec<f32>,
}

impl AudioClip {
    pub fn new(format: ClipFormat, samples: Vec<f32>) -> Result<Self, ClipError> {
        if format.sample_rate == 0 {
            return Err(ClipError::InvalidFormat(
                "sample rate must be greater than zero".to_string(),
            ));
        }
        if format.channels == 0 {
            return Err(ClipError::InvalidFormat(
                "channel count must be greater than zero".to_string(),
            ));
        }
        if samples.len() % usize::from(format.channels) != 0 {
            return Err(ClipError::RaggedFrames {
                samples: samples.len(),
                channels: format.channels,
            });
        }

        Ok(Self { format, samples })
    }

    pub fn silent_frames(format: ClipFormat, frames: usize) -> Result<Self, ClipError> {
        let sample_count = frames.saturating_mul(usize::from(format.channels));
        Self::new(format, vec![0.0; sample_count])
    }

    pub fn silent(format: ClipFormat, duration: Duration) -> Result<Self, ClipError> {
        let frames = format.frames_for_seconds(duration.as_secs_f64());
        Self::silent_frames(format, frames)
    }

    #[must_use]
    pub fn format(&self) -> ClipFormat {
        self.format
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.format.sample_rate
    }

    #[must_use]
    pub fn channels(&self) -> u16 {
        self.format.channels
    }

    #[must_use]
    pub fn depth(&self) -> SampleDepth {
        self.format.depth
    }

    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[must_use]
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.format.channels)
    }

    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / f64::from(self.format.sample_rate)
    }

    /// Whole milliseconds, rounded to nearest.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        (self.duration_seconds() * 1_000.0).round() as u64
    }

    #[must_use]
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .copied()
            .map(f32::abs)
            .fold(0.0_f32, f32::max)
    }

    /// Peak absolute amplitude of the frames in `start..end`, clamped to the clip.
    #[must_use]
    pub fn peak_in_frames(&self, start: usize, end: usize) -> f32 {
        let channels = usize::from(self.format.channels);
        let end = end.min(self.frames());
        let start = start.min(end);
        self.samples[start * channels..end * channels]
            .iter()
            .copied()
            .map(f32::abs)
            .fold(0.0_f32, f32::max)
    }

    #[must_use]
    pub fn with_depth(mut self, depth: SampleDepth) -> Self {
        self.format.depth = depth;
        self
    }

    pub fn append(&mut self, other: &Self) -> Result<(), ClipError> {
        if self.format.sample_rate != other.format.sample_rate {
            return Err(ClipError::SampleRateMismatch {
                first: self.format.sample_rate,
                second: other.format.sample_rate,
            });
        }
        if self.format.channels != other.format.channels {
            return Err(ClipError::ChannelMismatch {
                first: self.format.channels,
                second: other.format.channels,
            });
        }

        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo() -> ClipFormat {
        ClipFormat::new(48_000, 2, SampleDepth::Int16)
    }

    #[test]
    fn rejects_ragged_sample_counts() {
        let error = AudioClip::new(stereo(), vec![0.0; 3]).expect_err("3 samples is not stereo");
        assert_eq!(
            error,
            ClipError::RaggedFrames {
                samples: 3,
                channels: 2
            }
        );
    }

    #[test]
    fn rejects_zero_rate_and_zero_channels() {
        let zero_rate = ClipFormat::new(0, 2, SampleDepth::Int16);
        assert!(AudioClip::new(zero_rate, Vec::new()).is_err());
        let zero_channels = ClipFormat::new(48_000, 0, SampleDepth::Int16);
        assert!(AudioClip::new(zero_channels, Vec::new()).is_err());
    }

    #[test]
    fn silence_has_requested_duration_and_no_energy() {
        let clip = AudioClip::silent(stereo(), Duration::from_millis(1_500))
            .expect("silence should build");
        assert_eq!(clip.frames(), 72_000);
        assert_eq!(clip.duration_ms(), 1_500);
        assert_eq!(clip.peak(), 0.0);
        assert_eq!(clip.format(), stereo());
    }

    #[test]
    fn append_extends_duration() {
        let mut clip = AudioClip::new(stereo(), vec![0.5; 96_000]).expect("clip should build");
        let tail = AudioClip::silent_frames(stereo(), 24_000).expect("silence should build");
        clip.append(&tail).expect("append should succeed");
        assert_eq!(clip.frames(), 72_000);
        assert!((clip.duration_seconds() - 1.5).abs() < f64::EPSILON);
        assert_eq!(clip.peak_in_frames(48_000, 72_000), 0.0);
        assert_eq!(clip.peak_in_frames(0, 48_000), 0.5);
    }

    #[test]
    fn append_refuses_mismatched_layouts() {
        let mut clip = AudioClip::silent_frames(stereo(), 10).expect("silence should build");
        let mono = AudioClip::silent_frames(ClipFormat::new(48_000, 1, SampleDepth::Int16), 10)
            .expect("silence should build");
        assert_eq!(
            clip.append(&mono),
            Err(ClipError::ChannelMismatch {
                first: 2,
                second: 1
            })
        );
    }
}
