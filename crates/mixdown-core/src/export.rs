use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::clip::{AudioClip, SampleDepth};

pub const DEFAULT_MP3_QUALITY: u8 = 2;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Mp3,
    Wav,
}

impl ExportFormat {
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "mp3" => Some(Self::Mp3),
            "wav" | "wave" => Some(Self::Wav),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    pub ffmpeg_binary: PathBuf,
    /// LAME VBR quality, 0 (best) to 9.
    pub mp3_quality: u8,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            ffmpeg_binary: PathBuf::from("ffmpeg"),
            mp3_quality: DEFAULT_MP3_QUALITY,
        }
    }
}

#[instrument(skip(clip, settings), fields(path = %path.display(), format = ?format))]
pub fn export_clip(
    clip: &AudioClip,
    path: &Path,
    format: ExportFormat,
    settings: &EncoderSettings,
) -> Result<()> {
    match format {
        ExportFormat::Wav => export_wav(clip, path),
        ExportFormat::Mp3 => export_mp3(clip, path, settings),
    }
}

#[instrument(skip(clip), fields(path = %path.display(), depth = ?clip.depth()))]
pub fn export_wav(clip: &AudioClip, path: &Path) -> Result<()> {
    create_parent_dir(path, "wav")?;

    let depth = clip.depth();
    let spec = hound::WavSpec {
        channels: clip.channels(),
        sample_rate: clip.sample_rate(),
        bits_per_sample: depth.bits(),
        sample_format: if depth.is_float() {
            hound::SampleFormat::Float
        } else {
            hound::SampleFormat::Int
        },
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create wav file: {}", path.display()))?;

    for &sample in clip.samples() {
        let sample = sample.clamp(-1.0, 1.0);
        let written = match depth {
            SampleDepth::Float32 => writer.write_sample(sample),
            SampleDepth::Int16 => writer.write_sample(quantize(sample, 16) as i16),
            SampleDepth::Int24 => writer.write_sample(quantize(sample, 24)),
            SampleDepth::Int32 => writer.write_sample(quantize(sample, 32)),
        };
        written.context("failed to write wav sample")?;
    }

    writer.finalize().context("failed to finalize wav file")?;
    info!(frames = clip.frames(), "wav export completed");
    Ok(())
}

#[instrument(skip(clip, settings), fields(path = %path.display(), ffmpeg = %settings.ffmpeg_binary.display()))]
pub fn export_mp3(clip: &AudioClip, path: &Path, settings: &EncoderSettings) -> Result<()> {
    create_parent_dir(path, "mp3")?;

    let temp_dir = tempfile::tempdir().context("failed to create temporary export directory")?;
    let temp_wav = temp_dir.path().join("mixdown_export.wav");
    export_wav(clip, &temp_wav)?;

    let input_arg = ffmpeg_path_arg(&temp_wav, "temporary wav")?;
    let output_arg = ffmpeg_path_arg(path, "mp3 output")?;
    let quality = settings.mp3_quality.min(9).to_string();
    let output = Command::new(&settings.ffmpeg_binary)
        .args([
            "-y",
            "-hide_banner",
            "-loglevel",
            "error",
            "-i",
            input_arg.as_str(),
            "-codec:a",
            "libmp3lame",
            "-qscale:a",
            quality.as_str(),
            output_arg.as_str(),
        ])
        .output()
        .with_context(|| {
            format!(
                "failed to spawn ffmpeg: {}",
                settings.ffmpeg_binary.display()
            )
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow::anyhow!(
            "ffmpeg exited with status {} while exporting mp3: {}",
            output.status,
            stderr.trim()
        ));
    }

    info!(frames = clip.frames(), "mp3 export completed");
    Ok(())
}

fn create_parent_dir(path: &Path, label: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            format!(
                "failed to create {label} output directory: {}",
                parent.display()
            )
        })?;
        debug!(directory = %parent.display(), "output directory ready");
    }
    Ok(())
}

/// Path as an ffmpeg argument; a leading `-` would otherwise be parsed as an option.
fn ffmpeg_path_arg(path: &Path, label: &str) -> Result<String> {
    let text = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("invalid {label} path: {}", path.display()))?;
    if text.starts_with('-') {
        Ok(format!("./{text}"))
    } else {
        Ok(text.to_string())
    }
}

fn quantize(sample: f32, bits: u32) -> i32 {
    let full_scale = f64::from((1_u32 << (bits - 1)) - 1);
    (f64::from(sample) * full_scale).round() as i32
}
