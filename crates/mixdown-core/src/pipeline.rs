use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use crate::{
    clip::{AudioClip, ClipFormat},
    conform::conform_to,
    equalize::{Padding, equalize_durations},
    export::{EncoderSettings, ExportFormat, export_clip},
    loader::load_clip,
    mixer::overlay,
};

const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct MixRequest {
    pub first: PathBuf,
    pub second: PathBuf,
    pub output: PathBuf,
    pub format: ExportFormat,
    pub encoder: EncoderSettings,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MixSummary {
    pub first_duration_seconds: f64,
    pub second_duration_seconds: f64,
    pub output_duration_seconds: f64,
    pub output_format: ClipFormat,
    pub padding: Padding,
    pub clipped_samples: usize,
    pub peak: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MixReport {
    pub schema_version: u32,
    pub first_path: String,
    pub second_path: String,
    pub output_path: String,
    pub export_format: ExportFormat,
    pub summary: MixSummary,
    pub output_sha256: String,
}

/// Conforms `second` to `first`, pads the shorter one with silence, then overlays them.
#[instrument(skip(first, second))]
pub fn mix_clips(mut first: AudioClip, second: AudioClip) -> Result<(AudioClip, MixSummary)> {
    let first_duration_seconds = first.duration_seconds();
    let second_duration_seconds = second.duration_seconds();

    let mut second = conform_to(second, first.format())?;
    let padding = equalize_durations(&mut first, &mut second)?;
    let mixed = overlay(&first, &second)?;

    let summary = MixSummary {
        first_duration_seconds,
        second_duration_seconds,
        output_duration_seconds: mixed.clip.duration_seconds(),
        output_format: mixed.clip.format(),
        padding,
        clipped_samples: mixed.clipped_samples,
        peak: mixed.clip.peak(),
    };
    Ok((mixed.clip, summary))
}

#[instrument(skip(request), fields(
    first = %request.first.display(),
    second = %request.second.display(),
    output = %request.output.display(),
    format = ?request.format
))]
pub fn mix_files(request: &MixRequest) -> Result<MixReport> {
    let first = load_clip(&request.first)?;
    let second = load_clip(&request.second)?;
    let (mixed, summary) = mix_clips(first, second)?;

    export_clip(&mixed, &request.output, request.format, &request.encoder)?;
    let output_bytes = fs::read(&request.output).with_context(|| {
        format!(
            "failed to read exported mix: {}",
            request.output.display()
        )
    })?;

    info!(
        duration_ms = mixed.duration_ms(),
        padding = ?summary.padding,
        clipped_samples = summary.clipped_samples,
        "mix written"
    );

    Ok(MixReport {
        schema_version: REPORT_SCHEMA_VERSION,
        first_path: request.first.display().to_string(),
        second_path: request.second.display().to_string(),
        output_path: request.output.display().to_string(),
        export_format: request.format,
        summary,
        output_sha256: hash_hex(&output_bytes),
    })
}

pub fn read_report(path: &Path) -> Result<MixReport> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read mix report: {}", path.display()))?;
    let report: MixReport =
        serde_json::from_slice(&bytes).context("failed to parse mix report json")?;
    Ok(report)
}

pub fn write_report(path: &Path, report: &MixReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create report directory: {}", parent.display()))?;
    }

    let json = serde_json::to_vec_pretty(report).context("failed to encode mix report json")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write mix report: {}", path.display()))?;
    Ok(())
}

fn hash_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}
