use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    diagnostics::DEFAULT_LOG_FILTER,
    export::{DEFAULT_MP3_QUALITY, EncoderSettings, ExportFormat},
};

pub const CONFIG_FILE_NAME: &str = "mixdown.config.toml";
pub const CONFIG_PATH_ENV: &str = "MIXDOWN_CONFIG_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MixConfig {
    pub inputs: InputsConfig,
    pub output: OutputConfig,
    pub export: ExportConfig,
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputsConfig {
    pub first: PathBuf,
    pub second: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub ffmpeg_binary: String,
    pub mp3_quality: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub rust_log_filter: String,
    pub log_dir: PathBuf,
    pub trace_file_prefix: String,
    pub log_to_file: bool,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            first: PathBuf::from("bonus.mp3"),
            second: PathBuf::from("siren.mp3"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("hasil_mix.mp3"),
            format: ExportFormat::Mp3,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            ffmpeg_binary: "ffmpeg".to_string(),
            mp3_quality: DEFAULT_MP3_QUALITY,
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            rust_log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_dir: PathBuf::from("logs"),
            trace_file_prefix: "mixdown".to_string(),
            log_to_file: true,
        }
    }
}

impl ExportConfig {
    #[must_use]
    pub fn encoder_settings(&self) -> EncoderSettings {
        EncoderSettings {
            ffmpeg_binary: PathBuf::from(&self.ffmpeg_binary),
            mp3_quality: self.mp3_quality,
        }
    }
}

impl MixConfig {
    /// Loads `explicit` if given, otherwise the discovered config file, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => discover_config_path()?,
        };

        match path {
            Some(path) => Self::from_file(&path),
            None => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: MixConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config TOML from {}", path.display()))?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

fn discover_config_path() -> Result<Option<PathBuf>> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Ok(Some(path));
        }
        return Err(anyhow::anyhow!(
            "{CONFIG_PATH_ENV} points at a missing file: {}",
            path.display()
        ));
    }

    let cwd = env::current_dir().context("failed to resolve current directory")?;
    let candidate = cwd.join(CONFIG_FILE_NAME);
    Ok(candidate.is_file().then_some(candidate))
}
