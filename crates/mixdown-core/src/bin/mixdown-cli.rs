use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use mixdown_core::{
    ExportFormat, MixConfig, MixRequest, diagnostics::init_tracing, mix_files,
    pipeline::write_report,
};

#[derive(Debug, Parser)]
#[command(name = "mixdown-cli")]
#[command(about = "Overlay two audio files, padding the shorter one with silence")]
struct Cli {
    /// Config file; defaults to $MIXDOWN_CONFIG_PATH or ./mixdown.config.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    first: Option<PathBuf>,

    #[arg(long)]
    second: Option<PathBuf>,

    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Write a JSON mix report here.
    #[arg(long)]
    report: Option<PathBuf>,

    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, ValueEnum)]
enum FormatArg {
    Mp3,
    Wav,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Mp3 => Self::Mp3,
            FormatArg::Wav => Self::Wav,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = MixConfig::load(cli.config.as_deref())?;
    if let Some(log_dir) = cli.log_dir {
        config.diagnostics.log_dir = log_dir;
    }
    let _telemetry = init_tracing(&config.diagnostics)?;

    let output = cli.output.unwrap_or(config.output.path);
    // --format, then the output extension, then the configured format.
    let format = cli
        .format
        .map(ExportFormat::from)
        .or_else(|| ExportFormat::from_path(&output))
        .unwrap_or(config.output.format);

    let request = MixRequest {
        first: cli.first.unwrap_or(config.inputs.first),
        second: cli.second.unwrap_or(config.inputs.second),
        output,
        format,
        encoder: config.export.encoder_settings(),
    };

    let report = mix_files(&request)?;
    if let Some(path) = cli.report {
        write_report(&path, &report)?;
        tracing::info!(path = %path.display(), "mix report written");
    }

    Ok(())
}
