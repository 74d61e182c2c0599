use std::{fs, io, path::PathBuf};

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::DiagnosticsConfig;

pub const DEFAULT_LOG_FILTER: &str = "info,mixdown_core=debug";

/// Keeps the JSON log writer flushing until dropped.
pub struct TelemetryGuard {
    pub session_id: Uuid,
    pub log_file: Option<PathBuf>,
    _file_guard: Option<WorkerGuard>,
}

/// Console events go to stderr; with `log_to_file` a JSON copy lands in
/// `<log_dir>/<prefix>-<timestamp>.log`. `RUST_LOG` overrides the configured filter.
pub fn init_tracing(config: &DiagnosticsConfig) -> anyhow::Result<TelemetryGuard> {
    let session_id = Uuid::new_v4();

    let (file_layer, file_guard, log_file) = if config.log_to_file {
        fs::create_dir_all(&config.log_dir).with_context(|| {
            format!(
                "failed to create log directory: {}",
                config.log_dir.display()
            )
        })?;
        let timestamp = Utc::now().format("%Y%m%d-%H%M%S");
        let file_name = format!("{}-{timestamp}.log", config.trace_file_prefix);
        let log_file = config.log_dir.join(&file_name);
        let file_appender = tracing_appender::rolling::never(&config.log_dir, file_name);
        let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(file_writer);
        (Some(layer), Some(file_guard), Some(log_file))
    } else {
        (None, None, None)
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.rust_log_filter));
    let console_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(io::stderr);

    if let Err(error) = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        warn!(?error, "global tracing subscriber already initialized");
    } else {
        info!(%session_id, log_file = ?log_file, "tracing initialized");
    }

    Ok(TelemetryGuard {
        session_id,
        log_file,
        _file_guard: file_guard,
    })
}
