pub mod clip;
pub mod config;
pub mod conform;
pub mod diagnostics;
pub mod equalize;
pub mod export;
pub mod fixtures;
pub mod loader;
pub mod mixer;
pub mod pipeline;

pub use clip::{AudioClip, ClipError, ClipFormat, SampleDepth};
pub use config::MixConfig;
pub use diagnostics::{TelemetryGuard, init_tracing};
pub use equalize::{Padding, equalize_durations, pad_to_duration};
pub use export::{EncoderSettings, ExportFormat, export_clip};
pub use loader::load_clip;
pub use mixer::{Overlay, overlay};
pub use pipeline::{MixReport, MixRequest, MixSummary, mix_clips, mix_files};
