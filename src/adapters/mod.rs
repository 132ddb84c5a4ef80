// Adapters - External system implementations

pub mod codec_image;
pub mod exec_ffmpeg;
pub mod fetch_http;
pub mod fs_staging;
pub mod probe_ffprobe;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use codec_image::ImageCodecAdapter;
pub use exec_ffmpeg::FFmpegAdapter;
pub use fetch_http::HttpFetchAdapter;
pub use fs_staging::{StagingArea, StagingFile};
pub use probe_ffprobe::FFprobeAdapter;
pub use toml_config::{QuickEditConfig, TomlConfigAdapter};
pub use tracing_log::TracingLogAdapter;
