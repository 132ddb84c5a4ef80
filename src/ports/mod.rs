// Ports - Interface definitions (contracts)

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for retrieving a remote attachment
#[async_trait]
pub trait FetchPort: Send + Sync {
    /// Stream `url` into `destination`, returning the number of bytes written.
    /// Single attempt, no retry.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, ConversionError>;
}

/// Port for media metadata probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Total duration of the media at `file_path`
    async fn probe_duration(&self, file_path: &Path) -> Result<Duration, ConversionError>;
}

/// Port for the external transcoding tool
#[async_trait]
pub trait TranscodePort: Send + Sync {
    /// Run one transcoder invocation for `job`
    async fn transcode(&self, job: &TranscodeJob) -> Result<(), ConversionError>;
}

/// Port for the bundled still-image codec library
#[async_trait]
pub trait ImageCodecPort: Send + Sync {
    /// Decode `input` and re-encode it to `output` with the encoder for `format`.
    /// `quality` applies to JPEG only.
    async fn encode_still(
        &self,
        input: &Path,
        output: &Path,
        format: StillFormat,
        quality: Option<u8>,
    ) -> Result<(), ConversionError>;
}

/// Port for logging and observability
#[async_trait]
pub trait LogPort: Send + Sync {
    /// Log info message
    async fn info(&self, message: &str);

    /// Log warning message
    async fn warn(&self, message: &str);

    /// Log error message
    async fn error(&self, message: &str);

    /// Log debug message
    async fn debug(&self, message: &str);
}
