use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{
    FFmpegAdapter, FFprobeAdapter, HttpFetchAdapter, ImageCodecAdapter, QuickEditConfig,
    StagingArea, TracingLogAdapter,
};
use crate::app::conversion_interactor::ConversionInteractor;
use crate::error::QuickEditResult;
use crate::ports::{FetchPort, ImageCodecPort, LogPort, ProbePort, TranscodePort};

pub trait AppContainer: Send + Sync {
    fn conversion_interactor(&self) -> Arc<ConversionInteractor>;
}

/// Production wiring: real ffmpeg, ffprobe, HTTP and image codec adapters
pub struct DefaultAppContainer {
    conversion_interactor: Arc<ConversionInteractor>,
    ffmpeg: Arc<FFmpegAdapter>,
    ffprobe: Arc<FFprobeAdapter>,
}

impl DefaultAppContainer {
    pub fn new(config: &QuickEditConfig) -> QuickEditResult<Self> {
        config.validate()?;

        let encode_timeout = config.encode_timeout_secs.map(Duration::from_secs);
        let fetch_timeout = config.fetch_timeout_secs.map(Duration::from_secs);

        let ffmpeg = Arc::new(FFmpegAdapter::new(
            &config.ffmpeg_path,
            &config.ffmpeg_log_level,
            encode_timeout,
        ));
        let ffprobe = Arc::new(FFprobeAdapter::new(&config.ffprobe_path, encode_timeout));
        let fetch_port = Arc::new(HttpFetchAdapter::new(&config.user_agent, fetch_timeout)?);
        let codec_port = Arc::new(ImageCodecAdapter::new());
        let log_port = Arc::new(TracingLogAdapter::new());
        let staging = Arc::new(StagingArea::new(&config.scratch_dir));

        let conversion_interactor = Arc::new(ConversionInteractor::new(
            fetch_port as Arc<dyn FetchPort>,
            Arc::clone(&ffprobe) as Arc<dyn ProbePort>,
            Arc::clone(&ffmpeg) as Arc<dyn TranscodePort>,
            codec_port as Arc<dyn ImageCodecPort>,
            log_port as Arc<dyn LogPort>,
            staging,
        ));

        Ok(Self {
            conversion_interactor,
            ffmpeg,
            ffprobe,
        })
    }

    /// Fail fast when either external tool cannot be run
    pub async fn verify_tools(&self) -> QuickEditResult<()> {
        self.ffmpeg.verify_available().await?;
        self.ffprobe.verify_available().await
    }
}

impl AppContainer for DefaultAppContainer {
    fn conversion_interactor(&self) -> Arc<ConversionInteractor> {
        Arc::clone(&self.conversion_interactor)
    }
}
