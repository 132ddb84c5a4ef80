// Conversion interactor - Orchestrates the convert, trim and jpegify use cases

use std::path::Path;
use std::sync::Arc;

use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::adapters::fs_staging::StagingArea;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Extension of every trim output
const TRIM_OUTPUT_FORMAT: OutputFormat = OutputFormat::Mp4;

/// Per-request workflow driving fetch, probe, encode and delivery
///
/// Stateless between requests; one instance serves any number of concurrent
/// calls. Every staging file acquired by a request is owned by that request
/// and removed before it answers, whichever way it answers.
pub struct ConversionInteractor {
    fetch_port: Arc<dyn FetchPort>,
    probe_port: Arc<dyn ProbePort>,
    transcode_port: Arc<dyn TranscodePort>,
    codec_port: Arc<dyn ImageCodecPort>,
    log_port: Arc<dyn LogPort>,
    staging: Arc<StagingArea>,
}

impl ConversionInteractor {
    /// Create new conversion interactor with injected ports
    pub fn new(
        fetch_port: Arc<dyn FetchPort>,
        probe_port: Arc<dyn ProbePort>,
        transcode_port: Arc<dyn TranscodePort>,
        codec_port: Arc<dyn ImageCodecPort>,
        log_port: Arc<dyn LogPort>,
        staging: Arc<StagingArea>,
    ) -> Self {
        Self {
            fetch_port,
            probe_port,
            transcode_port,
            codec_port,
            log_port,
            staging,
        }
    }

    /// Answer one inbound command. Never fails: every outcome is a [`Reply`].
    pub async fn handle(&self, request: CommandRequest) -> Reply {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "request",
            id = %request_id,
            operation = %request.operation()
        );

        async move {
            self.log_port
                .info(&format!(
                    "Acknowledged {} of {} ({})",
                    request.operation(),
                    request.attachment().filename,
                    request.attachment().content_type
                ))
                .await;

            let result = match &request {
                CommandRequest::Convert(r) => self.try_convert(r).await,
                CommandRequest::Trim(r) => self.try_trim(r).await,
                CommandRequest::Jpegify(r) => self.try_jpegify(r).await,
            };

            self.finish(result, request.options()).await
        }
        .instrument(span)
        .await
    }

    /// Convert an attachment into another format
    pub async fn convert(&self, request: ConversionRequest) -> Reply {
        self.handle(CommandRequest::Convert(request)).await
    }

    /// Cut a video down to a window
    pub async fn trim(&self, request: TrimRequest) -> Reply {
        self.handle(CommandRequest::Trim(request)).await
    }

    /// Re-encode an image as a low quality JPEG
    pub async fn jpegify(&self, request: JpegifyRequest) -> Reply {
        self.handle(CommandRequest::Jpegify(request)).await
    }

    async fn try_convert(&self, request: &ConversionRequest) -> Result<FilePayload, ConversionError> {
        let attachment = &request.attachment;
        InputTypePolicy::ensure_accepted(Operation::Convert, attachment)?;

        let (format, path) = FormatDispatchTable::resolve(&request.output_format)?;
        FormatDispatchTable::ensure_different(attachment, format)?;
        self.log_port
            .debug(&format!("Resolved {} to {:?}", format, path))
            .await;

        let input = self.staging.acquire(&input_suffix(attachment))?;
        self.fetch(attachment, input.path()).await?;

        let output = self.staging.acquire(format.extension())?;
        match path {
            EncodePath::Direct => {
                self.transcode(input.path(), output.path(), TranscodeKind::Direct)
                    .await?
            }
            EncodePath::Animated => {
                self.transcode(
                    input.path(),
                    output.path(),
                    TranscodeKind::Animated { fps: request.fps },
                )
                .await?
            }
            EncodePath::Still(still) => {
                self.codec_port
                    .encode_still(input.path(), output.path(), still, None)
                    .await?
            }
        }

        let bytes = read_output(output.path()).await?;
        input.release();
        output.release();

        Ok(FilePayload {
            bytes,
            filename: format!("output{}", format.extension()),
            caption: request.options.message.clone(),
            ephemeral: request.options.ephemeral,
        })
    }

    async fn try_trim(&self, request: &TrimRequest) -> Result<FilePayload, ConversionError> {
        let attachment = &request.attachment;
        InputTypePolicy::ensure_accepted(Operation::Trim, attachment)?;
        let (start, end) = TrimBoundsNormalizer::parse_bounds(&request.start, &request.end)?;

        let input = self.staging.acquire(&input_suffix(attachment))?;
        self.fetch(attachment, input.path()).await?;

        let total = self.probe_port.probe_duration(input.path()).await?;
        if total.is_zero() {
            return Err(ConversionError::EmptySource);
        }

        let window = TrimBoundsNormalizer::normalize(total, start, end);
        self.log_port
            .info(&format!(
                "Trimming {:.3}s..{:.3}s of {:.3}s",
                window.start.as_secs_f64(),
                window.end.as_secs_f64(),
                total.as_secs_f64()
            ))
            .await;

        let output = self.staging.acquire(TRIM_OUTPUT_FORMAT.extension())?;
        self.transcode(input.path(), output.path(), TranscodeKind::Trim { window })
            .await?;

        let bytes = read_output(output.path()).await?;
        input.release();
        output.release();

        Ok(FilePayload {
            bytes,
            filename: attachment.filename.clone(),
            caption: request.options.message.clone(),
            ephemeral: request.options.ephemeral,
        })
    }

    async fn try_jpegify(&self, request: &JpegifyRequest) -> Result<FilePayload, ConversionError> {
        let attachment = &request.attachment;
        InputTypePolicy::ensure_accepted(Operation::Jpegify, attachment)?;

        let quality = QualityMapper::encoder_quality(request.strength);
        let input = self.staging.acquire(&input_suffix(attachment))?;
        self.fetch(attachment, input.path()).await?;

        let output = self.staging.acquire(OutputFormat::Jpg.extension())?;
        self.codec_port
            .encode_still(input.path(), output.path(), StillFormat::Jpeg, Some(quality))
            .await?;

        let bytes = read_output(output.path()).await?;
        input.release();
        output.release();

        Ok(FilePayload {
            bytes,
            filename: attachment.filename.clone(),
            caption: request.options.message.clone(),
            ephemeral: request.options.ephemeral,
        })
    }

    async fn fetch(&self, attachment: &Attachment, destination: &Path) -> Result<(), ConversionError> {
        let written = self.fetch_port.fetch(&attachment.url, destination).await?;
        self.log_port
            .debug(&format!("Fetched {} ({} bytes)", attachment.filename, written))
            .await;
        Ok(())
    }

    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        kind: TranscodeKind,
    ) -> Result<(), ConversionError> {
        let job = TranscodeJob {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            kind,
        };
        self.transcode_port.transcode(&job).await
    }

    /// Turn the outcome into the single reply the caller gets
    async fn finish(
        &self,
        result: Result<FilePayload, ConversionError>,
        options: &DeliveryOptions,
    ) -> Reply {
        match result {
            Ok(payload) => {
                self.log_port
                    .info(&format!(
                        "Delivering {} ({} bytes)",
                        payload.filename,
                        payload.bytes.len()
                    ))
                    .await;
                Reply::File(payload)
            }
            Err(err) => {
                match &err {
                    ConversionError::EncodeFailed {
                        stderr: Some(stderr),
                        ..
                    } => {
                        self.log_port
                            .error(&format!("{} | stderr: {}", err, stderr))
                            .await
                    }
                    ConversionError::FetchFailed { .. } | ConversionError::EncodeFailed { .. } => {
                        self.log_port.error(&err.to_string()).await
                    }
                    _ => {
                        self.log_port
                            .info(&format!("Rejected request: {}", err))
                            .await
                    }
                }
                Reply::Message {
                    text: err.user_message(),
                    ephemeral: options.ephemeral || err.forces_ephemeral(),
                }
            }
        }
    }
}

/// Staging suffix for the fetched source, keeping its extension for tools that sniff by name
fn input_suffix(attachment: &Attachment) -> String {
    attachment.extension().unwrap_or_default()
}

async fn read_output(path: &Path) -> Result<Vec<u8>, ConversionError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        ConversionError::encode_failed(format!("failed to read {}: {}", path.display(), e))
    })?;
    if bytes.is_empty() {
        return Err(ConversionError::encode_failed(format!(
            "encoder produced an empty file at {}",
            path.display()
        )));
    }
    Ok(bytes)
}
