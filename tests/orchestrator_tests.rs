use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tempfile::TempDir;

use quickedit::adapters::{StagingArea, TracingLogAdapter};
use quickedit::domain::errors::*;
use quickedit::domain::model::*;
use quickedit::ports::*;
use quickedit::ConversionInteractor;

/// In-memory port doubles
mod doubles {
    use super::*;

    pub const SOURCE_BYTES: &[u8] = b"fetched source bytes";
    pub const ENCODED_BYTES: &[u8] = b"encoded output bytes";

    #[derive(Default)]
    pub struct MockFetch {
        pub fail: bool,
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl FetchPort for MockFetch {
        async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, ConversionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ConversionError::fetch_failed(url, "connection reset by peer"));
            }
            tokio::fs::write(destination, SOURCE_BYTES).await.unwrap();
            Ok(SOURCE_BYTES.len() as u64)
        }
    }

    pub struct MockProbe {
        pub duration: Result<Duration, ()>,
    }

    #[async_trait]
    impl ProbePort for MockProbe {
        async fn probe_duration(&self, file_path: &Path) -> Result<Duration, ConversionError> {
            assert_eq!(std::fs::read(file_path).unwrap(), SOURCE_BYTES);
            self.duration
                .map_err(|_| ConversionError::encode_failed("ffprobe exited with status 1"))
        }
    }

    #[derive(Default)]
    pub struct MockTranscode {
        pub fail: bool,
        pub hang: bool,
        pub jobs: Mutex<Vec<TranscodeJob>>,
    }

    #[async_trait]
    impl TranscodePort for MockTranscode {
        async fn transcode(&self, job: &TranscodeJob) -> Result<(), ConversionError> {
            assert_eq!(std::fs::read(&job.input).unwrap(), SOURCE_BYTES);
            self.jobs.lock().unwrap().push(job.clone());
            if self.hang {
                std::future::pending::<()>().await;
            }
            if self.fail {
                return Err(ConversionError::EncodeFailed {
                    reason: "ffmpeg exited with exit status: 1".to_string(),
                    stderr: Some(format!("{}: Invalid data found", job.input.display())),
                });
            }
            tokio::fs::write(&job.output, ENCODED_BYTES).await.unwrap();
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MockCodec {
        pub fail: bool,
        pub calls: Mutex<Vec<(StillFormat, Option<u8>)>>,
    }

    #[async_trait]
    impl ImageCodecPort for MockCodec {
        async fn encode_still(
            &self,
            input: &Path,
            output: &Path,
            format: StillFormat,
            quality: Option<u8>,
        ) -> Result<(), ConversionError> {
            assert_eq!(std::fs::read(input).unwrap(), SOURCE_BYTES);
            self.calls.lock().unwrap().push((format, quality));
            if self.fail {
                return Err(ConversionError::encode_failed("unsupported color type"));
            }
            std::fs::write(output, ENCODED_BYTES).unwrap();
            Ok(())
        }
    }
}

use doubles::*;

struct Harness {
    scratch: TempDir,
    fetch: Arc<MockFetch>,
    transcode: Arc<MockTranscode>,
    codec: Arc<MockCodec>,
    interactor: Arc<ConversionInteractor>,
}

impl Harness {
    fn new() -> Self {
        Self::with(
            MockFetch::default(),
            MockProbe {
                duration: Ok(Duration::from_secs(300)),
            },
            MockTranscode::default(),
            MockCodec::default(),
        )
    }

    fn with(fetch: MockFetch, probe: MockProbe, transcode: MockTranscode, codec: MockCodec) -> Self {
        let scratch = TempDir::new().unwrap();
        let fetch = Arc::new(fetch);
        let transcode = Arc::new(transcode);
        let codec = Arc::new(codec);

        let interactor = Arc::new(ConversionInteractor::new(
            Arc::clone(&fetch) as Arc<dyn FetchPort>,
            Arc::new(probe) as Arc<dyn ProbePort>,
            Arc::clone(&transcode) as Arc<dyn TranscodePort>,
            Arc::clone(&codec) as Arc<dyn ImageCodecPort>,
            Arc::new(TracingLogAdapter::new()) as Arc<dyn LogPort>,
            Arc::new(StagingArea::new(scratch.path().join("staging"))),
        ));

        Self {
            scratch,
            fetch,
            transcode,
            codec,
            interactor,
        }
    }

    /// Files left in the staging directory
    fn leftovers(&self) -> usize {
        std::fs::read_dir(self.scratch.path().join("staging"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    fn fetch_calls(&self) -> usize {
        self.fetch.calls.load(Ordering::SeqCst)
    }

    fn jobs(&self) -> Vec<TranscodeJob> {
        self.transcode.jobs.lock().unwrap().clone()
    }
}

fn video(filename: &str) -> Attachment {
    Attachment::new(
        format!("https://cdn.example.com/{}", filename),
        filename,
        "video/mp4",
    )
}

fn image(filename: &str) -> Attachment {
    Attachment::new(
        format!("https://cdn.example.com/{}", filename),
        filename,
        "image/png",
    )
}

fn convert(attachment: Attachment, format: &str) -> ConversionRequest {
    ConversionRequest {
        attachment,
        output_format: format.to_string(),
        fps: DEFAULT_FPS as i32,
        options: DeliveryOptions::default(),
    }
}

fn trim(start: &str, end: &str) -> TrimRequest {
    TrimRequest {
        attachment: video("clip.mp4"),
        start: start.to_string(),
        end: end.to_string(),
        options: DeliveryOptions::default(),
    }
}

fn expect_file(reply: Reply) -> FilePayload {
    match reply {
        Reply::File(payload) => payload,
        other => panic!("expected a file reply, got {:?}", other),
    }
}

fn expect_message(reply: Reply) -> (String, bool) {
    match reply {
        Reply::Message { text, ephemeral } => (text, ephemeral),
        other => panic!("expected a message reply, got {:?}", other),
    }
}

mod trim_tests {
    use super::*;

    #[tokio::test]
    async fn test_trim_open_end_runs_to_source_end() {
        let h = Harness::new();

        let payload = expect_file(h.interactor.trim(trim("1m30s", "")).await);
        assert_eq!(payload.bytes, ENCODED_BYTES);
        assert_eq!(payload.filename, "clip.mp4");

        let jobs = h.jobs();
        assert_eq!(jobs.len(), 1);
        match jobs[0].kind {
            TranscodeKind::Trim { window } => {
                assert_eq!(window.start, Duration::from_secs(90));
                assert_eq!(window.end, Duration::from_secs(300));
                assert_eq!(window.duration(), Duration::from_secs(210));
            }
            ref other => panic!("unexpected job {:?}", other),
        }
        assert!(jobs[0].output.to_string_lossy().ends_with(".mp4"));
        assert_eq!(h.leftovers(), 0);
    }

    #[tokio::test]
    async fn test_trim_end_past_source_is_clamped() {
        let h = Harness::new();
        expect_file(h.interactor.trim(trim("", "2h")).await);

        match h.jobs()[0].kind {
            TranscodeKind::Trim { window } => {
                assert_eq!(window.start, Duration::ZERO);
                assert_eq!(window.end, Duration::from_secs(300));
            }
            ref other => panic!("unexpected job {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_trim_missing_bounds_is_private_and_skips_fetch() {
        let h = Harness::new();
        let (text, ephemeral) = expect_message(h.interactor.trim(trim("", "")).await);

        assert_eq!(text, "You must provide a start or end time to trim the video.");
        assert!(ephemeral);
        assert_eq!(h.fetch_calls(), 0);
        assert_eq!(h.leftovers(), 0);
    }

    #[tokio::test]
    async fn test_trim_invalid_time_is_rejected_before_fetch() {
        let h = Harness::new();
        let (text, ephemeral) = expect_message(h.interactor.trim(trim("soon", "")).await);

        assert!(text.starts_with("Invalid time format."));
        assert!(ephemeral);
        assert_eq!(h.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_trim_rejects_non_mp4_content_type() {
        let h = Harness::new();
        let mut request = trim("10s", "");
        request.attachment = Attachment::new("https://cdn.example.com/a.webm", "a.webm", "video/webm");

        let (text, ephemeral) = expect_message(h.interactor.trim(request).await);
        assert_eq!(text, "Invalid video format. Please provide an MP4 file.");
        assert!(ephemeral);
        assert_eq!(h.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_trim_zero_length_source() {
        let h = Harness::with(
            MockFetch::default(),
            MockProbe {
                duration: Ok(Duration::ZERO),
            },
            MockTranscode::default(),
            MockCodec::default(),
        );

        let (text, _) = expect_message(h.interactor.trim(trim("5s", "")).await);
        assert_eq!(text, "The video has no duration to trim.");
        assert!(h.jobs().is_empty());
        assert_eq!(h.leftovers(), 0);
    }

    #[tokio::test]
    async fn test_trim_probe_failure_is_generic() {
        let h = Harness::with(
            MockFetch::default(),
            MockProbe { duration: Err(()) },
            MockTranscode::default(),
            MockCodec::default(),
        );

        let (text, _) = expect_message(h.interactor.trim(trim("5s", "")).await);
        assert_eq!(text, "An error occurred while processing the file.");
        assert_eq!(h.leftovers(), 0);
    }
}

mod convert_tests {
    use super::*;

    #[tokio::test]
    async fn test_same_format_is_rejected_without_fetch() {
        let h = Harness::new();
        let (text, _) = expect_message(h.interactor.convert(convert(image("photo.png"), ".png")).await);

        assert_eq!(text, "Silly, you are converting from .png to .png.");
        assert_eq!(h.fetch_calls(), 0);
        assert_eq!(h.leftovers(), 0);
    }

    #[tokio::test]
    async fn test_same_format_respects_aliases() {
        let h = Harness::new();
        let attachment = Attachment::new("https://cdn.example.com/p.JPEG", "p.JPEG", "image/jpeg");
        expect_message(h.interactor.convert(convert(attachment, "jpg")).await);
        assert_eq!(h.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_format_is_rejected_without_fetch() {
        let h = Harness::new();
        let (text, ephemeral) =
            expect_message(h.interactor.convert(convert(video("clip.mp4"), ".xyz")).await);

        assert_eq!(text, "Unsupported conversion type.");
        assert!(!ephemeral);
        assert_eq!(h.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_convert_to_gif_uses_animated_path() {
        let h = Harness::new();
        let mut request = convert(video("clip.mp4"), ".gif");
        request.fps = 15;
        request.options = DeliveryOptions {
            message: "look at this".to_string(),
            ephemeral: true,
        };

        let payload = expect_file(h.interactor.convert(request).await);
        assert_eq!(payload.filename, "output.gif");
        assert_eq!(payload.caption, "look at this");
        assert!(payload.ephemeral);
        assert_eq!(h.jobs()[0].kind, TranscodeKind::Animated { fps: 15 });
        assert_eq!(h.leftovers(), 0);
    }

    #[tokio::test]
    async fn test_convert_to_avi_uses_direct_path() {
        let h = Harness::new();
        let payload = expect_file(h.interactor.convert(convert(video("clip.mp4"), "AVI")).await);

        assert_eq!(payload.filename, "output.avi");
        let jobs = h.jobs();
        assert_eq!(jobs[0].kind, TranscodeKind::Direct);
        assert!(jobs[0].input.to_string_lossy().ends_with(".mp4"));
        assert!(jobs[0].output.to_string_lossy().ends_with(".avi"));
    }

    #[tokio::test]
    async fn test_convert_to_still_uses_codec() {
        let h = Harness::new();
        let payload = expect_file(h.interactor.convert(convert(image("photo.png"), ".webp")).await);

        assert_eq!(payload.filename, "output.webp");
        assert_eq!(
            *h.codec.calls.lock().unwrap(),
            vec![(StillFormat::Webp, None)]
        );
        assert!(h.jobs().is_empty());
        assert_eq!(h.leftovers(), 0);
    }

    #[tokio::test]
    async fn test_convert_rejects_non_media_type() {
        let h = Harness::new();
        let attachment = Attachment::new("https://cdn.example.com/a.txt", "a.txt", "text/plain");
        let (text, ephemeral) = expect_message(h.interactor.convert(convert(attachment, ".png")).await);

        assert_eq!(text, "Invalid file format. Please provide a video or an image.");
        assert!(!ephemeral);
        assert_eq!(h.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_requested_visibility() {
        let h = Harness::with(
            MockFetch {
                fail: true,
                ..Default::default()
            },
            MockProbe {
                duration: Ok(Duration::from_secs(1)),
            },
            MockTranscode::default(),
            MockCodec::default(),
        );
        let mut request = convert(video("clip.mp4"), ".gif");
        request.options.ephemeral = true;

        let (text, ephemeral) = expect_message(h.interactor.convert(request).await);
        assert_eq!(text, "An error occurred while processing the file.");
        assert!(ephemeral);
        assert!(h.jobs().is_empty());
        assert_eq!(h.leftovers(), 0);
    }

    #[tokio::test]
    async fn test_encode_failure_cleans_up() {
        let h = Harness::with(
            MockFetch::default(),
            MockProbe {
                duration: Ok(Duration::from_secs(1)),
            },
            MockTranscode {
                fail: true,
                ..Default::default()
            },
            MockCodec::default(),
        );

        let (text, ephemeral) =
            expect_message(h.interactor.convert(convert(video("clip.mp4"), ".mkv")).await);
        assert_eq!(text, "An error occurred while processing the file.");
        assert!(!text.contains("Invalid data"));
        assert!(!ephemeral);
        assert_eq!(h.leftovers(), 0);
    }

    #[tokio::test]
    async fn test_codec_failure_cleans_up() {
        let h = Harness::with(
            MockFetch::default(),
            MockProbe {
                duration: Ok(Duration::from_secs(1)),
            },
            MockTranscode::default(),
            MockCodec {
                fail: true,
                ..Default::default()
            },
        );

        expect_message(h.interactor.convert(convert(image("photo.png"), ".qoi")).await);
        assert_eq!(h.leftovers(), 0);
    }
}

mod jpegify_tests {
    use super::*;

    #[tokio::test]
    async fn test_jpegify_inverts_strength() {
        let h = Harness::new();
        let request = JpegifyRequest {
            attachment: image("cat.png"),
            strength: 90,
            options: DeliveryOptions::default(),
        };

        let payload = expect_file(h.interactor.jpegify(request).await);
        assert_eq!(payload.filename, "cat.png");
        assert_eq!(
            *h.codec.calls.lock().unwrap(),
            vec![(StillFormat::Jpeg, Some(11))]
        );
        assert_eq!(h.leftovers(), 0);
    }

    #[tokio::test]
    async fn test_jpegify_clamps_strength() {
        let h = Harness::new();
        for strength in [-5, 150] {
            let request = JpegifyRequest {
                attachment: image("cat.png"),
                strength,
                options: DeliveryOptions::default(),
            };
            expect_file(h.interactor.jpegify(request).await);
        }
        assert_eq!(
            *h.codec.calls.lock().unwrap(),
            vec![(StillFormat::Jpeg, Some(100)), (StillFormat::Jpeg, Some(1))]
        );
    }

    #[tokio::test]
    async fn test_jpegify_rejects_video() {
        let h = Harness::new();
        let request = JpegifyRequest {
            attachment: video("clip.mp4"),
            strength: 50,
            options: DeliveryOptions::default(),
        };

        let (text, ephemeral) = expect_message(h.interactor.jpegify(request).await);
        assert_eq!(text, "Invalid file format. Please provide an image.");
        assert!(!ephemeral);
        assert_eq!(h.fetch_calls(), 0);
    }
}

mod lifecycle_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_do_not_collide() {
        let h = Harness::new();

        let handles: Vec<_> = (0..24)
            .map(|i| {
                let interactor = Arc::clone(&h.interactor);
                tokio::spawn(async move {
                    let request = match i % 3 {
                        0 => CommandRequest::Convert(convert(video("clip.mp4"), ".gif")),
                        1 => CommandRequest::Convert(convert(image("photo.png"), ".bmp")),
                        _ => CommandRequest::Trim(trim("10s", "20s")),
                    };
                    interactor.handle(request).await
                })
            })
            .collect();

        for reply in join_all(handles).await {
            assert!(reply.unwrap().is_file());
        }

        let outputs: std::collections::HashSet<_> =
            h.jobs().into_iter().map(|job| job.output).collect();
        assert_eq!(outputs.len(), 16);
        assert_eq!(h.leftovers(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_request_still_cleans_up() {
        let h = Harness::with(
            MockFetch::default(),
            MockProbe {
                duration: Ok(Duration::from_secs(60)),
            },
            MockTranscode {
                hang: true,
                ..Default::default()
            },
            MockCodec::default(),
        );

        let outcome = tokio::time::timeout(
            Duration::from_millis(200),
            h.interactor.convert(convert(video("clip.mp4"), ".gif")),
        )
        .await;

        assert!(outcome.is_err());
        assert_eq!(h.jobs().len(), 1);
        assert_eq!(h.leftovers(), 0);
    }
}
