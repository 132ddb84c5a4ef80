// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default frame rate for animated output
pub const DEFAULT_FPS: u32 = 30;

/// Remote file handed in by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    pub filename: String,
    pub content_type: String,
}

impl Attachment {
    pub fn new(
        url: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }

    /// Lower-cased extension of the filename including the dot, e.g. `.png`
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
    }
}

/// Operation requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Convert,
    Trim,
    Jpegify,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Convert => "convert",
            Operation::Trim => "trim",
            Operation::Jpegify => "jpegify",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every output format the converter can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Mp4,
    Avi,
    Mov,
    Mkv,
    Gif,
    Wmv,
    Flv,
    Mpg,
    Png,
    Jpg,
    Webp,
    Bmp,
    Tiff,
    Pbm,
    Tga,
    Qoi,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 16] = [
        OutputFormat::Mp4,
        OutputFormat::Avi,
        OutputFormat::Mov,
        OutputFormat::Mkv,
        OutputFormat::Gif,
        OutputFormat::Wmv,
        OutputFormat::Flv,
        OutputFormat::Mpg,
        OutputFormat::Png,
        OutputFormat::Jpg,
        OutputFormat::Webp,
        OutputFormat::Bmp,
        OutputFormat::Tiff,
        OutputFormat::Pbm,
        OutputFormat::Tga,
        OutputFormat::Qoi,
    ];

    /// Parse an extension with or without the leading dot, case-insensitively.
    /// `jpeg`, `tif` and `mpeg` are accepted as aliases.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let normalized = extension.trim().trim_start_matches('.').to_lowercase();
        let format = match normalized.as_str() {
            "mp4" => OutputFormat::Mp4,
            "avi" => OutputFormat::Avi,
            "mov" => OutputFormat::Mov,
            "mkv" => OutputFormat::Mkv,
            "gif" => OutputFormat::Gif,
            "wmv" => OutputFormat::Wmv,
            "flv" => OutputFormat::Flv,
            "mpg" | "mpeg" => OutputFormat::Mpg,
            "png" => OutputFormat::Png,
            "jpg" | "jpeg" => OutputFormat::Jpg,
            "webp" => OutputFormat::Webp,
            "bmp" => OutputFormat::Bmp,
            "tiff" | "tif" => OutputFormat::Tiff,
            "pbm" => OutputFormat::Pbm,
            "tga" => OutputFormat::Tga,
            "qoi" => OutputFormat::Qoi,
            _ => return None,
        };
        Some(format)
    }

    /// Canonical extension including the dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => ".mp4",
            OutputFormat::Avi => ".avi",
            OutputFormat::Mov => ".mov",
            OutputFormat::Mkv => ".mkv",
            OutputFormat::Gif => ".gif",
            OutputFormat::Wmv => ".wmv",
            OutputFormat::Flv => ".flv",
            OutputFormat::Mpg => ".mpg",
            OutputFormat::Png => ".png",
            OutputFormat::Jpg => ".jpg",
            OutputFormat::Webp => ".webp",
            OutputFormat::Bmp => ".bmp",
            OutputFormat::Tiff => ".tiff",
            OutputFormat::Pbm => ".pbm",
            OutputFormat::Tga => ".tga",
            OutputFormat::Qoi => ".qoi",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Encoders of the bundled image codec library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StillFormat {
    Png,
    Jpeg,
    Webp,
    Bmp,
    Tiff,
    Pbm,
    Tga,
    Qoi,
}

/// Strategy used to produce an output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodePath {
    /// Plain ffmpeg re-encode into the target container
    Direct,
    /// ffmpeg re-encode with fixed frame rate, scale and pixel format
    Animated,
    /// Image codec library, encoder picked by target
    Still(StillFormat),
}

/// Caption and visibility passed through to the reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOptions {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub ephemeral: bool,
}

fn default_fps() -> i32 {
    DEFAULT_FPS as i32
}

/// Request to convert an attachment into another format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub attachment: Attachment,
    /// Requested extension as given by the caller, e.g. `.gif`
    pub output_format: String,
    /// Only used for animated output
    #[serde(default = "default_fps")]
    pub fps: i32,
    #[serde(flatten)]
    pub options: DeliveryOptions,
}

/// Request to cut a video to a window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimRequest {
    pub attachment: Attachment,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(flatten)]
    pub options: DeliveryOptions,
}

/// Request to re-encode an image as a heavily compressed JPEG
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JpegifyRequest {
    pub attachment: Attachment,
    /// Compression strength 1-100, clamped
    pub strength: i32,
    #[serde(flatten)]
    pub options: DeliveryOptions,
}

/// One inbound command as delivered by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum CommandRequest {
    Convert(ConversionRequest),
    Trim(TrimRequest),
    Jpegify(JpegifyRequest),
}

impl CommandRequest {
    pub fn operation(&self) -> Operation {
        match self {
            CommandRequest::Convert(_) => Operation::Convert,
            CommandRequest::Trim(_) => Operation::Trim,
            CommandRequest::Jpegify(_) => Operation::Jpegify,
        }
    }

    pub fn attachment(&self) -> &Attachment {
        match self {
            CommandRequest::Convert(r) => &r.attachment,
            CommandRequest::Trim(r) => &r.attachment,
            CommandRequest::Jpegify(r) => &r.attachment,
        }
    }

    pub fn options(&self) -> &DeliveryOptions {
        match self {
            CommandRequest::Convert(r) => &r.options,
            CommandRequest::Trim(r) => &r.options,
            CommandRequest::Jpegify(r) => &r.options,
        }
    }
}

/// Validated portion of a source to keep, `start < end <= total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimWindow {
    pub start: Duration,
    pub end: Duration,
}

impl TrimWindow {
    /// Length of the kept portion
    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}

/// What the external transcoder is asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeKind {
    Direct,
    Animated { fps: i32 },
    Trim { window: TrimWindow },
}

/// One invocation of the external transcoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub kind: TranscodeKind,
}

/// Produced file ready to hand back to the caller
#[derive(Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub caption: String,
    pub ephemeral: bool,
}

impl fmt::Debug for FilePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePayload")
            .field("bytes", &self.bytes.len())
            .field("filename", &self.filename)
            .field("caption", &self.caption)
            .field("ephemeral", &self.ephemeral)
            .finish()
    }
}

/// Exactly one of these is produced per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    File(FilePayload),
    Message { text: String, ephemeral: bool },
}

impl Reply {
    pub fn is_file(&self) -> bool {
        matches!(self, Reply::File(_))
    }

    pub fn ephemeral(&self) -> bool {
        match self {
            Reply::File(payload) => payload.ephemeral,
            Reply::Message { ephemeral, .. } => *ephemeral,
        }
    }
}
