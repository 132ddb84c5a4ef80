// Domain errors - Failure taxonomy for a single conversion request

use thiserror::Error;

use crate::domain::model::Operation;

/// Classification of a conversion failure, one case per failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidTimeFormat,
    MissingTrimBounds,
    UnsupportedFormat,
    RejectedInputType,
    EmptySource,
    FetchFailed,
    EncodeFailed,
    CleanupFailed,
}

/// Domain-specific error types
///
/// `Display` carries diagnostic detail for the operational log. What the
/// caller sees comes from [`ConversionError::user_message`].
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Trim time string matched none of the recognised units
    #[error("Invalid time format: {input:?}")]
    InvalidTimeFormat { input: String },

    /// Neither a start nor an end time was supplied
    #[error("Missing trim bounds: neither start nor end supplied")]
    MissingTrimBounds,

    /// Output extension is not in the dispatch table
    #[error("Unsupported output format: {format}")]
    UnsupportedFormat { format: String },

    /// Output extension equals the attachment's extension
    #[error("Same-format conversion requested: {input} to {output}")]
    SameFormat { input: String, output: String },

    /// Declared content type is not accepted for the operation
    #[error("Rejected input content type {content_type:?} for {operation}")]
    RejectedInputType {
        content_type: String,
        operation: Operation,
    },

    /// Probe reported a zero-length source
    #[error("Source has zero duration")]
    EmptySource,

    /// Transport error while retrieving the attachment
    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// External tool or codec library reported failure
    #[error("Encode failed: {reason}")]
    EncodeFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Staging file could not be removed
    #[error("Cleanup failed for {path}: {reason}")]
    CleanupFailed { path: String, reason: String },
}

impl ConversionError {
    /// Creates an encode failure without captured tool output.
    pub fn encode_failed(reason: impl Into<String>) -> Self {
        Self::EncodeFailed {
            reason: reason.into(),
            stderr: None,
        }
    }

    /// Creates a fetch failure.
    pub fn fetch_failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FetchFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTimeFormat { .. } => ErrorKind::InvalidTimeFormat,
            Self::MissingTrimBounds => ErrorKind::MissingTrimBounds,
            Self::UnsupportedFormat { .. } | Self::SameFormat { .. } => {
                ErrorKind::UnsupportedFormat
            }
            Self::RejectedInputType { .. } => ErrorKind::RejectedInputType,
            Self::EmptySource => ErrorKind::EmptySource,
            Self::FetchFailed { .. } => ErrorKind::FetchFailed,
            Self::EncodeFailed { .. } => ErrorKind::EncodeFailed,
            Self::CleanupFailed { .. } => ErrorKind::CleanupFailed,
        }
    }

    /// Short message safe to show the caller
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidTimeFormat { .. } => {
                "Invalid time format. Please provide a valid time format (XXh XXm XXs XXms)."
                    .to_string()
            }
            Self::MissingTrimBounds => {
                "You must provide a start or end time to trim the video.".to_string()
            }
            Self::UnsupportedFormat { .. } => "Unsupported conversion type.".to_string(),
            Self::SameFormat { input, output } => {
                format!("Silly, you are converting from {} to {}.", input, output)
            }
            Self::RejectedInputType { operation, .. } => match operation {
                Operation::Trim => "Invalid video format. Please provide an MP4 file.".to_string(),
                Operation::Jpegify => "Invalid file format. Please provide an image.".to_string(),
                Operation::Convert => {
                    "Invalid file format. Please provide a video or an image.".to_string()
                }
            },
            Self::EmptySource => "The video has no duration to trim.".to_string(),
            Self::FetchFailed { .. } | Self::EncodeFailed { .. } | Self::CleanupFailed { .. } => {
                "An error occurred while processing the file.".to_string()
            }
        }
    }

    /// Trim validation rejections, always replied privately whatever the request asked for
    pub fn forces_ephemeral(&self) -> bool {
        matches!(
            self,
            Self::InvalidTimeFormat { .. }
                | Self::MissingTrimBounds
                | Self::RejectedInputType {
                    operation: Operation::Trim,
                    ..
                }
        )
    }
}
