// Domain rules - Business logic and policies

use std::time::Duration;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::utils::time::TimeParser;

/// Content types trim will accept
pub const TRIM_CONTENT_TYPES: [&str; 2] = ["video/mp4", "video/quicktime"];

/// Business rules for turning requested trim bounds into a valid window
pub struct TrimBoundsNormalizer;

impl TrimBoundsNormalizer {
    /// Parse the raw start/end strings of a trim request.
    ///
    /// Empty strings mean "not supplied". Both missing, or both parsing to
    /// zero, is a [`ConversionError::MissingTrimBounds`].
    pub fn parse_bounds(
        raw_start: &str,
        raw_end: &str,
    ) -> Result<(Duration, Duration), ConversionError> {
        if raw_start.is_empty() && raw_end.is_empty() {
            return Err(ConversionError::MissingTrimBounds);
        }

        let parser = TimeParser::new();
        let start = if raw_start.is_empty() {
            Duration::ZERO
        } else {
            parser.parse_duration(raw_start)?
        };
        let end = if raw_end.is_empty() {
            Duration::ZERO
        } else {
            parser.parse_duration(raw_end)?
        };

        if start.is_zero() && end.is_zero() {
            return Err(ConversionError::MissingTrimBounds);
        }

        Ok((start, end))
    }

    /// Produce a trim window inside `[0, total]`.
    ///
    /// Rules, in order: an end at or before the start becomes `total`; the end
    /// is clamped to `total`; a start at or past `total` becomes zero.
    /// For `total > 0` the result always satisfies `start < end <= total`.
    /// A zero `total` must be rejected by the caller first.
    pub fn normalize(total: Duration, start: Duration, end: Duration) -> TrimWindow {
        let mut start = start;
        let mut end = end;

        if end <= start {
            end = total;
        }

        end = end.min(total);

        if start >= total {
            start = Duration::ZERO;
        }

        TrimWindow { start, end }
    }
}

/// Fixed mapping from output format to encode path
pub struct FormatDispatchTable;

impl FormatDispatchTable {
    /// Look up the requested extension
    pub fn resolve(extension: &str) -> Result<(OutputFormat, EncodePath), ConversionError> {
        let format = OutputFormat::from_extension(extension).ok_or_else(|| {
            ConversionError::UnsupportedFormat {
                format: extension.to_string(),
            }
        })?;
        Ok((format, Self::encode_path(format)))
    }

    pub fn encode_path(format: OutputFormat) -> EncodePath {
        match format {
            OutputFormat::Mp4
            | OutputFormat::Avi
            | OutputFormat::Mov
            | OutputFormat::Mkv
            | OutputFormat::Wmv
            | OutputFormat::Flv
            | OutputFormat::Mpg => EncodePath::Direct,
            OutputFormat::Gif => EncodePath::Animated,
            OutputFormat::Png => EncodePath::Still(StillFormat::Png),
            OutputFormat::Jpg => EncodePath::Still(StillFormat::Jpeg),
            OutputFormat::Webp => EncodePath::Still(StillFormat::Webp),
            OutputFormat::Bmp => EncodePath::Still(StillFormat::Bmp),
            OutputFormat::Tiff => EncodePath::Still(StillFormat::Tiff),
            OutputFormat::Pbm => EncodePath::Still(StillFormat::Pbm),
            OutputFormat::Tga => EncodePath::Still(StillFormat::Tga),
            OutputFormat::Qoi => EncodePath::Still(StillFormat::Qoi),
        }
    }

    /// Whether the attachment's filename extension already is `format`
    pub fn is_same_format(attachment: &Attachment, format: OutputFormat) -> bool {
        attachment
            .extension()
            .and_then(|ext| OutputFormat::from_extension(&ext))
            .map_or(false, |input| input == format)
    }

    /// Reject same-format conversion
    pub fn ensure_different(
        attachment: &Attachment,
        format: OutputFormat,
    ) -> Result<(), ConversionError> {
        if Self::is_same_format(attachment, format) {
            return Err(ConversionError::SameFormat {
                input: attachment.extension().unwrap_or_default(),
                output: format.extension().to_string(),
            });
        }
        Ok(())
    }
}

/// Business rules for JPEG quality
pub struct QualityMapper;

impl QualityMapper {
    /// Map a user-facing compression strength to an encoder quality.
    ///
    /// Strength is clamped to 1..=100 and inverted: 1 gives quality 100,
    /// 100 gives quality 1.
    pub fn encoder_quality(strength: i32) -> u8 {
        (101 - strength.clamp(1, 100)) as u8
    }
}

/// Business rules for declared input content types
pub struct InputTypePolicy;

impl InputTypePolicy {
    pub fn accepts(operation: Operation, content_type: &str) -> bool {
        let content_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match operation {
            Operation::Trim => TRIM_CONTENT_TYPES.contains(&content_type.as_str()),
            Operation::Convert => {
                content_type.starts_with("video/") || content_type.starts_with("image/")
            }
            Operation::Jpegify => content_type.starts_with("image/"),
        }
    }

    pub fn ensure_accepted(
        operation: Operation,
        attachment: &Attachment,
    ) -> Result<(), ConversionError> {
        if Self::accepts(operation, &attachment.content_type) {
            Ok(())
        } else {
            Err(ConversionError::RejectedInputType {
                content_type: attachment.content_type.clone(),
                operation,
            })
        }
    }
}
