//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::model::*;

/// Where the attachment lives and what it claims to be
#[derive(Args, Debug, Clone)]
pub struct AttachmentArgs {
    /// URL of the attachment
    #[arg(long)]
    pub url: String,

    /// Attachment filename (default: last segment of the URL path)
    #[arg(long)]
    pub filename: Option<String>,

    /// Declared content type, e.g. video/mp4
    #[arg(long)]
    pub content_type: String,
}

impl AttachmentArgs {
    pub fn to_attachment(&self) -> Attachment {
        let filename = self
            .filename
            .clone()
            .unwrap_or_else(|| filename_from_url(&self.url));
        Attachment::new(self.url.clone(), filename, self.content_type.clone())
    }
}

/// Caption, visibility and output location
#[derive(Args, Debug, Clone)]
pub struct DeliveryArgs {
    /// Caption sent with the file
    #[arg(long, default_value = "")]
    pub message: String,

    /// Only the requester should see the reply
    #[arg(long)]
    pub ephemeral: bool,

    /// Directory the produced file is written to
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

impl DeliveryArgs {
    pub fn to_options(&self) -> DeliveryOptions {
        DeliveryOptions {
            message: self.message.clone(),
            ephemeral: self.ephemeral,
        }
    }
}

/// Arguments for the convert command
#[derive(Args, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub attachment: AttachmentArgs,

    /// Target extension, e.g. .gif or png
    #[arg(long)]
    pub format: String,

    /// Frame rate of animated output
    #[arg(long, default_value_t = DEFAULT_FPS as i32, allow_negative_numbers = true)]
    pub fps: i32,

    #[command(flatten)]
    pub delivery: DeliveryArgs,
}

impl ConvertArgs {
    pub fn to_request(&self) -> CommandRequest {
        CommandRequest::Convert(ConversionRequest {
            attachment: self.attachment.to_attachment(),
            output_format: self.format.clone(),
            fps: self.fps,
            options: self.delivery.to_options(),
        })
    }
}

/// Arguments for the trim command
#[derive(Args, Debug)]
pub struct TrimArgs {
    #[command(flatten)]
    pub attachment: AttachmentArgs,

    /// Start time, e.g. 1m30s
    #[arg(long, default_value = "")]
    pub start: String,

    /// End time, e.g. 2m 15s 500ms
    #[arg(long, default_value = "")]
    pub end: String,

    #[command(flatten)]
    pub delivery: DeliveryArgs,
}

impl TrimArgs {
    pub fn to_request(&self) -> CommandRequest {
        CommandRequest::Trim(TrimRequest {
            attachment: self.attachment.to_attachment(),
            start: self.start.clone(),
            end: self.end.clone(),
            options: self.delivery.to_options(),
        })
    }
}

/// Arguments for the jpegify command
#[derive(Args, Debug)]
pub struct JpegifyArgs {
    #[command(flatten)]
    pub attachment: AttachmentArgs,

    /// Compression strength 1-100, higher is worse
    #[arg(long, allow_negative_numbers = true)]
    pub strength: i32,

    #[command(flatten)]
    pub delivery: DeliveryArgs,
}

impl JpegifyArgs {
    pub fn to_request(&self) -> CommandRequest {
        CommandRequest::Jpegify(JpegifyRequest {
            attachment: self.attachment.to_attachment(),
            strength: self.strength,
            options: self.delivery.to_options(),
        })
    }
}

/// Arguments for the batch command
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSON or YAML file holding a list of requests
    #[arg(long)]
    pub file: PathBuf,

    /// Directory produced files are written to
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

/// Last non-empty path segment of `url`, without query or fragment
fn filename_from_url(url: &str) -> String {
    let without_suffix = url
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    let without_scheme = without_suffix
        .split_once("://")
        .map_or(without_suffix, |(_, rest)| rest);

    // The first segment is the host.
    without_scheme
        .split('/')
        .skip(1)
        .filter(|segment| !segment.is_empty())
        .last()
        .unwrap_or("attachment")
        .to_string()
}
