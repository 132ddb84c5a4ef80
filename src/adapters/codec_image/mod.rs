//! Still-image codec adapter
//!
//! Decodes whatever the `image` crate recognises and re-encodes it with the
//! encoder matching the target. Codec work is CPU bound and runs on the
//! blocking pool.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, Luma};
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// JPEG quality when the caller supplies none
const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Gray level below which a pixel becomes black in a PBM bitmap
const BITMAP_THRESHOLD: u8 = 128;

/// `image` crate codec adapter
pub struct ImageCodecAdapter;

impl ImageCodecAdapter {
    /// Create new image codec adapter
    pub fn new() -> Self {
        Self
    }

    fn encode_blocking(
        input: &Path,
        output: &Path,
        format: StillFormat,
        quality: Option<u8>,
    ) -> Result<(), ConversionError> {
        let img = ImageReader::open(input)
            .map_err(|e| codec_error("open", input, e))?
            .with_guessed_format()
            .map_err(|e| codec_error("sniff", input, e))?
            .decode()
            .map_err(|e| codec_error("decode", input, e))?;

        debug!(
            "Decoded {} ({}x{}), encoding as {:?}",
            input.display(),
            img.width(),
            img.height(),
            format
        );

        match format {
            StillFormat::Jpeg => {
                let quality = quality.unwrap_or(DEFAULT_JPEG_QUALITY).clamp(1, 100);
                let writer = create_output(output)?;
                let encoder = JpegEncoder::new_with_quality(writer, quality);
                img.to_rgb8()
                    .write_with_encoder(encoder)
                    .map_err(|e| codec_error("encode", output, e))
            }
            StillFormat::Pbm => {
                let writer = create_output(output)?;
                let encoder = PnmEncoder::new(writer)
                    .with_subtype(PnmSubtype::Bitmap(SampleEncoding::Binary));
                bitmap(&img)
                    .write_with_encoder(encoder)
                    .map_err(|e| codec_error("encode", output, e))
            }
            StillFormat::Png => save(&img, output, ImageFormat::Png),
            // Encoders below take 8-bit RGBA but not every decoded layout.
            StillFormat::Webp => save(&rgba(&img), output, ImageFormat::WebP),
            StillFormat::Bmp => save(&rgba(&img), output, ImageFormat::Bmp),
            StillFormat::Tiff => save(&rgba(&img), output, ImageFormat::Tiff),
            StillFormat::Tga => save(&rgba(&img), output, ImageFormat::Tga),
            StillFormat::Qoi => save(&rgba(&img), output, ImageFormat::Qoi),
        }
    }
}

impl Default for ImageCodecAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageCodecPort for ImageCodecAdapter {
    async fn encode_still(
        &self,
        input: &Path,
        output: &Path,
        format: StillFormat,
        quality: Option<u8>,
    ) -> Result<(), ConversionError> {
        let input: PathBuf = input.to_path_buf();
        let output: PathBuf = output.to_path_buf();

        tokio::task::spawn_blocking(move || Self::encode_blocking(&input, &output, format, quality))
            .await
            .map_err(|e| ConversionError::encode_failed(format!("codec task failed: {}", e)))?
    }
}

/// PBM samples are 0 (white) or 1 (black)
fn bitmap(img: &DynamicImage) -> GrayImage {
    let luma = img.to_luma8();
    GrayImage::from_fn(luma.width(), luma.height(), |x, y| {
        Luma([u8::from(luma.get_pixel(x, y)[0] < BITMAP_THRESHOLD)])
    })
}

fn rgba(img: &DynamicImage) -> DynamicImage {
    DynamicImage::ImageRgba8(img.to_rgba8())
}

fn save(img: &DynamicImage, output: &Path, format: ImageFormat) -> Result<(), ConversionError> {
    img.save_with_format(output, format)
        .map_err(|e| codec_error("encode", output, e))
}

fn create_output(output: &Path) -> Result<BufWriter<File>, ConversionError> {
    File::create(output)
        .map(BufWriter::new)
        .map_err(|e| codec_error("create", output, e))
}

fn codec_error(step: &str, path: &Path, err: impl std::fmt::Display) -> ConversionError {
    ConversionError::encode_failed(format!("failed to {} {}: {}", step, path.display(), err))
}
