//! Image codec used by the compression engine.
//!
//! The engine only ever asks for one thing: "re-encode these bytes at this
//! quality, optionally capped to this width". That capability is the
//! [`ImageCodec`] trait, so the ladder logic can be exercised against a fake
//! codec while production uses [`ImageRsCodec`].
//!
//! # Container handling
//!
//! The output container always matches the input container, detected from the
//! payload's magic bytes. How `quality` is honored depends on the container:
//!
//! | Container | Effect of `quality` |
//! |-----------|---------------------|
//! | JPEG      | Encoder quality (1-100) |
//! | WebP      | Lossy encoder quality (1-100) |
//! | PNG       | Lossless; selects the oxipng optimization preset |
//! | GIF       | Palette quantizer speed (first frame only) |
//! | BMP       | None |
//!
//! EXIF orientation is applied to the pixels before re-encoding, since the
//! encoders write no EXIF and the derivative would otherwise display rotated.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, Frame, ImageDecoder, ImageFormat, ImageReader};

use crate::error::CodecError;

/// Minimum encoder quality.
pub const MIN_QUALITY: u8 = 1;

/// Maximum encoder quality.
pub const MAX_QUALITY: u8 = 100;

/// Capability to decode a payload and re-encode it in its own container.
pub trait ImageCodec: Send + Sync {
    /// Re-encode `source` at `quality`.
    ///
    /// When `max_width` is set and the image is wider, it is scaled down to
    /// that width with its aspect ratio preserved. Narrower images are never
    /// enlarged.
    fn encode(&self, source: &[u8], quality: u8, max_width: Option<u32>)
        -> Result<Bytes, CodecError>;
}

// =============================================================================
// image-rs codec
// =============================================================================

/// [`ImageCodec`] backed by the `image` crate, with `webp` for lossy WebP
/// output and `oxipng` for PNG optimization.
///
/// Supports JPEG, PNG, GIF, BMP and WebP payloads.
#[derive(Debug, Clone, Default)]
pub struct ImageRsCodec {}

impl ImageRsCodec {
    /// Create a new codec.
    pub fn new() -> Self {
        Self {}
    }

    /// Detect the container of a payload from its leading bytes.
    pub fn detect_format(&self, source: &[u8]) -> Result<ImageFormat, CodecError> {
        let format = image::guess_format(source).map_err(|e| CodecError::Decode {
            message: e.to_string(),
        })?;

        if is_writable(format) {
            Ok(format)
        } else {
            Err(CodecError::UnsupportedFormat {
                format: format!("{:?}", format),
            })
        }
    }
}

impl ImageCodec for ImageRsCodec {
    fn encode(
        &self,
        source: &[u8],
        quality: u8,
        max_width: Option<u32>,
    ) -> Result<Bytes, CodecError> {
        let quality = clamp_quality(quality);
        let format = self.detect_format(source)?;

        let mut img = decode(source, format)?;
        if let Some(max_width) = max_width {
            img = constrain_width(img, max_width);
        }

        let output =
            write_image(&img, format, quality).map_err(|message| CodecError::Encode {
                quality,
                message,
            })?;

        Ok(Bytes::from(output))
    }
}

fn is_writable(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg
            | ImageFormat::Png
            | ImageFormat::Gif
            | ImageFormat::Bmp
            | ImageFormat::WebP
    )
}

/// Decode `source` and rotate/flip it upright according to its EXIF
/// orientation. Unreadable EXIF is treated as no orientation.
fn decode(source: &[u8], format: ImageFormat) -> Result<DynamicImage, CodecError> {
    let decode_error = |e: image::ImageError| CodecError::Decode {
        message: e.to_string(),
    };

    let mut decoder = ImageReader::with_format(Cursor::new(source), format)
        .into_decoder()
        .map_err(decode_error)?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let mut img = DynamicImage::from_decoder(decoder).map_err(decode_error)?;
    img.apply_orientation(orientation);

    Ok(img)
}

/// Scale `img` down to `max_width` pixels wide, keeping its aspect ratio.
fn constrain_width(img: DynamicImage, max_width: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    if max_width == 0 || width <= max_width {
        return img;
    }

    let scaled = (u64::from(height) * u64::from(max_width) + u64::from(width) / 2) / u64::from(width);
    let new_height = scaled.clamp(1, u64::from(u32::MAX)) as u32;

    img.resize_exact(max_width, new_height, FilterType::Lanczos3)
}

fn write_image(img: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>, String> {
    let mut output = Vec::new();

    match format {
        ImageFormat::Jpeg => {
            let img = to_jpeg_color(img);
            let encoder = JpegEncoder::new_with_quality(&mut output, quality);
            img.write_with_encoder(encoder).map_err(|e| e.to_string())?;
        }
        ImageFormat::WebP => {
            output = encode_webp(img, quality)?;
        }
        ImageFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut output, CompressionType::Fast, PngFilterType::Adaptive);
            img.write_with_encoder(encoder).map_err(|e| e.to_string())?;
            output = optimize_png(&output, quality)?;
        }
        ImageFormat::Gif => {
            let mut encoder = GifEncoder::new_with_speed(&mut output, gif_speed(quality));
            encoder
                .encode_frame(Frame::new(img.to_rgba8()))
                .map_err(|e| e.to_string())?;
        }
        _ => {
            to_eight_bit(img)
                .write_to(&mut Cursor::new(&mut output), format)
                .map_err(|e| e.to_string())?;
        }
    }

    Ok(output)
}

/// JPEG carries neither alpha nor 16-bit samples.
fn to_jpeg_color(img: &DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img.clone(),
        DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLuma16(_) => {
            DynamicImage::ImageLuma8(img.to_luma8())
        }
        _ => DynamicImage::ImageRgb8(img.to_rgb8()),
    }
}

fn to_eight_bit(img: &DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => img.clone(),
        _ => DynamicImage::ImageRgba8(img.to_rgba8()),
    }
}

/// Lossy WebP at `quality`.
fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, String> {
    let rgba = img.to_rgba8();
    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
    let memory = encoder
        .encode_simple(false, f32::from(quality))
        .map_err(|e| format!("WebP encoding failed: {:?}", e))?;

    Ok(memory.to_vec())
}

/// Run oxipng over an encoded PNG. The result is never larger than `png`.
fn optimize_png(png: &[u8], quality: u8) -> Result<Vec<u8>, String> {
    let mut options = oxipng::Options::from_preset(png_preset(quality));
    options.strip = oxipng::StripChunks::Safe;

    oxipng::optimize_from_memory(png, &options).map_err(|e| e.to_string())
}

/// Map quality onto an oxipng preset: lower quality spends more effort.
fn png_preset(quality: u8) -> u8 {
    match quality {
        80..=u8::MAX => 2,
        50..=79 => 4,
        _ => 6,
    }
}

/// Map quality onto the GIF quantizer speed (1 = finest, 30 = coarsest).
fn gif_speed(quality: u8) -> i32 {
    let quality = i32::from(clamp_quality(quality));
    (30 - (quality - 1) * 29 / 99).clamp(1, 30)
}

/// Clamp quality to the encoder's valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_QUALITY, MAX_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
