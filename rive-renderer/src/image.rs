//! Image decoding.
//!
//! Encoded asset bytes are sniffed for their container format and decoded
//! to straight-alpha RGBA8. Backends convert from there to whatever they
//! sample from (premultiplied pixmaps, GPU textures).

use std::any::Any;

use rive_core::RenderImage;

use crate::error::{RenderError, RenderResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }
}

/// A decoded bitmap, shared by every backend.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    format: ImageFormat,
}

impl DecodedImage {
    /// Wrap raw straight-alpha RGBA8 pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer length does not match the dimensions.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> RenderResult<Self> {
        let expected = u64::from(width) * u64::from(height) * 4;
        if width == 0 || height == 0 || rgba.len() as u64 != expected {
            return Err(RenderError::ImageDecode(format!(
                "{} bytes do not describe a {width}x{height} RGBA image",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
            format: ImageFormat::Unknown,
        })
    }

    /// Straight-alpha RGBA8 pixels, row-major.
    #[must_use]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Container format the image was decoded from.
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Pixels with color channels multiplied by alpha.
    #[must_use]
    pub fn premultiplied(&self) -> Vec<u8> {
        let mut data = self.rgba.clone();
        for pixel in data.chunks_exact_mut(4) {
            let alpha = u16::from(pixel[3]);
            for channel in &mut pixel[..3] {
                #[allow(clippy::cast_possible_truncation)]
                {
                    *channel = ((u16::from(*channel) * alpha + 127) / 255) as u8;
                }
            }
        }
        data
    }
}

impl RenderImage for DecodedImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Decode encoded image bytes to RGBA8.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded.
#[cfg(feature = "images")]
pub fn decode_image(data: &[u8]) -> RenderResult<DecodedImage> {
    let format = ImageFormat::from_magic_bytes(data);

    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::ImageDecode(e.to_string()))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut decoded = DecodedImage::from_rgba(width, height, rgba.into_raw())?;
    decoded.format = format;
    Ok(decoded)
}

/// Decode encoded image bytes to RGBA8.
///
/// # Errors
///
/// Always fails: image support is compiled out.
#[cfg(not(feature = "images"))]
pub fn decode_image(_data: &[u8]) -> RenderResult<DecodedImage> {
    Err(RenderError::ImageDecode(
        "image support not enabled".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D]),
            ImageFormat::Png
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            ImageFormat::Jpeg
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\0\0\0\0WEBPVP8 "),
            ImageFormat::WebP
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GI"), ImageFormat::Unknown);
    }

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(DecodedImage::from_rgba(2, 2, vec![0; 16]).is_ok());
        assert!(DecodedImage::from_rgba(2, 2, vec![0; 15]).is_err());
        assert!(DecodedImage::from_rgba(0, 2, Vec::new()).is_err());
    }

    #[test]
    fn test_premultiply() {
        let image = DecodedImage::from_rgba(1, 1, vec![255, 128, 0, 128]).unwrap();
        assert_eq!(image.premultiplied(), vec![128, 64, 0, 128]);
    }

    #[test]
    fn test_corrupt_bytes_fail() {
        assert!(decode_image(b"\x89PNG not really").is_err());
        assert!(decode_image(&[]).is_err());
    }
}
