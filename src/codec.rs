//! # Image Codec Module
//!
//! Questo modulo gestisce decode, resize ed encode delle immagini in-process.
//!
//! ## Responsabilità:
//! - Definisce il trait `ImageCodec` (lettura larghezza + transcode)
//! - Definisce i formati di destinazione (`TargetFormat`)
//! - Fornisce `RustCodec`, l'implementazione basata su `image` + `webp`
//!
//! ## Formati Supportati
//!
//! | Formato | Input | Output | Libreria |
//! |---------|-------|--------|----------|
//! | JPEG    | ✅    | ✅     | image (jpeg-decoder / encoder) |
//! | PNG     | ✅    | ❌     | image |
//! | WebP    | ✅    | ✅     | image (decode), libwebp via `webp` (encode lossy) |
//!
//! ## Resize
//! Il resize riceve solo la larghezza di destinazione: l'altezza viene
//! calcolata qui preservando l'aspect ratio (`round(h * w' / w)`, minimo 1).
//! Filtro Lanczos3.
//!
//! ## Alpha
//! - JPEG: il canale alpha viene scartato
//! - WebP: il canale alpha viene preservato se presente nella sorgente

use crate::error::CodecError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Output format of a derivative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// Lossy JPEG
    Raster,
    /// Lossy WebP
    Modern,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 2] = [TargetFormat::Raster, TargetFormat::Modern];

    /// File extension written for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Raster => "jpg",
            Self::Modern => "webp",
        }
    }
}

impl std::fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raster => write!(f, "jpeg"),
            Self::Modern => write!(f, "webp"),
        }
    }
}

/// Parameters of a single transcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeRequest {
    pub format: TargetFormat,
    pub quality: u8,
    /// New width when the source must be scaled down
    pub resize_width: Option<u32>,
}

/// Image capability consumed by the transcoder
pub trait ImageCodec: Send + Sync {
    /// Width of the encoded image, read from its header
    fn read_width(&self, bytes: &[u8]) -> Result<u32, CodecError>;

    /// Decode `bytes`, optionally resize, and encode into `request.format`
    fn transcode(&self, bytes: &[u8], request: &EncodeRequest) -> Result<Vec<u8>, CodecError>;
}

/// Height that keeps the aspect ratio when the width becomes `new_width`
pub fn scaled_height(width: u32, height: u32, new_width: u32) -> u32 {
    if width == 0 {
        return height.max(1);
    }
    let scaled = (height as f64 * new_width as f64 / width as f64).round() as u32;
    scaled.max(1)
}

/// Pure-Rust decode/resize + JPEG encode, libwebp for WebP encode
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCodec;

impl RustCodec {
    fn resize(image: DynamicImage, new_width: u32) -> Result<DynamicImage, CodecError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(CodecError::Dimensions { width, height });
        }
        let new_height = scaled_height(width, height, new_width);
        Ok(image.resize_exact(new_width, new_height, FilterType::Lanczos3))
    }

    fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError> {
        let rgb = image.to_rgb8();
        let mut output = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);
            encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)?;
        }
        Ok(output)
    }

    fn encode_webp(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError> {
        let encoded = if image.color().has_alpha() {
            let rgba = image.to_rgba8();
            webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
                .encode_simple(false, quality as f32)
                .map_err(|e| CodecError::WebP(format!("{:?}", e)))?
                .to_vec()
        } else {
            let rgb = image.to_rgb8();
            webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height())
                .encode_simple(false, quality as f32)
                .map_err(|e| CodecError::WebP(format!("{:?}", e)))?
                .to_vec()
        };
        Ok(encoded)
    }
}

impl ImageCodec for RustCodec {
    fn read_width(&self, bytes: &[u8]) -> Result<u32, CodecError> {
        let reader = image::io::Reader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(image::ImageError::from)?;
        let (width, _) = reader.into_dimensions()?;
        Ok(width)
    }

    fn transcode(&self, bytes: &[u8], request: &EncodeRequest) -> Result<Vec<u8>, CodecError> {
        let mut image = image::load_from_memory(bytes)?;

        if let Some(new_width) = request.resize_width {
            image = Self::resize(image, new_width)?;
        }

        match request.format {
            TargetFormat::Raster => Self::encode_jpeg(&image, request.quality),
            TargetFormat::Modern => Self::encode_webp(&image, request.quality),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{png_bytes, rgba_png_bytes, webp_bytes};

    fn request(format: TargetFormat, resize_width: Option<u32>) -> EncodeRequest {
        EncodeRequest {
            format,
            quality: 80,
            resize_width,
        }
    }

    #[test]
    fn test_target_format_extensions() {
        assert_eq!(TargetFormat::Raster.extension(), "jpg");
        assert_eq!(TargetFormat::Modern.extension(), "webp");
    }

    #[test]
    fn test_scaled_height_rounds_and_preserves_ratio() {
        assert_eq!(scaled_height(3000, 2000, 1920), 1280);
        assert_eq!(scaled_height(3000, 1001, 1920), 641); // 640.64
        assert_eq!(scaled_height(4000, 1, 1920), 1);
    }

    #[test]
    fn test_read_width_png_and_webp() {
        assert_eq!(RustCodec.read_width(&png_bytes(640, 480)).unwrap(), 640);
        assert_eq!(RustCodec.read_width(&webp_bytes(500, 200)).unwrap(), 500);
    }

    #[test]
    fn test_read_width_rejects_garbage() {
        let err = RustCodec.read_width(b"definitely not an image").unwrap_err();
        assert!(matches!(err, CodecError::Image(_)));
    }

    #[test]
    fn test_transcode_without_resize_keeps_dimensions() {
        let source = png_bytes(320, 200);

        let jpeg = RustCodec.transcode(&source, &request(TargetFormat::Raster, None)).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 200));
        assert_eq!(image::guess_format(&jpeg).unwrap(), image::ImageFormat::Jpeg);

        let webp = RustCodec.transcode(&source, &request(TargetFormat::Modern, None)).unwrap();
        let decoded = image::load_from_memory(&webp).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 200));
        assert_eq!(image::guess_format(&webp).unwrap(), image::ImageFormat::WebP);
    }

    #[test]
    fn test_transcode_with_resize_preserves_ratio() {
        let source = png_bytes(2400, 600);

        for format in TargetFormat::ALL {
            let encoded = RustCodec.transcode(&source, &request(format, Some(1920))).unwrap();
            let decoded = image::load_from_memory(&encoded).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (1920, 480));
        }
    }

    #[test]
    fn test_transcode_alpha_source_to_both_formats() {
        let source = rgba_png_bytes(64, 64);

        let jpeg = RustCodec.transcode(&source, &request(TargetFormat::Raster, None)).unwrap();
        assert!(!image::load_from_memory(&jpeg).unwrap().color().has_alpha());

        let webp = RustCodec.transcode(&source, &request(TargetFormat::Modern, None)).unwrap();
        assert_eq!(RustCodec.read_width(&webp).unwrap(), 64);
    }

    #[test]
    fn test_transcode_rejects_garbage() {
        let result = RustCodec.transcode(b"GIF89a-nope", &request(TargetFormat::Raster, None));
        assert!(result.is_err());
    }
}
