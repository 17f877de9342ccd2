use crate::upload::error::UploadError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GenericImageView};
use tracing::debug;

pub const DEFAULT_MAX_DIMENSION: u32 = 1920;
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionOptions {
    /// Longest edge of the output image, in pixels.
    pub max_dimension: u32,
    /// JPEG quality, 1..=100.
    pub quality: u8,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Turns an original photo into the payload that gets uploaded.
#[async_trait::async_trait]
pub trait Compressor: Send + Sync {
    async fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>, UploadError>;
}

/// Production compressor: decode, downsize, re-encode as JPEG.
#[derive(Debug, Clone, Default)]
pub struct JpegCompressor {
    options: CompressionOptions,
}

impl JpegCompressor {
    pub fn new(options: CompressionOptions) -> Self {
        Self { options }
    }

    fn compress_blocking(options: CompressionOptions, bytes: &[u8]) -> Result<Vec<u8>, String> {
        let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
        let img = Self::fit_within(img, options.max_dimension);
        let rgb = img.to_rgb8();

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, options.quality.clamp(1, 100))
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            .map_err(|e| e.to_string())?;

        Ok(out)
    }

    fn fit_within(img: DynamicImage, max_dimension: u32) -> DynamicImage {
        let (w, h) = img.dimensions();
        if w <= max_dimension && h <= max_dimension {
            return img;
        }
        img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
    }
}

#[async_trait::async_trait]
impl Compressor for JpegCompressor {
    async fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>, UploadError> {
        let options = self.options;
        let input = bytes.to_vec();
        let original_len = input.len();

        let result = tokio::task::spawn_blocking(move || Self::compress_blocking(options, &input))
            .await
            .map_err(|e| UploadError::Compression(format!("Compression task failed: {}", e)))?;

        match result {
            Ok(out) => {
                debug!("Compressed {} bytes into {} bytes", original_len, out.len());
                Ok(out)
            }
            Err(reason) => {
                debug!("Compression failed: {}", reason);
                Err(UploadError::Compression(
                    "Failed to compress image".to_string(),
                ))
            }
        }
    }
}
