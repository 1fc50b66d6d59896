//! Raster decoder backed by the `image` crate (PNG, JPEG, BMP, GIF, WebP).

use async_trait::async_trait;

use super::{DecodedImage, ImageDecoder};
use crate::types::BacBoError;

/// Decodes screenshot bytes on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder;

impl RasterDecoder {
    pub fn decode_blocking(bytes: &[u8]) -> Result<DecodedImage, BacBoError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| BacBoError::ImageDecode(e.to_string()))?
            .into_rgba8();
        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            width: width as usize,
            height: height as usize,
            rgba: image.into_raw(),
        })
    }
}

#[async_trait]
impl ImageDecoder for RasterDecoder {
    async fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, BacBoError> {
        let owned = bytes.to_vec();
        tokio::task::spawn_blocking(move || Self::decode_blocking(&owned))
            .await
            .map_err(|e| BacBoError::ImageDecode(format!("decoder task failed: {e}")))?
    }
}

#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let pixels = image::RgbaImage::from_pixel(width, height, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(pixels)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
