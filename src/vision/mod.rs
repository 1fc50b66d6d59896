//! Screenshot analysis.
//!
//! Decoding is delegated to an `ImageDecoder` (`decoder::RasterDecoder`
//! outside tests). The decoded bitmap is downscaled to at most 1000 px on
//! its longest side, the central 32%×32% block is cut out and its average
//! colour is banded into an outcome.

pub mod color;
pub mod decoder;

use async_trait::async_trait;
use tracing::debug;

use crate::types::BacBoError;
use color::{ColorReading, PixelRegion};

/// Longest side after downscaling.
pub const MAX_DIMENSION: usize = 1000;
/// Share of each side kept by the central crop.
pub const CROP_FRACTION: f64 = 0.32;
/// Minimum crop side in pixels.
pub const MIN_CROP: usize = 20;

/// A decoded RGBA bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    fn validate(&self) -> Result<(), BacBoError> {
        if self.width == 0 || self.height == 0 {
            return Err(BacBoError::ImageDecode("image has no pixels".into()));
        }
        if self.rgba.len() != self.width * self.height * 4 {
            return Err(BacBoError::ImageDecode(format!(
                "expected {} bytes of RGBA for {}x{}, got {}",
                self.width * self.height * 4,
                self.width,
                self.height,
                self.rgba.len()
            )));
        }
        Ok(())
    }
}

/// Turns uploaded file bytes into a bitmap.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageDecoder: Send + Sync {
    async fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, BacBoError>;
}

/// Cut the central block out of the downscaled image.
///
/// Downscaling is nearest-neighbour. Crop pixels that fall outside the
/// (downscaled) image read as transparent black.
pub fn central_region(image: &DecodedImage) -> PixelRegion {
    let longest = image.width.max(image.height) as f64;
    let scale = (MAX_DIMENSION as f64 / longest).min(1.0);
    let w = ((image.width as f64 * scale).round() as usize).max(1);
    let h = ((image.height as f64 * scale).round() as usize).max(1);

    let cw = MIN_CROP.max((w as f64 * CROP_FRACTION).floor() as usize);
    let ch = MIN_CROP.max((h as f64 * CROP_FRACTION).floor() as usize);
    let sx = (w as i64 - cw as i64).div_euclid(2);
    let sy = (h as i64 - ch as i64).div_euclid(2);

    let mut rgba = Vec::with_capacity(cw * ch * 4);
    for y in 0..ch as i64 {
        for x in 0..cw as i64 {
            let (px, py) = (sx + x, sy + y);
            if px < 0 || py < 0 || px >= w as i64 || py >= h as i64 {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
                continue;
            }
            let src_x = (((px as f64 + 0.5) / scale) as usize).min(image.width - 1);
            let src_y = (((py as f64 + 0.5) / scale) as usize).min(image.height - 1);
            let idx = (src_y * image.width + src_x) * 4;
            rgba.extend_from_slice(&image.rgba[idx..idx + 4]);
        }
    }

    PixelRegion {
        width: cw,
        height: ch,
        rgba,
    }
}

/// Decode and classify a screenshot. Does not touch any session state.
pub async fn analyze_image(
    decoder: &dyn ImageDecoder,
    bytes: &[u8],
) -> Result<ColorReading, BacBoError> {
    let image = decoder.decode(bytes).await?;
    image.validate()?;
    let region = central_region(&image);
    let reading = color::classify(&region);
    debug!(
        width = image.width,
        height = image.height,
        crop = format!("{}x{}", region.width, region.height),
        rgb = ?reading.rgb,
        hsv = ?reading.hsv,
        label = %reading.label,
        "Image analysed"
    );
    Ok(reading)
}
