//! Colour sampling and HSV banding.

use serde::Serialize;

use crate::types::Outcome;

/// Upper bound on pixels read from a region.
pub const MAX_SAMPLES: usize = 3000;

/// Label for near-white / washed-out samples.
pub const LABEL_UNDEFINED: &str = "Indefinido";
/// Label for hues outside every band.
pub const LABEL_UNMATCHED: &str = "Indef";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue in degrees, saturation and value in percent (all rounded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hsv {
    pub h: u16,
    pub s: u8,
    pub v: u8,
}

/// Row-major RGBA pixel block (4 bytes per pixel).
#[derive(Debug, Clone, PartialEq)]
pub struct PixelRegion {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

impl PixelRegion {
    pub fn solid(width: usize, height: usize, colour: Rgb) -> Self {
        let rgba = std::iter::repeat([colour.r, colour.g, colour.b, 255])
            .take(width * height)
            .flatten()
            .collect();
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// Classification of a sampled region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorReading {
    /// `None` when the colour falls outside every band.
    pub outcome: Option<Outcome>,
    pub label: String,
    pub rgb: Rgb,
    pub hsv: Hsv,
}

impl Rgb {
    pub fn to_hsv(self) -> Hsv {
        let (r, g, b) = (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        );
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let d = max - min;
        let s = if max == 0.0 { 0.0 } else { d / max };

        let mut h = 0.0;
        if d != 0.0 {
            h = if max == r {
                (g - b) / d + if g < b { 6.0 } else { 0.0 }
            } else if max == g {
                (b - r) / d + 2.0
            } else {
                (r - g) / d + 4.0
            };
            h /= 6.0;
        }

        Hsv {
            h: (h * 360.0).round() as u16,
            s: (s * 100.0).round() as u8,
            v: (max * 100.0).round() as u8,
        }
    }
}

/// Average the region at a stride that reads at most ~`MAX_SAMPLES` pixels.
/// Returns `None` when there is nothing to sample.
pub fn average_rgb(region: &PixelRegion) -> Option<Rgb> {
    let total = region.pixel_count().min(region.rgba.len() / 4);
    if total == 0 {
        return None;
    }
    let step = (total / MAX_SAMPLES).max(1);

    let (mut r, mut g, mut b, mut n) = (0u64, 0u64, 0u64, 0u64);
    for i in (0..total).step_by(step) {
        let px = &region.rgba[i * 4..i * 4 + 3];
        r += u64::from(px[0]);
        g += u64::from(px[1]);
        b += u64::from(px[2]);
        n += 1;
    }

    let avg = |sum: u64| (sum as f64 / n as f64).round() as u8;
    Some(Rgb {
        r: avg(r),
        g: avg(g),
        b: avg(b),
    })
}

/// Map HSV onto an outcome band. First match wins.
pub fn band(hsv: Hsv) -> (Option<Outcome>, &'static str) {
    let Hsv { h, s, v } = hsv;
    if s < 12 && v > 90 {
        return (None, LABEL_UNDEFINED);
    }
    match h {
        340..=360 | 0..=28 => (Some(Outcome::Banker), Outcome::Banker.label()),
        190..=260 => (Some(Outcome::Player), Outcome::Player.label()),
        30..=100 => (Some(Outcome::Tie), Outcome::Tie.label()),
        _ => (None, LABEL_UNMATCHED),
    }
}

pub fn classify(region: &PixelRegion) -> ColorReading {
    match average_rgb(region) {
        Some(rgb) => classify_rgb(rgb),
        None => ColorReading {
            outcome: None,
            label: LABEL_UNDEFINED.to_string(),
            rgb: Rgb { r: 0, g: 0, b: 0 },
            hsv: Hsv { h: 0, s: 0, v: 0 },
        },
    }
}

pub fn classify_rgb(rgb: Rgb) -> ColorReading {
    let hsv = rgb.to_hsv();
    let (outcome, label) = band(hsv);
    ColorReading {
        outcome,
        label: label.to_string(),
        rgb,
        hsv,
    }
}
