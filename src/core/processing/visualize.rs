//! Display range selection and colour mapping for delta rasters.
use ndarray::Array2;
use serde::Serialize;

use crate::core::processing::stats::PercentileStats;
use crate::types::{Sensitivity, VisMode};

/// Nine-step diverging palette, dark blue (strong decrease) to dark red (strong increase).
pub const PALETTE_HEX: [&str; 9] = [
    "#000080", "#0000FF", "#4169E1", "#87CEEB", "#FFFFFF", "#FFB6C1", "#FF4500", "#FF0000",
    "#8B0000",
];

pub const PALETTE_RGB: [[u8; 3]; 9] = [
    [0x00, 0x00, 0x80],
    [0x00, 0x00, 0xFF],
    [0x41, 0x69, 0xE1],
    [0x87, 0xCE, 0xEB],
    [0xFF, 0xFF, 0xFF],
    [0xFF, 0xB6, 0xC1],
    [0xFF, 0x45, 0x00],
    [0xFF, 0x00, 0x00],
    [0x8B, 0x00, 0x00],
];

/// Range used when a month has no statistics.
pub const DEFAULT_RANGE: (f64, f64) = (-0.02, 0.02);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisParams {
    pub min: f64,
    pub max: f64,
    pub palette: &'static [&'static str],
}

impl VisParams {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            palette: &PALETTE_HEX,
        }
    }
}

impl Default for VisParams {
    fn default() -> Self {
        VisParams::new(DEFAULT_RANGE.0, DEFAULT_RANGE.1)
    }
}

/// Display range from a month's percentile statistics.
pub fn adaptive_vis_params(stats: Option<&PercentileStats>, sensitivity: Sensitivity) -> VisParams {
    let Some(s) = stats else {
        return VisParams::default();
    };
    match sensitivity {
        Sensitivity::High => VisParams::new(s.p25.max(-0.03), s.p75.min(0.03)),
        Sensitivity::Low => VisParams::new(s.p5.max(-0.05), s.p95.min(0.05)),
        Sensitivity::Medium => {
            let r = s.p5.abs().max(s.p95.abs());
            VisParams::new((-r).max(-0.04), r.min(0.04))
        }
    }
}

/// Fixed half-width of the non-adaptive modes before sensitivity scaling.
fn fixed_half_range(mode: VisMode) -> Option<f64> {
    match mode {
        VisMode::Adaptive => None,
        VisMode::Sensitive => Some(0.01),
        VisMode::Standard => Some(0.02),
        VisMode::Robust => Some(0.05),
    }
}

pub fn vis_params_for_mode(
    mode: VisMode,
    stats: Option<&PercentileStats>,
    sensitivity: Sensitivity,
) -> VisParams {
    match fixed_half_range(mode) {
        Some(half) => {
            let r = half * sensitivity.range_factor();
            VisParams::new(-r, r)
        }
        None => adaptive_vis_params(stats, sensitivity),
    }
}

fn palette_color(t: f64) -> [u8; 3] {
    let last = (PALETTE_RGB.len() - 1) as f64;
    let pos = t.clamp(0.0, 1.0) * last;
    let i = (pos.floor() as usize).min(PALETTE_RGB.len() - 2);
    let frac = pos - i as f64;
    let (a, b) = (PALETTE_RGB[i], PALETTE_RGB[i + 1]);
    let mut out = [0u8; 3];
    for k in 0..3 {
        out[k] = (a[k] as f64 + (b[k] as f64 - a[k] as f64) * frac).round() as u8;
    }
    out
}

/// Interleaved RGB bytes, row-major. Masked pixels are black.
pub fn colorize(data: &Array2<f64>, vis: &VisParams) -> Vec<u8> {
    let span = vis.max - vis.min;
    let mut rgb = Vec::with_capacity(data.len() * 3);
    for &v in data.iter() {
        if !v.is_finite() {
            rgb.extend_from_slice(&[0, 0, 0]);
            continue;
        }
        let t = if span > 0.0 { (v - vis.min) / span } else { 0.5 };
        rgb.extend_from_slice(&palette_color(t));
    }
    rgb
}
