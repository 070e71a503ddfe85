//! Per-scene preprocessing: linear rescale, square focal-mean speckle filter and ROI clip.
use ndarray::{Array2, Zip};
use tracing::debug;

use crate::core::processing::raster::Raster;
use crate::core::region::Roi;
use crate::error::{Error, Result};

/// Scale factor applied to raw backscatter values
pub const DEFAULT_RESCALE: f64 = 1.0e-4;

/// Radius (pixels) of the square speckle kernel; 1.5 covers a 3x3 neighbourhood.
pub const DEFAULT_SPECKLE_RADIUS_PX: f64 = 1.5;

pub fn rescale(data: &Array2<f64>, factor: f64) -> Array2<f64> {
    data.mapv(|v| v * factor)
}

/// Mean over a square window of half-width `floor(radius_px)`.
/// NaN neighbours are ignored; NaN centres stay masked.
pub fn focal_mean(data: &Array2<f64>, radius_px: f64) -> Array2<f64> {
    let half = radius_px.max(0.0).floor() as usize;
    if half == 0 {
        return data.clone();
    }
    let (rows, cols) = data.dim();
    let mut out = Array2::<f64>::from_elem((rows, cols), f64::NAN);

    Zip::indexed(&mut out).par_for_each(|(r, c), o| {
        if !data[(r, c)].is_finite() {
            return;
        }
        let r0 = r.saturating_sub(half);
        let c0 = c.saturating_sub(half);
        let r1 = (r + half).min(rows - 1);
        let c1 = (c + half).min(cols - 1);

        let mut sum = 0.0;
        let mut count = 0usize;
        for rr in r0..=r1 {
            for cc in c0..=c1 {
                let v = data[(rr, cc)];
                if v.is_finite() {
                    sum += v;
                    count += 1;
                }
            }
        }
        *o = sum / count as f64;
    });

    out
}

/// Crop to the pixels whose centres fall inside `roi`.
pub fn clip_to_roi(raster: &Raster, roi: &Roi) -> Result<Raster> {
    if !raster.is_north_up() {
        return Err(Error::Processing(
            "rotated geotransforms are not supported".to_string(),
        ));
    }
    let window = raster.roi_window(roi).ok_or_else(|| {
        Error::Processing(format!("region {} does not overlap the raster", roi))
    })?;
    debug!(
        "Clip to ROI: window rows {}..={} cols {}..={}",
        window.row0, window.row1, window.col0, window.col1
    );
    raster.crop(window)
}

/// Full per-scene chain: rescale, optional speckle filter, clip.
pub fn preprocess_band(
    band: &Raster,
    roi: &Roi,
    rescale_factor: f64,
    speckle_radius_px: Option<f64>,
) -> Result<Raster> {
    let scaled = rescale(&band.data, rescale_factor);
    let filtered = match speckle_radius_px {
        Some(radius) => focal_mean(&scaled, radius),
        None => scaled,
    };
    clip_to_roi(&Raster::new(filtered, band.geotransform), roi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn focal_mean_averages_three_by_three() {
        let data = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let out = focal_mean(&data, DEFAULT_SPECKLE_RADIUS_PX);
        assert!((out[(1, 1)] - 5.0).abs() < 1e-12);
        // Corner sees a 2x2 neighbourhood
        assert!((out[(0, 0)] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn focal_mean_skips_masked_neighbours() {
        let data = array![[f64::NAN, 2.0], [4.0, 6.0]];
        let out = focal_mean(&data, 1.5);
        assert!(out[(0, 0)].is_nan());
        assert!((out[(1, 1)] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn radius_below_one_is_identity() {
        let data = array![[1.0, 9.0], [3.0, 4.0]];
        assert_eq!(focal_mean(&data, 0.5), data);
    }

    #[test]
    fn clip_outside_raster_is_an_error() {
        let raster = Raster::new(Array2::zeros((4, 4)), [0.0, 1.0, 0.0, 4.0, 0.0, -1.0]);
        let roi = Roi::new(40.0, 41.0, 40.0, 41.0).unwrap();
        assert!(matches!(clip_to_roi(&raster, &roi), Err(Error::Processing(_))));
    }

    #[test]
    fn preprocess_chain_rescales_and_clips() {
        let raster = Raster::new(
            Array2::from_elem((4, 4), 100.0),
            [0.0, 1.0, 0.0, 4.0, 0.0, -1.0],
        );
        let roi = Roi::new(0.0, 2.0, 0.0, 2.0).unwrap();
        let out = preprocess_band(&raster, &roi, DEFAULT_RESCALE, Some(1.5)).unwrap();
        assert_eq!(out.data.dim(), (2, 2));
        assert!(out.data.iter().all(|v| (v - 0.01).abs() < 1e-12));
        assert_eq!(out.geotransform[3], 2.0);
    }
}
