use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::processing::raster::Raster;
use crate::core::region::Roi;
use crate::error::{Error, Result};

/// Spatial reduction settings: sampling scale and pixel budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReductionSpec {
    /// Sampling resolution in metres
    pub scale_m: f64,
    /// Upper bound on sampled pixels; the sampling stride grows to honour it
    pub max_pixels: u64,
}

impl Default for ReductionSpec {
    fn default() -> Self {
        Self {
            scale_m: 10.0,
            max_pixels: 1_000_000_000,
        }
    }
}

impl ReductionSpec {
    pub fn validate(&self) -> Result<()> {
        if !(self.scale_m.is_finite() && self.scale_m > 0.0) {
            return Err(Error::InvalidArgument {
                arg: "scale_m",
                value: self.scale_m.to_string(),
            });
        }
        if self.max_pixels == 0 {
            return Err(Error::InvalidArgument {
                arg: "max_pixels",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Percentile summary of a delta raster inside the ROI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileStats {
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

/// Distribution summary used by the time-series chart and the statistics table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaSummary {
    pub pixel_count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

/// Running moments plus the sorted sample for exact order statistics.
/// The sample is already capped by the pixel budget, so sorting it is bounded.
struct SortedSample {
    mean: f64,
    m2: f64,
    sorted: Vec<f64>,
}

impl SortedSample {
    /// Welford moments over the finite values, then one sort.
    fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }

        let mut mean = 0.0_f64;
        let mut m2 = 0.0_f64;
        for (i, &v) in sorted.iter().enumerate() {
            let delta = v - mean;
            mean += delta / (i + 1) as f64;
            m2 += delta * (v - mean);
        }
        sorted.sort_unstable_by(f64::total_cmp);

        Some(Self { mean, m2, sorted })
    }

    fn count(&self) -> usize {
        self.sorted.len()
    }

    fn min(&self) -> f64 {
        self.sorted[0]
    }

    fn max(&self) -> f64 {
        self.sorted[self.sorted.len() - 1]
    }

    fn std_dev(&self) -> f64 {
        if self.count() > 1 {
            (self.m2 / self.count() as f64).sqrt()
        } else {
            0.0
        }
    }

    /// Order statistic at rank `floor(p * n)`, `p` in [0, 1].
    fn percentile(&self, p: f64) -> f64 {
        let n = self.count();
        let rank = ((p.clamp(0.0, 1.0) * n as f64).floor() as usize).min(n - 1);
        self.sorted[rank]
    }
}

pub fn percentiles(values: &[f64]) -> Option<PercentileStats> {
    let s = SortedSample::from_values(values)?;
    Some(PercentileStats {
        p5: s.percentile(0.05),
        p25: s.percentile(0.25),
        p50: s.percentile(0.50),
        p75: s.percentile(0.75),
        p95: s.percentile(0.95),
    })
}

pub fn summarize(values: &[f64]) -> Option<DeltaSummary> {
    let s = SortedSample::from_values(values)?;
    Some(DeltaSummary {
        pixel_count: s.count(),
        mean: s.mean,
        std_dev: s.std_dev(),
        min: s.min(),
        max: s.max(),
        p10: s.percentile(0.10),
        p25: s.percentile(0.25),
        p50: s.percentile(0.50),
        p75: s.percentile(0.75),
        p90: s.percentile(0.90),
    })
}

/// Pixels visited when a `rows` x `cols` window is walked every `stride` pixels.
fn sampled_pixels(rows: usize, cols: usize, stride: usize) -> u64 {
    (rows.div_ceil(stride) as u64) * (cols.div_ceil(stride) as u64)
}

/// Pixel step that honours both the sampling scale and the pixel budget.
pub fn sampling_stride(raster: &Raster, rows: usize, cols: usize, spec: &ReductionSpec) -> usize {
    let pixel_m = raster.pixel_size_m();
    let mut stride = if pixel_m > 0.0 && pixel_m.is_finite() {
        (spec.scale_m / pixel_m).round().max(1.0) as usize
    } else {
        1
    };
    let budget = spec.max_pixels.max(1);
    if sampled_pixels(rows, cols, stride) > budget {
        let area = (rows as f64) * (cols as f64);
        stride = stride.max((area / budget as f64).sqrt().ceil() as usize);
        // Terminates: at stride >= max(rows, cols) a single pixel is visited
        while sampled_pixels(rows, cols, stride) > budget {
            stride += 1;
        }
    }
    stride
}

/// Finite pixel values inside `roi`, taken every `stride` rows and columns.
pub fn sample_region(raster: &Raster, roi: &Roi, spec: &ReductionSpec) -> Vec<f64> {
    let Some(window) = raster.roi_window(roi) else {
        return Vec::new();
    };
    let stride = sampling_stride(raster, window.rows(), window.cols(), spec);
    debug!(
        "Region reduction: {}x{} window, stride {}",
        window.cols(),
        window.rows(),
        stride
    );

    let mut values = Vec::new();
    for r in (window.row0..=window.row1).step_by(stride) {
        for c in (window.col0..=window.col1).step_by(stride) {
            let v = raster.data[(r, c)];
            if v.is_finite() {
                values.push(v);
            }
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn ramp() -> Vec<f64> {
        (0..=100).map(|v| v as f64).collect()
    }

    #[test]
    fn percentiles_of_a_ramp() {
        let p = percentiles(&ramp()).unwrap();
        assert_eq!(p.p5, 5.0);
        assert_eq!(p.p25, 25.0);
        assert_eq!(p.p50, 50.0);
        assert_eq!(p.p75, 75.0);
        assert_eq!(p.p95, 95.0);
    }

    #[test]
    fn bright_outlier_leaves_percentiles_in_place() {
        // 999 values spread over [-0.01, 0.01] plus one strong scatterer
        let mut values: Vec<f64> = (0..999).map(|i| -0.01 + 0.02 * i as f64 / 998.0).collect();
        values.push(100.0);
        let at = |i: usize| -0.01 + 0.02 * i as f64 / 998.0;

        let p = percentiles(&values).unwrap();
        assert_eq!(p.p5, at(50));
        assert_eq!(p.p25, at(250));
        assert_eq!(p.p50, at(500));
        assert_eq!(p.p75, at(750));
        assert_eq!(p.p95, at(950));
        assert!(p.p95 < 0.01);

        let s = summarize(&values).unwrap();
        assert_eq!(s.max, 100.0);
        assert_eq!(s.p90, at(900));
        assert!(s.mean > 0.09);
    }

    #[test]
    fn skewed_distribution() {
        // Mostly unchanged pixels with a tail of strong decreases
        let mut values = vec![0.0; 900];
        values.extend((1..=100).map(|i| -0.001 * i as f64));
        let p = percentiles(&values).unwrap();
        assert!((p.p5 - (-0.05)).abs() < 1e-12, "{:?}", p);
        assert_eq!(p.p25, 0.0);
        assert_eq!(p.p50, 0.0);
        assert_eq!(p.p95, 0.0);
    }

    #[test]
    fn summary_moments() {
        let s = summarize(&[1.0, 2.0, 3.0, 4.0, f64::NAN]).unwrap();
        assert_eq!(s.pixel_count, 4);
        assert!((s.mean - 2.5).abs() < 1e-12);
        assert!((s.std_dev - 1.25f64.sqrt()).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
    }

    #[test]
    fn constant_and_empty_inputs() {
        let p = percentiles(&[0.01; 7]).unwrap();
        assert_eq!(p.p5, 0.01);
        assert_eq!(p.p95, 0.01);
        assert!(percentiles(&[]).is_none());
        assert!(percentiles(&[f64::NAN, f64::INFINITY]).is_none());
    }

    #[test]
    fn stride_follows_scale_then_budget() {
        // ~10 m pixels at the equator
        let gt = [0.0, 0.00009, 0.0, 0.0009, 0.0, -0.00009];
        let raster = Raster::new(Array2::zeros((10, 10)), gt);
        let spec = ReductionSpec::default();
        assert_eq!(sampling_stride(&raster, 10, 10, &spec), 1);

        let coarse = ReductionSpec {
            scale_m: 30.0,
            ..spec
        };
        assert_eq!(sampling_stride(&raster, 10, 10, &coarse), 3);

        let tight = ReductionSpec {
            scale_m: 10.0,
            max_pixels: 25,
        };
        let stride = sampling_stride(&raster, 10, 10, &tight);
        assert_eq!(stride, 2);
    }

    #[test]
    fn budget_holds_for_elongated_windows() {
        let gt = [0.0, 0.00009, 0.0, 0.0009, 0.0, -0.00009];
        let raster = Raster::new(Array2::zeros((1, 100)), gt);
        let tight = ReductionSpec {
            scale_m: 10.0,
            max_pixels: 10,
        };
        let stride = sampling_stride(&raster, 1, 100, &tight);
        assert_eq!(stride, 10);
        assert!(sampled_pixels(1, 100, stride) <= 10);

        for (rows, cols, budget) in [(3, 1000, 50), (1000, 2, 7), (17, 230, 100)] {
            let spec = ReductionSpec {
                scale_m: 10.0,
                max_pixels: budget,
            };
            let s = sampling_stride(&raster, rows, cols, &spec);
            assert!(sampled_pixels(rows, cols, s) <= budget, "{rows}x{cols} stride {s}");
        }
    }

    #[test]
    fn corridor_sample_stays_within_budget() {
        let gt = [0.0, 0.00009, 0.0, 0.0009, 0.0, -0.00009];
        let raster = Raster::new(Array2::from_elem((2, 200), 0.5), gt);
        let corridor = raster.bounds().unwrap();
        let spec = ReductionSpec {
            scale_m: 10.0,
            max_pixels: 20,
        };
        let sampled = sample_region(&raster, &corridor, &spec);
        assert!(!sampled.is_empty());
        assert!(sampled.len() <= 20, "{}", sampled.len());
    }

    #[test]
    fn sampling_respects_budget_and_mask() {
        let gt = [0.0, 0.00009, 0.0, 0.0009, 0.0, -0.00009];
        let mut data = Array2::from_elem((10, 10), 1.0);
        data[(0, 0)] = f64::NAN;
        let raster = Raster::new(data, gt);
        let roi = Roi::new(-0.001, 0.001, -0.001, 0.001).unwrap();

        let all = sample_region(&raster, &roi, &ReductionSpec::default());
        assert_eq!(all.len(), 99);

        let budget = ReductionSpec {
            scale_m: 10.0,
            max_pixels: 30,
        };
        let sampled = sample_region(&raster, &roi, &budget);
        assert!(sampled.len() <= 30, "{}", sampled.len());
        assert!(!sampled.is_empty());
    }

    #[test]
    fn invalid_specs() {
        assert!(ReductionSpec { scale_m: 0.0, max_pixels: 1 }.validate().is_err());
        assert!(ReductionSpec { scale_m: 10.0, max_pixels: 0 }.validate().is_err());
        assert!(ReductionSpec::default().validate().is_ok());
    }
}
