use ndarray::{Array2, s};

use crate::core::region::Roi;
use crate::error::{Error, Result};

const METERS_PER_DEGREE_LAT: f64 = 110_574.0;
const METERS_PER_DEGREE_LON_EQUATOR: f64 = 111_320.0;

/// Inclusive pixel window `[row0, row1] x [col0, col1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub row0: usize,
    pub row1: usize,
    pub col0: usize,
    pub col1: usize,
}

impl PixelWindow {
    pub fn rows(&self) -> usize {
        self.row1 - self.row0 + 1
    }

    pub fn cols(&self) -> usize {
        self.col1 - self.col0 + 1
    }
}

/// Single-band georeferenced raster in EPSG:4326. Masked pixels are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub data: Array2<f64>,
    /// GDAL affine coefficients ([origin_lon, pixel_width, rot_x, origin_lat, rot_y, pixel_height])
    pub geotransform: [f64; 6],
}

impl Raster {
    pub fn new(data: Array2<f64>, geotransform: [f64; 6]) -> Self {
        Self { data, geotransform }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn is_north_up(&self) -> bool {
        self.geotransform[2] == 0.0 && self.geotransform[4] == 0.0
    }

    /// (lat, lon) of a pixel centre
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        let gt = &self.geotransform;
        let x = col as f64 + 0.5;
        let y = row as f64 + 0.5;
        let lon = gt[0] + x * gt[1] + y * gt[2];
        let lat = gt[3] + x * gt[4] + y * gt[5];
        (lat, lon)
    }

    /// Nominal ground sampling distance, averaged over both axes.
    pub fn pixel_size_m(&self) -> f64 {
        let gt = &self.geotransform;
        let (lat_c, _) = self.pixel_center(self.rows() / 2, self.cols() / 2);
        let dx = gt[1].abs() * METERS_PER_DEGREE_LON_EQUATOR * lat_c.to_radians().cos();
        let dy = gt[5].abs() * METERS_PER_DEGREE_LAT;
        (dx + dy) / 2.0
    }

    /// Outer edges of the raster as a region.
    pub fn bounds(&self) -> Result<Roi> {
        let gt = &self.geotransform;
        let (w, h) = (self.cols() as f64, self.rows() as f64);
        let lons = [gt[0], gt[0] + w * gt[1] + h * gt[2]];
        let lats = [gt[3], gt[3] + w * gt[4] + h * gt[5]];
        Roi::new(
            lats[0].min(lats[1]),
            lats[0].max(lats[1]),
            lons[0].min(lons[1]),
            lons[0].max(lons[1]),
        )
    }

    pub fn same_grid(&self, other: &Raster) -> bool {
        self.data.dim() == other.data.dim()
            && self
                .geotransform
                .iter()
                .zip(other.geotransform.iter())
                .all(|(a, b)| (a - b).abs() <= 1e-9 * a.abs().max(1.0))
    }

    /// Pixels whose centres fall inside the ROI, or `None` when the ROI misses the raster.
    pub fn roi_window(&self, roi: &Roi) -> Option<PixelWindow> {
        if self.rows() == 0 || self.cols() == 0 || !self.is_north_up() {
            return None;
        }
        let gt = &self.geotransform;
        let eps = 1e-9;

        let col_a = (roi.lon_min() - gt[0]) / gt[1] - 0.5;
        let col_b = (roi.lon_max() - gt[0]) / gt[1] - 0.5;
        let row_a = (roi.lat_max() - gt[3]) / gt[5] - 0.5;
        let row_b = (roi.lat_min() - gt[3]) / gt[5] - 0.5;

        let col0 = (col_a.min(col_b) - eps).ceil().max(0.0);
        let col1 = (col_a.max(col_b) + eps).floor().min(self.cols() as f64 - 1.0);
        let row0 = (row_a.min(row_b) - eps).ceil().max(0.0);
        let row1 = (row_a.max(row_b) + eps).floor().min(self.rows() as f64 - 1.0);

        if col0 > col1 || row0 > row1 {
            return None;
        }
        Some(PixelWindow {
            row0: row0 as usize,
            row1: row1 as usize,
            col0: col0 as usize,
            col1: col1 as usize,
        })
    }

    pub fn crop(&self, w: PixelWindow) -> Result<Raster> {
        if w.row1 >= self.rows() || w.col1 >= self.cols() || w.row0 > w.row1 || w.col0 > w.col1 {
            return Err(Error::Processing(format!(
                "window {:?} outside raster {}x{}",
                w,
                self.cols(),
                self.rows()
            )));
        }
        let data = self
            .data
            .slice(s![w.row0..=w.row1, w.col0..=w.col1])
            .to_owned();
        let mut gt = self.geotransform;
        gt[0] += w.col0 as f64 * gt[1] + w.row0 as f64 * gt[2];
        gt[3] += w.col0 as f64 * gt[4] + w.row0 as f64 * gt[5];
        Ok(Raster::new(data, gt))
    }

    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_finite()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: usize, cols: usize) -> Raster {
        // 0.001 degree pixels, origin at (lat 34.0, lon -8.0)
        let data = Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f64);
        Raster::new(data, [-8.0, 0.001, 0.0, 34.0, 0.0, -0.001])
    }

    #[test]
    fn window_selects_pixel_centres_inside_roi() {
        let r = grid(100, 100);
        // Covers pixel centres at lon -7.9895..-7.9805 (cols 10..=19) and lat 33.9895..33.9805 (rows 10..=19)
        let roi = Roi::new(33.9800, 33.9900, -7.9900, -7.9800).unwrap();
        let w = r.roi_window(&roi).unwrap();
        assert_eq!((w.row0, w.row1, w.col0, w.col1), (10, 19, 10, 19));

        let cropped = r.crop(w).unwrap();
        assert_eq!(cropped.data.dim(), (10, 10));
        assert_eq!(cropped.data[(0, 0)], (10 * 100 + 10) as f64);
        let (lat, lon) = cropped.pixel_center(0, 0);
        assert!((lat - 33.9895).abs() < 1e-9);
        assert!((lon - -7.9895).abs() < 1e-9);
    }

    #[test]
    fn window_is_clamped_and_misses_are_none() {
        let r = grid(10, 10);
        let big = Roi::new(33.0, 35.0, -9.0, -7.0).unwrap();
        let w = r.roi_window(&big).unwrap();
        assert_eq!((w.rows(), w.cols()), (10, 10));

        let far = Roi::new(10.0, 11.0, 10.0, 11.0).unwrap();
        assert!(r.roi_window(&far).is_none());
    }

    #[test]
    fn pixel_size_is_roughly_one_hundred_meters() {
        let r = grid(10, 10);
        let size = r.pixel_size_m();
        assert!(size > 95.0 && size < 115.0, "{size}");
    }

    #[test]
    fn bounds_cover_outer_edges() {
        let b = grid(10, 20).bounds().unwrap();
        assert!((b.lat_min() - 33.99).abs() < 1e-9);
        assert!((b.lat_max() - 34.0).abs() < 1e-9);
        assert!((b.lon_min() - -8.0).abs() < 1e-9);
        assert!((b.lon_max() - -7.98).abs() < 1e-9);
    }

    #[test]
    fn grid_comparison() {
        let a = grid(4, 4);
        let mut b = grid(4, 4);
        assert!(a.same_grid(&b));
        b.geotransform[0] += 0.5;
        assert!(!a.same_grid(&b));
        assert!(!a.same_grid(&grid(4, 5)));
    }
}
