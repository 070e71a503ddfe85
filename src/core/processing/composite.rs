use ndarray::{Array2, Zip};

use crate::core::processing::raster::Raster;
use crate::error::{Error, Result};

/// Per-pixel median over a stack of co-registered rasters, ignoring NaN samples.
/// Even sample counts average the two middle values.
pub fn median_composite(stack: &[&Raster]) -> Result<Raster> {
    let first = stack
        .first()
        .ok_or_else(|| Error::Processing("cannot composite an empty stack".to_string()))?;
    if let Some(bad) = stack.iter().position(|r| !r.same_grid(first)) {
        return Err(Error::Processing(format!(
            "raster {} is not on the same grid as the first raster",
            bad
        )));
    }

    let mut out = Array2::<f64>::from_elem(first.data.dim(), f64::NAN);
    Zip::indexed(&mut out).par_for_each(|(r, c), o| {
        let mut samples: Vec<f64> = stack
            .iter()
            .map(|raster| raster.data[(r, c)])
            .filter(|v| v.is_finite())
            .collect();
        if samples.is_empty() {
            return;
        }
        samples.sort_by(|a, b| a.total_cmp(b));
        let n = samples.len();
        *o = if n % 2 == 1 {
            samples[n / 2]
        } else {
            (samples[n / 2 - 1] + samples[n / 2]) / 2.0
        };
    });

    Ok(Raster::new(out, first.geotransform))
}

/// Band-wise `minuend - subtrahend`; masked pixels propagate.
pub fn subtract(minuend: &Raster, subtrahend: &Raster) -> Result<Raster> {
    if !minuend.same_grid(subtrahend) {
        return Err(Error::Processing(format!(
            "grid mismatch: {}x{} vs {}x{}",
            minuend.cols(),
            minuend.rows(),
            subtrahend.cols(),
            subtrahend.rows()
        )));
    }
    Ok(Raster::new(
        &minuend.data - &subtrahend.data,
        minuend.geotransform,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const GT: [f64; 6] = [0.0, 1.0, 0.0, 2.0, 0.0, -1.0];

    #[test]
    fn median_of_odd_and_even_stacks() {
        let a = Raster::new(array![[1.0, 10.0], [f64::NAN, 0.0]], GT);
        let b = Raster::new(array![[3.0, 20.0], [f64::NAN, 4.0]], GT);
        let c = Raster::new(array![[2.0, f64::NAN], [f64::NAN, 8.0]], GT);

        let m = median_composite(&[&a, &b, &c]).unwrap();
        assert_eq!(m.data[(0, 0)], 2.0);
        assert_eq!(m.data[(0, 1)], 15.0);
        assert!(m.data[(1, 0)].is_nan());
        assert_eq!(m.data[(1, 1)], 4.0);
    }

    #[test]
    fn empty_and_mismatched_stacks_fail() {
        assert!(median_composite(&[]).is_err());
        let a = Raster::new(Array2::zeros((2, 2)), GT);
        let b = Raster::new(Array2::zeros((3, 2)), GT);
        assert!(median_composite(&[&a, &b]).is_err());
        assert!(subtract(&a, &b).is_err());
    }

    #[test]
    fn subtraction_is_pixelwise() {
        let a = Raster::new(array![[0.5, 0.2], [f64::NAN, 1.0]], GT);
        let b = Raster::new(array![[0.25, 0.2], [0.1, 2.0]], GT);
        let d = subtract(&a, &b).unwrap();
        assert_eq!(d.data[(0, 0)], 0.25);
        assert_eq!(d.data[(0, 1)], 0.0);
        assert!(d.data[(1, 0)].is_nan());
        assert_eq!(d.data[(1, 1)], -1.0);
    }
}
