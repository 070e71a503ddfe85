use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Target dimensions keeping the aspect ratio, with `target_size` on the long side.
/// Never upscales.
pub fn calculate_resize_dimensions(
    original_cols: usize,
    original_rows: usize,
    target_size: usize,
) -> (usize, usize) {
    let short_side = original_rows.min(original_cols);
    let long_side = original_rows.max(original_cols);

    if target_size >= long_side || target_size == 0 {
        if target_size > long_side {
            warn!(
                "Quicklook size {} exceeds long side {}; keeping {}x{}",
                target_size, long_side, original_cols, original_rows
            );
        }
        return (original_cols, original_rows);
    }

    let scale_factor = target_size as f64 / long_side as f64;
    let new_short_side = ((short_side as f64 * scale_factor).round() as usize).max(1);

    if original_cols > original_rows {
        (target_size, new_short_side)
    } else {
        (new_short_side, target_size)
    }
}

/// An interleaved RGB image plus the georeferencing that matches its pixels.
#[derive(Debug, Clone)]
pub struct Quicklook {
    pub cols: usize,
    pub rows: usize,
    pub rgb: Vec<u8>,
    pub geotransform: [f64; 6],
}

fn resize_rgb(
    data: &[u8],
    original_cols: usize,
    original_rows: usize,
    target_cols: usize,
    target_rows: usize,
) -> Result<Vec<u8>> {
    let resize_options =
        ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));
    let mut resizer = Resizer::new();

    let src_image = Image::from_vec_u8(
        original_cols as u32,
        original_rows as u32,
        data.to_vec(),
        PixelType::U8x3,
    )
    .map_err(Error::external)?;
    let mut dst_image = Image::new(target_cols as u32, target_rows as u32, PixelType::U8x3);
    resizer
        .resize(&src_image, &mut dst_image, &resize_options)
        .map_err(Error::external)?;

    Ok(dst_image.into_vec())
}

/// Downscale an RGB quicklook so its long side is `target_size`, adjusting the pixel size.
pub fn build_quicklook(
    rgb: Vec<u8>,
    cols: usize,
    rows: usize,
    geotransform: [f64; 6],
    target_size: Option<usize>,
) -> Result<Quicklook> {
    if rgb.len() != cols * rows * 3 {
        return Err(Error::Processing(format!(
            "RGB buffer holds {} bytes, expected {} for {}x{}",
            rgb.len(),
            cols * rows * 3,
            cols,
            rows
        )));
    }
    let Some(size) = target_size else {
        return Ok(Quicklook {
            cols,
            rows,
            rgb,
            geotransform,
        });
    };

    let (new_cols, new_rows) = calculate_resize_dimensions(cols, rows, size);
    if (new_cols, new_rows) == (cols, rows) {
        return Ok(Quicklook {
            cols,
            rows,
            rgb,
            geotransform,
        });
    }
    info!(
        "Quicklook resize: {}x{} -> {}x{}",
        cols, rows, new_cols, new_rows
    );

    let resized = resize_rgb(&rgb, cols, rows, new_cols, new_rows)?;
    let scale_x = new_cols as f64 / cols as f64;
    let scale_y = new_rows as f64 / rows as f64;
    let mut gt = geotransform;
    gt[1] /= scale_x;
    gt[2] /= scale_y;
    gt[4] /= scale_x;
    gt[5] /= scale_y;

    Ok(Quicklook {
        cols: new_cols,
        rows: new_rows,
        rgb: resized,
        geotransform: gt,
    })
}
