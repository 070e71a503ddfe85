use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use std::path::Path;

use crate::core::processing::raster::Raster;
use crate::error::Result;

/// Geographic WGS 84 as WKT
pub fn wgs84_wkt() -> Result<String> {
    Ok(SpatialRef::from_epsg(4326)?.to_wkt()?)
}

/// Single-band Float32 GeoTIFF with NaN as nodata, georeferenced in EPSG:4326.
pub fn write_delta_tiff(output: &Path, raster: &Raster) -> Result<Dataset> {
    let (cols, rows) = (raster.cols(), raster.rows());
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut ds = driver.create_with_band_type::<f32, _>(output, cols, rows, 1)?;
    ds.set_geo_transform(&raster.geotransform)?;
    ds.set_projection(&wgs84_wkt()?)?;

    let values: Vec<f32> = raster.data.iter().map(|&v| v as f32).collect();
    let mut buf = Buffer::new((cols, rows), values);
    let mut band = ds.rasterband(1)?;
    band.set_no_data_value(Some(f64::NAN))?;
    band.write((0, 0), (cols, rows), &mut buf)?;
    Ok(ds)
}
