use gdal::{Dataset, Metadata, errors::GdalError as GdalCrateError};
use ndarray::Array2;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::processing::raster::Raster;

/// Errors encountered when reading scene rasters through GDAL
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Band index {index} out of range (dataset has {bands})")]
    BandOutOfRange { index: usize, bands: usize },
    #[error("Dimension mismatch: expected {0}x{1}, got {2} values")]
    DimensionMismatch(usize, usize, usize),
}

impl From<GdalCrateError> for crate::error::Error {
    fn from(e: GdalCrateError) -> Self {
        crate::error::Error::Gdal(GdalError::Gdal(e))
    }
}

/// Dataset-level facts needed to place a scene on the map
#[derive(Debug, Clone)]
pub struct GeoTiffMetadata {
    pub size_x: usize,
    pub size_y: usize,
    pub bands: usize,
    /// Affine geotransform coefficients ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: [f64; 6],
    /// `EPSG:xxxx` when the WKT carries an authority, raw WKT otherwise
    pub projection: String,
    pub metadata: HashMap<String, String>,
}

/// Reader for co-registered scene GeoTIFFs
pub struct GeoTiffReader {
    pub dataset: Dataset,
    pub metadata: GeoTiffMetadata,
}

// Helper to extract EPSG code from WKT authority tag
fn parse_epsg(wkt: &str) -> Option<String> {
    const KEY: &str = "AUTHORITY[\"EPSG\",\"";
    let start = wkt.rfind(KEY)? + KEY.len();
    let end = wkt[start..].find('"')?;
    Some(format!("EPSG:{}", &wkt[start..start + end]))
}

impl GeoTiffReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GdalError> {
        let dataset = Dataset::open(path.as_ref())?;
        let (size_x, size_y) = dataset.raster_size();
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::UnsupportedFormat(format!(
                "{} has no raster bands",
                path.as_ref().display()
            )));
        }
        let geotransform = dataset.geo_transform().map_err(|_| {
            GdalError::UnsupportedFormat(format!(
                "{} is not georeferenced",
                path.as_ref().display()
            ))
        })?;
        let wkt = dataset.projection();
        let projection = parse_epsg(&wkt).unwrap_or(wkt);

        let mut metadata_map = HashMap::new();
        if let Some(entries) = dataset.metadata_domain("") {
            for entry in entries {
                if let Some((key, val)) = entry.split_once('=') {
                    metadata_map.insert(key.to_string(), val.to_string());
                }
            }
        }
        Ok(GeoTiffReader {
            dataset,
            metadata: GeoTiffMetadata {
                size_x: size_x as usize,
                size_y: size_y as usize,
                bands,
                geotransform,
                projection,
                metadata: metadata_map,
            },
        })
    }

    /// Read a band (1-based) with its nodata value masked to NaN.
    pub fn read_band(&self, index: usize) -> Result<Raster, GdalError> {
        if index == 0 || index > self.metadata.bands {
            return Err(GdalError::BandOutOfRange {
                index,
                bands: self.metadata.bands,
            });
        }
        let band = self.dataset.rasterband(index)?;
        let nodata = band.no_data_value();
        let window = (self.metadata.size_x, self.metadata.size_y);
        let buf = band.read_as::<f64>((0, 0), window, window, None)?;

        let values = buf.data().to_vec();
        let len = values.len();
        let mut data = Array2::from_shape_vec((self.metadata.size_y, self.metadata.size_x), values)
            .map_err(|_| GdalError::DimensionMismatch(self.metadata.size_x, self.metadata.size_y, len))?;
        if let Some(nd) = nodata {
            data.mapv_inplace(|v| if v == nd { f64::NAN } else { v });
        }
        Ok(Raster::new(data, self.metadata.geotransform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsg_is_taken_from_last_authority() {
        let wkt = r#"GEOGCS["WGS 84",DATUM["WGS_1984",AUTHORITY["EPSG","6326"]],AUTHORITY["EPSG","4326"]]"#;
        assert_eq!(parse_epsg(wkt).as_deref(), Some("EPSG:4326"));
        assert_eq!(parse_epsg("LOCAL_CS[\"x\"]"), None);
    }
}
