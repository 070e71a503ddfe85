//! I/O layer: GDAL-backed scene reading, the scene catalog, and `writers`
//! for delta GeoTIFFs, quicklooks and metadata sidecars.
pub mod catalog;
pub use self::catalog::{SceneRecord, load_catalog};

pub mod gdal;
pub use self::gdal::{GdalError, GeoTiffMetadata, GeoTiffReader};

pub mod writers;
