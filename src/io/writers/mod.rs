//! Output writers: delta GeoTIFFs, JPEG quicklooks, world/prj files and metadata.
pub mod jpeg;
pub mod metadata;
pub mod tiff;
pub mod worldfile;
