//! Core building blocks: calendar months, the region of interest, run parameters
//! and the raster kernels. Consumed by the platform implementations and the engine.
pub mod months;
pub mod params;
pub mod processing;
pub mod region;
