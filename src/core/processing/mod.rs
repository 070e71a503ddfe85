//! Raster kernels behind the local imagery platform and the exporters.
pub mod composite;
pub mod preprocess;
pub mod quicklook;
pub mod raster;
pub mod stats;
pub mod visualize;

pub use composite::{median_composite, subtract};
pub use preprocess::{DEFAULT_RESCALE, DEFAULT_SPECKLE_RADIUS_PX, preprocess_band};
pub use raster::{PixelWindow, Raster};
pub use stats::{DeltaSummary, PercentileStats, ReductionSpec};
pub use visualize::{VisParams, adaptive_vis_params, vis_params_for_mode};
