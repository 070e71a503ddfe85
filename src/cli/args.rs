use clap::Parser;
use std::path::PathBuf;

use deltavv::{FilterMode, Sensitivity, VisMode};

#[derive(Parser, Debug)]
#[command(
    name = "deltavv",
    version,
    about = "Monthly Sentinel-1 VV backscatter change detection"
)]
pub struct CliArgs {
    /// Scene catalog (catalog.json) describing the available imagery
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Service-account credential JSON document
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// JSON file with analysis parameters; flags below override its fields
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Region of interest, degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat_min: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub lat_max: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub lon_min: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub lon_max: Option<f64>,

    /// First analysed month (YYYY-MM)
    #[arg(long)]
    pub start: Option<String>,

    /// Last analysed month (YYYY-MM), inclusive
    #[arg(long)]
    pub end: Option<String>,

    /// Reference period start (YYYY-MM-DD)
    #[arg(long)]
    pub ref_start: Option<String>,

    /// Reference period end (YYYY-MM-DD), exclusive
    #[arg(long)]
    pub ref_end: Option<String>,

    #[arg(long, value_enum)]
    pub sensitivity: Option<Sensitivity>,

    #[arg(long, value_enum)]
    pub vis_mode: Option<VisMode>,

    #[arg(long, value_enum)]
    pub filter_mode: Option<FilterMode>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Retries for transient platform failures
    #[arg(long)]
    pub retries: Option<u32>,

    /// Directory for GeoTIFFs, quicklooks, CSV and presentation JSON
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Months to export and display (YYYY-MM, comma separated); default all recorded
    #[arg(long, value_delimiter = ',')]
    pub layers: Vec<String>,

    /// Quicklook long side in pixels, or "original"
    #[arg(long, default_value = "1024")]
    pub quicklook_size: String,

    /// Skip the Float32 delta GeoTIFFs
    #[arg(long, default_value_t = false)]
    pub no_geotiff: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Save the run log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
