#![doc = r#"
DELTAVV: monthly Sentinel-1 VV backscatter change detection.

For a region of interest this crate builds a median VV composite over a
reference period, then for every month in a range builds the month's median
composite and subtracts the reference. Each month yields a delta raster with
percentile and summary statistics; months without imagery are skipped and
reported, never fatal. The results drive map layers with adaptive colour
ranges, a time series, a statistics table and file exports.

Imagery access goes through the [`platform::ImageryPlatform`] trait. The crate
ships [`platform::LocalPlatform`], which serves co-registered GeoTIFF scenes
listed in a JSON catalog (or in-memory scenes in tests).

Requirements
------------
- GDAL development headers and runtime available on your system.
- Rust 2024 edition toolchain.

Quick start
-----------
```rust,no_run
use deltavv::api::{ExportOptions, export_results, open_catalog, run_analysis};
use deltavv::engine::NoopObserver;
use deltavv::{AnalysisParams, ServiceAccountCredentials};

fn main() -> deltavv::Result<()> {
    let mut platform = open_catalog("/data/scenes/catalog.json")?;
    let credentials = ServiceAccountCredentials::from_file("/secrets/service-account.json")?;
    let params = AnalysisParams::default();

    let run = run_analysis(&mut platform, &credentials, &params, &mut NoopObserver)?;
    println!("{} months recorded", run.result.records.len());

    let opts = ExportOptions::new("/out/deltavv");
    export_results(&platform, &run.session, &run.result, &run.request, &opts)?;
    Ok(())
}
```

Observing progress
------------------
Any `FnMut(&Progress) -> ControlFlow<()>` is a [`engine::ProgressObserver`];
returning `ControlFlow::Break(())` stops the run after the current month and
the partial result is marked cancelled.

```rust,no_run
use std::ops::ControlFlow;
use deltavv::engine::{Progress, RunContext};
use deltavv::platform::LocalPlatform;
use deltavv::AnalysisParams;

fn run(platform: &mut LocalPlatform, credentials_json: &str) -> deltavv::Result<()> {
    let mut ctx = RunContext::new();
    ctx.authenticate_json(platform, credentials_json)?;
    let request = AnalysisParams::default().validate()?;
    let mut observer = |p: &Progress<'_>| {
        println!("{:.0}% {}", p.fraction() * 100.0, p.month);
        ControlFlow::Continue(())
    };
    let result = ctx.analyze(platform, &request, &mut observer)?;
    if let Some(notice) = result.soft_error_summary() {
        eprintln!("{notice}");
    }
    Ok(())
}
```
"#]

pub mod api;
pub mod core;
pub mod engine;
pub mod error;
pub mod io;
pub mod logging;
pub mod platform;
pub mod report;
pub mod types;

// Curated public API surface
pub use core::months::{DateInterval, MonthRange, YearMonth};
pub use core::params::{AnalysisParams, AnalysisRequest};
pub use core::region::{Roi, RoiBounds};
pub use error::{AuthError, Error, Result};
pub use types::{FilterMode, InstrumentMode, OrbitPass, Polarization, Sensitivity, VisMode};

pub use engine::{AnalysisResult, MonthStatus, MonthlyDeltaRecord, RunContext, analyze};
pub use platform::{ImageryPlatform, LocalPlatform, ServiceAccountCredentials, Session};
pub use report::PresentationData;

pub use api::{
    AnalysisRun, ExportOptions, ExportReport, export_results, open_catalog, run_analysis,
};
