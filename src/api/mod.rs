//! High-level library API: authenticate and run an analysis in one call, then
//! export the result as GeoTIFFs, georeferenced quicklooks, a statistics CSV
//! and the presentation JSON. Prefer these entrypoints over the engine modules
//! when integrating DELTAVV.
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::months::YearMonth;
use crate::core::params::{AnalysisParams, AnalysisRequest};
use crate::core::processing::quicklook::build_quicklook;
use crate::core::processing::visualize::colorize;
use crate::engine::{AnalysisResult, MonthlyDeltaRecord, ProgressObserver, RunContext};
use crate::error::Result;
use crate::io::writers::jpeg::write_rgb_jpeg;
use crate::io::writers::metadata::{delta_metadata_fields, embed_tiff_metadata, write_json_sidecar};
use crate::io::writers::tiff::{wgs84_wkt, write_delta_tiff};
use crate::io::writers::worldfile::{write_prj_file, write_world_file};
use crate::platform::local::LocalPlatform;
use crate::platform::{ImageryPlatform, ServiceAccountCredentials, Session};
use crate::report::{PresentationData, stats_rows, write_csv};

/// Default quicklook long side in pixels
pub const DEFAULT_QUICKLOOK_SIZE: usize = 1024;

/// Open a scene catalog as a local platform.
pub fn open_catalog<P: AsRef<Path>>(catalog: P) -> Result<LocalPlatform> {
    LocalPlatform::from_catalog(catalog)
}

/// A finished run: the session it used, the validated request and the result.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub session: Session,
    pub request: AnalysisRequest,
    pub result: AnalysisResult,
}

/// Validate `params`, authenticate and run the whole analysis.
pub fn run_analysis<P: ImageryPlatform + ?Sized>(
    platform: &mut P,
    credentials: &ServiceAccountCredentials,
    params: &AnalysisParams,
    observer: &mut dyn ProgressObserver,
) -> Result<AnalysisRun> {
    let request = params.validate()?;
    let mut ctx = RunContext::new();
    let session = ctx.authenticate(platform, credentials)?.clone();
    let result = ctx.analyze(platform, &request, observer)?.clone();
    Ok(AnalysisRun {
        session,
        request,
        result,
    })
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    /// Months to export; `None` exports every recorded month.
    pub months: Option<Vec<YearMonth>>,
    /// Long side of the JPEG quicklooks; `None` keeps the native size.
    pub quicklook_size: Option<usize>,
    pub geotiff: bool,
    pub quicklook: bool,
}

impl ExportOptions {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
            months: None,
            quicklook_size: Some(DEFAULT_QUICKLOOK_SIZE),
            geotiff: true,
            quicklook: true,
        }
    }
}

/// Files written by `export_results`
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub geotiffs: Vec<PathBuf>,
    pub quicklooks: Vec<PathBuf>,
    pub sidecars: Vec<PathBuf>,
    pub csv: Option<PathBuf>,
    pub presentation: Option<PathBuf>,
}

impl ExportReport {
    pub fn file_count(&self) -> usize {
        self.geotiffs.len()
            + self.quicklooks.len()
            + self.sidecars.len()
            + usize::from(self.csv.is_some())
            + usize::from(self.presentation.is_some())
    }
}

fn month_stem(month: YearMonth) -> String {
    format!("delta_vv_{:04}_{:02}", month.year(), month.month())
}

fn export_month<P: ImageryPlatform + ?Sized>(
    platform: &P,
    session: &Session,
    result: &AnalysisResult,
    request: &AnalysisRequest,
    record: &MonthlyDeltaRecord,
    opts: &ExportOptions,
    report: &mut ExportReport,
) -> Result<()> {
    let raster = platform.raster(session, record.image)?;
    let vis = record.vis_params(request.vis_mode, request.sensitivity);
    let fields = delta_metadata_fields(record, &result.reference, &vis);
    let stem = month_stem(record.month);

    if opts.geotiff {
        let path = opts.output_dir.join(format!("{stem}.tif"));
        let mut ds = write_delta_tiff(&path, &raster)?;
        embed_tiff_metadata(&mut ds, &fields)?;
        drop(ds);
        info!("Wrote {:?}", path);
        report.geotiffs.push(path);
    }

    if opts.quicklook {
        let rgb = colorize(&raster.data, &vis);
        let ql = build_quicklook(
            rgb,
            raster.cols(),
            raster.rows(),
            raster.geotransform,
            opts.quicklook_size,
        )?;
        let path = opts.output_dir.join(format!("{stem}.jpg"));
        write_rgb_jpeg(&path, ql.cols, ql.rows, &ql.rgb)?;
        let wkt = wgs84_wkt()?;
        report.sidecars.push(write_world_file(&path, ql.geotransform)?);
        report.sidecars.push(write_prj_file(&path, &wkt)?);
        report
            .sidecars
            .push(write_json_sidecar(&path, &fields, ql.geotransform, "EPSG:4326")?);
        info!("Wrote {:?} ({}x{})", path, ql.cols, ql.rows);
        report.quicklooks.push(path);
    }
    Ok(())
}

/// Export rasters, statistics and presentation data for a finished analysis.
///
/// Requested months without a record are skipped with a warning. Statistics and
/// presentation files are written even when the result is empty.
pub fn export_results<P: ImageryPlatform + ?Sized>(
    platform: &P,
    session: &Session,
    result: &AnalysisResult,
    request: &AnalysisRequest,
    opts: &ExportOptions,
) -> Result<ExportReport> {
    std::fs::create_dir_all(&opts.output_dir)?;
    let mut report = ExportReport::default();

    let selected: Vec<&MonthlyDeltaRecord> = match &opts.months {
        None => result.records.iter().collect(),
        Some(months) => months
            .iter()
            .filter_map(|m| {
                let record = result.record(*m);
                if record.is_none() {
                    warn!("No delta record for {}, not exported", m);
                }
                record
            })
            .collect(),
    };

    for record in selected {
        export_month(platform, session, result, request, record, opts, &mut report)?;
    }

    let csv_path = opts.output_dir.join("delta_vv_stats.csv");
    write_csv(&csv_path, &stats_rows(result))?;
    report.csv = Some(csv_path);

    let presentation = PresentationData::build(
        result,
        opts.months.as_deref(),
        request.vis_mode,
        request.sensitivity,
    );
    let json_path = opts.output_dir.join("presentation.json");
    std::fs::write(&json_path, presentation.to_json()?)?;
    report.presentation = Some(json_path);

    info!(
        "Exported {} files to {:?}",
        report.file_count(),
        opts.output_dir
    );
    Ok(report)
}
