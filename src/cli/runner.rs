use std::ops::ControlFlow;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{info, warn};

use deltavv::api::{ExportOptions, export_results, open_catalog, run_analysis};
use deltavv::engine::{MonthStatus, Progress};
use deltavv::logging::init_logging;
use deltavv::{AnalysisParams, ServiceAccountCredentials, YearMonth};

use super::args::CliArgs;
use super::errors::AppError;

fn parse_month(arg: &'static str, value: &str) -> Result<YearMonth, AppError> {
    value.parse().map_err(|e: deltavv::Error| AppError::InvalidValue {
        arg,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_date(arg: &'static str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| AppError::InvalidValue {
        arg,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_quicklook_size(size: &str) -> Result<Option<usize>, AppError> {
    if size == "original" {
        return Ok(None);
    }
    let parsed = size.parse::<usize>().map_err(|_| AppError::InvalidSize {
        size: size.to_string(),
    })?;
    if parsed == 0 {
        return Err(AppError::ZeroSize { size: parsed });
    }
    Ok(Some(parsed))
}

/// Config file (or defaults) with the command-line overrides applied.
fn resolve_params(args: &CliArgs) -> Result<AnalysisParams, AppError> {
    let mut params = match &args.config {
        Some(path) => AnalysisParams::from_json_file(path)?,
        None => AnalysisParams::default(),
    };

    if let Some(v) = args.lat_min {
        params.roi.lat_min = v;
    }
    if let Some(v) = args.lat_max {
        params.roi.lat_max = v;
    }
    if let Some(v) = args.lon_min {
        params.roi.lon_min = v;
    }
    if let Some(v) = args.lon_max {
        params.roi.lon_max = v;
    }
    if let Some(v) = &args.start {
        params.start = parse_month("--start", v)?;
    }
    if let Some(v) = &args.end {
        params.end = parse_month("--end", v)?;
    }
    if let Some(v) = &args.ref_start {
        params.reference_start = parse_date("--ref-start", v)?;
    }
    if let Some(v) = &args.ref_end {
        params.reference_end = parse_date("--ref-end", v)?;
    }
    if let Some(v) = args.sensitivity {
        params.sensitivity = v;
    }
    if let Some(v) = args.vis_mode {
        params.vis_mode = v;
    }
    if let Some(v) = args.filter_mode {
        params.filter_mode = v;
    }
    if let Some(v) = args.timeout_secs {
        params.request_timeout_secs = Some(v);
    }
    if let Some(v) = args.retries {
        params.retry.max_retries = v;
    }
    Ok(params)
}

fn log_progress(p: &Progress<'_>) -> ControlFlow<()> {
    let pct = p.fraction() * 100.0;
    match p.status {
        MonthStatus::Recorded => info!("[{:>5.1}%] {} recorded", pct, p.month),
        MonthStatus::NoData => warn!("[{:>5.1}%] {} has no imagery, skipped", pct, p.month),
        MonthStatus::Failed { reason } => {
            warn!("[{:>5.1}%] {} failed: {}", pct, p.month, reason)
        }
    }
    ControlFlow::Continue(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let log_buffer = if args.log || args.log_file.is_some() {
        Some(init_logging(if args.log { "debug" } else { "info" }))
    } else {
        None
    };

    let catalog = args.catalog.clone().ok_or(AppError::MissingArgument {
        arg: "--catalog".to_string(),
    })?;
    let credentials_path = args.credentials.clone().ok_or(AppError::MissingArgument {
        arg: "--credentials".to_string(),
    })?;
    let output_dir: PathBuf = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("deltavv_output"));

    let params = resolve_params(&args)?;
    let months = args
        .layers
        .iter()
        .map(|m| parse_month("--layers", m))
        .collect::<Result<Vec<_>, _>>()?;
    let quicklook_size = parse_quicklook_size(&args.quicklook_size)?;

    let credentials = ServiceAccountCredentials::from_file(&credentials_path)?;
    let mut platform = open_catalog(&catalog)?;
    info!(
        "Loaded {} scenes from {:?}",
        platform.scenes().len(),
        catalog
    );

    let mut observer = log_progress;
    let run = run_analysis(&mut platform, &credentials, &params, &mut observer)?;
    let result = &run.result;

    if let Some(reason) = result.empty_reason() {
        warn!("No change layers to export: {}", reason);
    }

    let mut export = ExportOptions::new(&output_dir);
    export.months = (!months.is_empty()).then_some(months);
    export.quicklook_size = quicklook_size;
    export.geotiff = !args.no_geotiff;
    let report = export_results(&platform, &run.session, result, &run.request, &export)?;

    println!(
        "{} of {} months recorded; {} files written to {}",
        result.records.len(),
        result.requested_months,
        report.file_count(),
        output_dir.display()
    );
    if let Some(notice) = result.soft_error_summary() {
        println!("{}", notice);
    }

    if let (Some(buffer), Some(path)) = (log_buffer, &args.log_file) {
        buffer.write_to(path)?;
    }
    Ok(())
}
