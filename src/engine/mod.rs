//! Temporal delta analysis: reference composite, per-month deltas, aggregation.
//!
//! `analyze` is the single entry point. It builds the reference once, then walks
//! the requested months in order. A month without imagery is skipped, a month
//! whose platform calls keep failing is recorded as failed, and neither stops
//! the run. A missing reference or a lost session aborts it.
use tracing::{debug, info, warn};

use crate::core::params::AnalysisRequest;
use crate::error::Result;
use crate::platform::{
    FilterSpec, ImageryPlatform, PreprocessSpec, RasterHandle, RequestOptions, Session,
};

pub mod aggregate;
pub mod context;
pub mod monthly;
pub mod reference;
pub mod retry;

pub use aggregate::{
    AnalysisResult, Aggregator, EmptyReason, MonthOutcome, MonthStatus, NoopObserver, Progress,
    ProgressObserver,
};
pub use context::RunContext;
pub use monthly::{MonthlyDeltaEngine, MonthlyDeltaRecord};
pub use reference::{Reference, ReferenceCompositor, ReferenceInfo};
pub use retry::RetryPolicy;

pub(crate) enum CompositeOutcome {
    Empty,
    Built {
        handle: RasterHandle,
        image_count: usize,
    },
}

/// Query, preprocess each scene, median-reduce. Scene and per-scene rasters
/// are released once the composite exists, or when any step fails.
pub(crate) fn composite<P: ImageryPlatform + ?Sized>(
    platform: &mut P,
    session: &Session,
    filter: &FilterSpec,
    preprocess: &PreprocessSpec,
    opts: &RequestOptions,
) -> Result<CompositeOutcome> {
    let scenes = platform.query(session, filter, opts)?;
    if scenes.is_empty() {
        return Ok(CompositeOutcome::Empty);
    }
    let mut processed = Vec::with_capacity(scenes.len());
    let built = median_of_scenes(
        platform,
        session,
        &scenes,
        filter,
        preprocess,
        opts,
        &mut processed,
    );

    let released = platform
        .release(session, &scenes)
        .and_then(|()| platform.release(session, &processed));
    let handle = built?;
    released?;
    Ok(CompositeOutcome::Built {
        handle,
        image_count: scenes.len(),
    })
}

fn median_of_scenes<P: ImageryPlatform + ?Sized>(
    platform: &mut P,
    session: &Session,
    scenes: &[RasterHandle],
    filter: &FilterSpec,
    preprocess: &PreprocessSpec,
    opts: &RequestOptions,
    processed: &mut Vec<RasterHandle>,
) -> Result<RasterHandle> {
    for scene in scenes {
        processed.push(platform.preprocess(session, *scene, preprocess, &filter.roi, opts)?);
    }
    platform.median(session, processed, opts)
}

pub fn analyze<P: ImageryPlatform + ?Sized>(
    platform: &mut P,
    session: &Session,
    request: &AnalysisRequest,
    observer: &mut dyn ProgressObserver,
) -> Result<AnalysisResult> {
    let months = request.months()?;
    let total = months.len();
    let preprocess = PreprocessSpec::for_filter_mode(request.filter_mode);
    info!(
        "Analyzing {} months ({}..{}) over {} ({:.2} km2)",
        total,
        request.start,
        request.end,
        request.roi,
        request.roi.area_km2()
    );

    let compositor = ReferenceCompositor::new(request.roi, request.reference, preprocess);
    let reference = request
        .retry
        .run("reference composite", || {
            compositor.build(&mut *platform, session, &request.options)
        })?;

    let engine = MonthlyDeltaEngine::new(request.roi, &reference, preprocess, request.reduction);
    let mut aggregator = Aggregator::new(request.roi, reference.info.clone(), total);
    let mut cancelled = false;

    for month in months {
        debug!("Processing {}", month);
        let outcome = request.retry.run(&format!("month {}", month), || {
            engine.compute(&mut *platform, session, month, &request.options)
        });
        let status = aggregator.push(month, outcome)?.clone();
        let progress = Progress {
            processed: aggregator.processed(),
            total,
            month,
            status: &status,
        };
        if observer.on_progress(&progress).is_break() {
            if aggregator.processed() < total {
                warn!(
                    "Cancelled after {} of {} months",
                    aggregator.processed(),
                    total
                );
                cancelled = true;
            }
            break;
        }
    }

    platform.release(session, &[reference.handle])?;
    let result = aggregator.finish(cancelled);
    match result.empty_reason() {
        Some(reason) => warn!("Analysis produced no records: {}", reason),
        None => info!(
            "Analysis complete: {} of {} months recorded",
            result.records.len(),
            total
        ),
    }
    if let Some(summary) = result.soft_error_summary() {
        warn!("{}", summary);
    }
    Ok(result)
}
