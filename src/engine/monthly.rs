use serde::Serialize;
use tracing::debug;

use super::reference::Reference;
use super::{CompositeOutcome, composite};
use crate::core::months::YearMonth;
use crate::core::processing::stats::{DeltaSummary, PercentileStats, ReductionSpec};
use crate::core::processing::visualize::{VisParams, vis_params_for_mode};
use crate::core::region::Roi;
use crate::error::{Error, Result};
use crate::platform::{
    FilterSpec, ImageryPlatform, PreprocessSpec, RasterHandle, RequestOptions, Session,
};
use crate::types::{Sensitivity, VisMode};

/// One month's delta against the reference. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyDeltaRecord {
    pub month: YearMonth,
    pub image: RasterHandle,
    pub image_count: usize,
    /// Missing when the ROI holds no valid delta pixel
    pub percentiles: Option<PercentileStats>,
    pub summary: Option<DeltaSummary>,
}

impl MonthlyDeltaRecord {
    pub fn year(&self) -> i32 {
        self.month.year()
    }

    pub fn vis_params(&self, mode: VisMode, sensitivity: Sensitivity) -> VisParams {
        vis_params_for_mode(mode, self.percentiles.as_ref(), sensitivity)
    }
}

pub struct MonthlyDeltaEngine<'a> {
    reference: &'a Reference,
    base_filter: FilterSpec,
    preprocess: PreprocessSpec,
    reduction: ReductionSpec,
}

impl<'a> MonthlyDeltaEngine<'a> {
    pub fn new(
        roi: Roi,
        reference: &'a Reference,
        preprocess: PreprocessSpec,
        reduction: ReductionSpec,
    ) -> Self {
        Self {
            reference,
            base_filter: FilterSpec::sentinel1_vv(roi, reference.info.interval),
            preprocess,
            reduction,
        }
    }

    pub fn filter_for(&self, month: YearMonth) -> FilterSpec {
        self.base_filter.with_interval(month.interval())
    }

    /// Composite of `month` minus the reference, with its statistics.
    /// A month without scenes is `Error::NoMonthData`.
    pub fn compute<P: ImageryPlatform + ?Sized>(
        &self,
        platform: &mut P,
        session: &Session,
        month: YearMonth,
        opts: &RequestOptions,
    ) -> Result<MonthlyDeltaRecord> {
        let filter = self.filter_for(month);
        let (monthly, image_count) =
            match composite(platform, session, &filter, &self.preprocess, opts)? {
                CompositeOutcome::Built {
                    handle,
                    image_count,
                } => (handle, image_count),
                CompositeOutcome::Empty => {
                    return Err(Error::NoMonthData {
                        month,
                        filter: filter.to_string(),
                    });
                }
            };

        let delta = platform.subtract(session, monthly, self.reference.handle, opts);
        platform.release(session, &[monthly])?;
        let delta = delta?;
        let roi = filter.roi;
        let reduced = platform
            .reduce_percentiles(session, delta, &roi, &self.reduction, opts)
            .and_then(|p| {
                let s = platform.reduce_summary(session, delta, &roi, &self.reduction, opts)?;
                Ok((p, s))
            });
        let (percentiles, summary) = match reduced {
            Ok(stats) => stats,
            Err(e) => {
                // The delta is only kept for a recorded month
                let _ = platform.release(session, &[delta]);
                return Err(e);
            }
        };
        debug!(
            "{}: {} images, p50 {:?}",
            month,
            image_count,
            percentiles.map(|p| p.p50)
        );

        Ok(MonthlyDeltaRecord {
            month,
            image: delta,
            image_count,
            percentiles,
            summary,
        })
    }
}
