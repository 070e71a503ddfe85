use serde::Serialize;
use tracing::info;

use super::{CompositeOutcome, composite};
use crate::core::months::DateInterval;
use crate::core::region::Roi;
use crate::error::{Error, Result};
use crate::platform::{
    FilterSpec, ImageryPlatform, PreprocessSpec, RasterHandle, RequestOptions, Session,
};

/// Provenance of the baseline composite, kept alongside the analysis result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceInfo {
    pub interval: DateInterval,
    pub filter: String,
    pub image_count: usize,
}

/// Baseline composite every month is compared against. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub handle: RasterHandle,
    pub info: ReferenceInfo,
}

pub struct ReferenceCompositor {
    filter: FilterSpec,
    preprocess: PreprocessSpec,
}

impl ReferenceCompositor {
    pub fn new(roi: Roi, interval: DateInterval, preprocess: PreprocessSpec) -> Self {
        Self {
            filter: FilterSpec::sentinel1_vv(roi, interval),
            preprocess,
        }
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    /// Median of every preprocessed scene in the interval. No scenes is fatal.
    pub fn build<P: ImageryPlatform + ?Sized>(
        &self,
        platform: &mut P,
        session: &Session,
        opts: &RequestOptions,
    ) -> Result<Reference> {
        match composite(platform, session, &self.filter, &self.preprocess, opts)? {
            CompositeOutcome::Empty => Err(Error::NoReferenceData {
                interval: self.filter.interval,
                filter: self.filter.to_string(),
            }),
            CompositeOutcome::Built { handle, image_count } => {
                info!(
                    "Reference composite over {} from {} images",
                    self.filter.interval, image_count
                );
                Ok(Reference {
                    handle,
                    info: ReferenceInfo {
                        interval: self.filter.interval,
                        filter: self.filter.to_string(),
                        image_count,
                    },
                })
            }
        }
    }
}
