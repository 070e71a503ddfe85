use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::months::{DateInterval, MonthRange, YearMonth};
use crate::core::processing::stats::ReductionSpec;
use crate::core::region::{Roi, RoiBounds};
use crate::engine::retry::RetryPolicy;
use crate::error::{Error, Result};
use crate::platform::RequestOptions;
use crate::types::{FilterMode, Sensitivity, VisMode};

/// Analysis parameters suitable for config files; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    pub roi: RoiBounds,
    /// First analysed month (inclusive)
    pub start: YearMonth,
    /// Last analysed month (inclusive)
    pub end: YearMonth,
    /// Reference interval `[reference_start, reference_end)`
    pub reference_start: NaiveDate,
    pub reference_end: NaiveDate,
    pub sensitivity: Sensitivity,
    pub vis_mode: VisMode,
    pub filter_mode: FilterMode,
    pub scale_m: f64,
    pub max_pixels: u64,
    /// Per-request timeout; None waits indefinitely
    pub request_timeout_secs: Option<u64>,
    pub retry: RetryPolicy,
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn month(y: i32, m: u32) -> YearMonth {
    YearMonth::from(ymd(y, m, 1))
}

impl Default for AnalysisParams {
    fn default() -> Self {
        let reduction = ReductionSpec::default();
        Self {
            roi: RoiBounds {
                lat_min: 33.5700,
                lat_max: 33.5800,
                lon_min: -7.5950,
                lon_max: -7.5800,
            },
            start: month(2024, 5),
            end: month(2025, 6),
            reference_start: ymd(2024, 4, 1),
            reference_end: ymd(2024, 5, 1),
            sensitivity: Sensitivity::default(),
            vis_mode: VisMode::default(),
            filter_mode: FilterMode::default(),
            scale_m: reduction.scale_m,
            max_pixels: reduction.max_pixels,
            request_timeout_secs: Some(300),
            retry: RetryPolicy::default(),
        }
    }
}

impl AnalysisParams {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Validate everything that can be checked before contacting the platform.
    pub fn validate(&self) -> Result<AnalysisRequest> {
        let roi = Roi::try_from(self.roi)?;
        MonthRange::new(self.start, self.end)?;
        let reference = DateInterval::new(self.reference_start, self.reference_end)?;
        let reduction = ReductionSpec {
            scale_m: self.scale_m,
            max_pixels: self.max_pixels,
        };
        reduction.validate()?;
        if self.request_timeout_secs == Some(0) {
            return Err(Error::InvalidArgument {
                arg: "request_timeout_secs",
                value: "0".to_string(),
            });
        }
        Ok(AnalysisRequest {
            roi,
            start: self.start,
            end: self.end,
            reference,
            sensitivity: self.sensitivity,
            vis_mode: self.vis_mode,
            filter_mode: self.filter_mode,
            reduction,
            options: RequestOptions {
                timeout: self.request_timeout_secs.map(Duration::from_secs),
            },
            retry: self.retry,
        })
    }
}

/// Validated run request consumed by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub roi: Roi,
    pub start: YearMonth,
    pub end: YearMonth,
    pub reference: DateInterval,
    pub sensitivity: Sensitivity,
    pub vis_mode: VisMode,
    pub filter_mode: FilterMode,
    pub reduction: ReductionSpec,
    pub options: RequestOptions,
    pub retry: RetryPolicy,
}

impl AnalysisRequest {
    /// Request with default display, filtering and reduction settings.
    pub fn new(roi: Roi, start: YearMonth, end: YearMonth, reference: DateInterval) -> Result<Self> {
        MonthRange::new(start, end)?;
        Ok(Self {
            roi,
            start,
            end,
            reference,
            sensitivity: Sensitivity::default(),
            vis_mode: VisMode::default(),
            filter_mode: FilterMode::default(),
            reduction: ReductionSpec::default(),
            options: RequestOptions::default(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn months(&self) -> Result<MonthRange> {
        MonthRange::new(self.start, self.end)
    }
}
