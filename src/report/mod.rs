//! Presentation data derived from an analysis result: map layers, legend,
//! time series, statistics table and run summary. Rendering is left to the caller.
use serde::Serialize;

use crate::core::months::YearMonth;
use crate::core::region::Roi;
use crate::engine::{AnalysisResult, EmptyReason, MonthOutcome, ReferenceInfo};
use crate::error::Result;
use crate::types::{Sensitivity, VisMode};

pub mod chart;
pub mod layers;
pub mod table;

pub use chart::{TimeSeriesPoint, time_series};
pub use layers::{LayerSpec, LegendEntry, build_layers, default_selection, legend};
pub use table::{RunSummary, StatsRow, stats_rows, summarize_rows, to_csv, write_csv};

#[derive(Debug, Clone, Serialize)]
pub struct RegionInfo {
    pub roi: Roi,
    pub center: (f64, f64),
    pub area_km2: f64,
}

impl From<&Roi> for RegionInfo {
    fn from(roi: &Roi) -> Self {
        Self {
            roi: *roi,
            center: roi.center(),
            area_km2: roi.area_km2(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PresentationData {
    pub region: RegionInfo,
    pub reference: ReferenceInfo,
    pub layers: Vec<LayerSpec>,
    pub legend: Vec<LegendEntry>,
    pub time_series: Vec<TimeSeriesPoint>,
    pub table: Vec<StatsRow>,
    pub summary: Option<RunSummary>,
    pub statuses: Vec<MonthOutcome>,
    pub empty_reason: Option<EmptyReason>,
    pub notice: Option<String>,
}

impl PresentationData {
    /// `selection` of `None` shows the latest months.
    pub fn build(
        result: &AnalysisResult,
        selection: Option<&[YearMonth]>,
        mode: VisMode,
        sensitivity: Sensitivity,
    ) -> Self {
        let selected = match selection {
            Some(months) => months.to_vec(),
            None => default_selection(result),
        };
        let table = stats_rows(result);
        Self {
            region: RegionInfo::from(&result.roi),
            reference: result.reference.clone(),
            layers: build_layers(result, &selected, mode, sensitivity),
            legend: legend(),
            time_series: time_series(result),
            summary: summarize_rows(&table),
            table,
            statuses: result.statuses.clone(),
            empty_reason: result.empty_reason(),
            notice: result.soft_error_summary(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
