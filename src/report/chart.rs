use chrono::NaiveDate;
use serde::Serialize;

use crate::engine::AnalysisResult;

/// One point of the mean / median / interquartile time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub label: String,
    pub mean: f64,
    pub std_dev: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

pub fn time_series(result: &AnalysisResult) -> Vec<TimeSeriesPoint> {
    result
        .records
        .iter()
        .filter_map(|r| {
            let s = r.summary?;
            Some(TimeSeriesPoint {
                date: r.month.first_day(),
                label: r.month.label(),
                mean: s.mean,
                std_dev: s.std_dev,
                p25: s.p25,
                p50: s.p50,
                p75: s.p75,
            })
        })
        .collect()
}
