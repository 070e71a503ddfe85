use std::fmt::Write as _;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::engine::AnalysisResult;
use crate::error::Result;

const CSV_HEADER: &str = "date,year,month,month_name,mean_delta,std_delta,min_delta,max_delta,p10,p25,p50,p75,p90,image_count";

/// Statistics table row; one per month with a summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsRow {
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub mean_delta: f64,
    pub std_delta: f64,
    pub min_delta: f64,
    pub max_delta: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub image_count: usize,
}

impl StatsRow {
    pub fn range(&self) -> f64 {
        self.max_delta - self.min_delta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub months_analyzed: usize,
    pub average_change: f64,
    pub max_positive_change: f64,
    pub max_negative_change: f64,
}

pub fn stats_rows(result: &AnalysisResult) -> Vec<StatsRow> {
    result
        .records
        .iter()
        .filter_map(|r| {
            let s = r.summary?;
            Some(StatsRow {
                date: r.month.first_day(),
                year: r.month.year(),
                month: r.month.month(),
                month_name: r.month.abbr(),
                mean_delta: s.mean,
                std_delta: s.std_dev,
                min_delta: s.min,
                max_delta: s.max,
                p10: s.p10,
                p25: s.p25,
                p50: s.p50,
                p75: s.p75,
                p90: s.p90,
                image_count: r.image_count,
            })
        })
        .collect()
}

/// Summary over the monthly means. `None` for an empty table.
pub fn summarize_rows(rows: &[StatsRow]) -> Option<RunSummary> {
    if rows.is_empty() {
        return None;
    }
    let means = rows.iter().map(|r| r.mean_delta);
    Some(RunSummary {
        months_analyzed: rows.len(),
        average_change: means.clone().sum::<f64>() / rows.len() as f64,
        max_positive_change: means.clone().fold(f64::NEG_INFINITY, f64::max),
        max_negative_change: means.fold(f64::INFINITY, f64::min),
    })
}

pub fn to_csv(rows: &[StatsRow]) -> String {
    let mut out = String::with_capacity(64 * (rows.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');
    for r in rows {
        // Writing into a String cannot fail
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            r.date,
            r.year,
            r.month,
            r.month_name,
            r.mean_delta,
            r.std_delta,
            r.min_delta,
            r.max_delta,
            r.p10,
            r.p25,
            r.p50,
            r.p75,
            r.p90,
            r.image_count
        );
    }
    out
}

pub fn write_csv<P: AsRef<Path>>(path: P, rows: &[StatsRow]) -> Result<()> {
    std::fs::write(path, to_csv(rows))?;
    Ok(())
}
