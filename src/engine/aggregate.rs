use std::fmt;
use std::ops::ControlFlow;

use serde::Serialize;
use tracing::warn;

use super::monthly::MonthlyDeltaRecord;
use super::reference::ReferenceInfo;
use crate::core::months::YearMonth;
use crate::core::region::Roi;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MonthStatus {
    Recorded,
    /// No scene matched the filter
    NoData,
    /// A platform error survived the retries
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthOutcome {
    pub month: YearMonth,
    #[serde(flatten)]
    pub status: MonthStatus,
}

#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    pub processed: usize,
    pub total: usize,
    pub month: YearMonth,
    pub status: &'a MonthStatus,
}

impl Progress<'_> {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

/// Receives progress after each month. `Break` stops the run after the current month.
pub trait ProgressObserver {
    fn on_progress(&mut self, progress: &Progress<'_>) -> ControlFlow<()>;
}

impl<F> ProgressObserver for F
where
    F: FnMut(&Progress<'_>) -> ControlFlow<()>,
{
    fn on_progress(&mut self, progress: &Progress<'_>) -> ControlFlow<()> {
        self(progress)
    }
}

pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&mut self, _progress: &Progress<'_>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    NoMonthsRequested,
    AllMonthsEmpty,
    AllMonthsFailed,
    Cancelled,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::NoMonthsRequested => write!(f, "no month was requested"),
            EmptyReason::AllMonthsEmpty => write!(f, "no imagery in any requested month"),
            EmptyReason::AllMonthsFailed => write!(f, "every month failed"),
            EmptyReason::Cancelled => {
                write!(f, "run was cancelled before any month produced a record")
            }
        }
    }
}

/// Output of one run: chronological records plus per-month outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub roi: Roi,
    pub reference: ReferenceInfo,
    pub records: Vec<MonthlyDeltaRecord>,
    pub statuses: Vec<MonthOutcome>,
    pub requested_months: usize,
    pub cancelled: bool,
}

impl AnalysisResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, month: YearMonth) -> Option<&MonthlyDeltaRecord> {
        self.records.iter().find(|r| r.month == month)
    }

    pub fn no_data_count(&self) -> usize {
        self.count(|s| matches!(s, MonthStatus::NoData))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, MonthStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&MonthStatus) -> bool) -> usize {
        self.statuses.iter().filter(|o| pred(&o.status)).count()
    }

    pub fn empty_reason(&self) -> Option<EmptyReason> {
        if !self.records.is_empty() {
            return None;
        }
        Some(if self.requested_months == 0 {
            EmptyReason::NoMonthsRequested
        } else if self.cancelled {
            EmptyReason::Cancelled
        } else if self.failed_count() > 0 && self.no_data_count() == 0 {
            EmptyReason::AllMonthsFailed
        } else {
            EmptyReason::AllMonthsEmpty
        })
    }

    /// e.g. "3 of 14 months had no data; 1 failed"
    pub fn soft_error_summary(&self) -> Option<String> {
        let (empty, failed) = (self.no_data_count(), self.failed_count());
        if empty == 0 && failed == 0 {
            return None;
        }
        let mut text = format!(
            "{} of {} months had no data",
            empty, self.requested_months
        );
        if failed > 0 {
            text.push_str(&format!("; {} failed", failed));
        }
        Some(text)
    }
}

/// Collects month outcomes in iteration order.
pub struct Aggregator {
    roi: Roi,
    reference: ReferenceInfo,
    total: usize,
    records: Vec<MonthlyDeltaRecord>,
    statuses: Vec<MonthOutcome>,
}

impl Aggregator {
    pub fn new(roi: Roi, reference: ReferenceInfo, total: usize) -> Self {
        Self {
            roi,
            reference,
            total,
            records: Vec::with_capacity(total),
            statuses: Vec::with_capacity(total),
        }
    }

    /// Record one month. Only authentication errors are returned; everything else becomes a status.
    pub fn push(
        &mut self,
        month: YearMonth,
        outcome: Result<MonthlyDeltaRecord>,
    ) -> Result<&MonthStatus> {
        let status = match outcome {
            Ok(record) => {
                self.records.push(record);
                MonthStatus::Recorded
            }
            Err(e) if e.is_soft() => {
                warn!("{}", e);
                MonthStatus::NoData
            }
            Err(e @ Error::Authentication(_)) => return Err(e),
            Err(e) => {
                warn!("{} failed: {}", month, e);
                MonthStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };
        self.statuses.push(MonthOutcome { month, status });
        let last = self.statuses.len() - 1;
        Ok(&self.statuses[last].status)
    }

    pub fn processed(&self) -> usize {
        self.statuses.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn finish(self, cancelled: bool) -> AnalysisResult {
        AnalysisResult {
            roi: self.roi,
            reference: self.reference,
            records: self.records,
            statuses: self.statuses,
            requested_months: self.total,
            cancelled,
        }
    }
}
