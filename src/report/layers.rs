use serde::Serialize;
use tracing::warn;

use crate::core::months::YearMonth;
use crate::core::processing::visualize::{PALETTE_HEX, VisParams};
use crate::engine::AnalysisResult;
use crate::platform::RasterHandle;
use crate::types::{Sensitivity, VisMode};

pub const MAX_DISPLAY_LAYERS: usize = 3;
pub const LAYER_OPACITY: f64 = 0.8;
pub const DEFAULT_LAYER_COUNT: usize = 2;

const LEGEND_LABELS: [&str; 9] = [
    "Major Decrease (Construction)",
    "Moderate Decrease",
    "Light Decrease",
    "Minimal Change",
    "No Change",
    "Minimal Increase",
    "Light Increase",
    "Moderate Increase",
    "Major Increase (New Structures)",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegendEntry {
    pub color: &'static str,
    pub label: &'static str,
}

pub fn legend() -> Vec<LegendEntry> {
    PALETTE_HEX
        .iter()
        .zip(LEGEND_LABELS.iter())
        .map(|(&color, &label)| LegendEntry { color, label })
        .collect()
}

/// One map overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    pub month: YearMonth,
    pub label: String,
    pub image: RasterHandle,
    pub vis: VisParams,
    pub opacity: f64,
}

/// The latest recorded months, oldest first.
pub fn default_selection(result: &AnalysisResult) -> Vec<YearMonth> {
    let skip = result.records.len().saturating_sub(DEFAULT_LAYER_COUNT);
    result.records[skip..].iter().map(|r| r.month).collect()
}

/// Overlays for the selected months, capped at `MAX_DISPLAY_LAYERS`.
/// Months without a record are skipped.
pub fn build_layers(
    result: &AnalysisResult,
    selection: &[YearMonth],
    mode: VisMode,
    sensitivity: Sensitivity,
) -> Vec<LayerSpec> {
    if selection.len() > MAX_DISPLAY_LAYERS {
        warn!(
            "{} layers selected, showing the first {}",
            selection.len(),
            MAX_DISPLAY_LAYERS
        );
    }
    let mut layers = Vec::with_capacity(MAX_DISPLAY_LAYERS);
    for month in selection.iter().take(MAX_DISPLAY_LAYERS) {
        let Some(record) = result.record(*month) else {
            warn!("No delta record for {}, layer skipped", month);
            continue;
        };
        layers.push(LayerSpec {
            month: *month,
            label: format!("ΔVV {}", month.label()),
            image: record.image,
            vis: record.vis_params(mode, sensitivity),
            opacity: LAYER_OPACITY,
        });
    }
    layers
}
