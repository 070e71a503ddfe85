//! Shared enums used across DELTAVV.
//! Includes acquisition filters (`Polarization`, `InstrumentMode`, `OrbitPass`) and
//! display controls (`Sensitivity`, `VisMode`, `FilterMode`).
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Polarization {
    Vv,
    Vh,
    Hh,
    Hv,
}

impl std::fmt::Display for Polarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarization::Vv => write!(f, "VV"),
            Polarization::Vh => write!(f, "VH"),
            Polarization::Hh => write!(f, "HH"),
            Polarization::Hv => write!(f, "HV"),
        }
    }
}

/// Sentinel-1 acquisition mode
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstrumentMode {
    Iw,
    Ew,
    Sm,
}

impl std::fmt::Display for InstrumentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentMode::Iw => write!(f, "IW"),
            InstrumentMode::Ew => write!(f, "EW"),
            InstrumentMode::Sm => write!(f, "SM"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrbitPass {
    Ascending,
    Descending,
}

impl std::fmt::Display for OrbitPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrbitPass::Ascending => write!(f, "ASCENDING"),
            OrbitPass::Descending => write!(f, "DESCENDING"),
        }
    }
}

/// How aggressively small backscatter changes are emphasised on the map.
#[derive(
    Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    High,
    #[default]
    Medium,
    Low,
}

impl Sensitivity {
    /// Multiplier applied to fixed (non-adaptive) display ranges.
    pub fn range_factor(self) -> f64 {
        match self {
            Sensitivity::High => 0.5,
            Sensitivity::Medium => 1.0,
            Sensitivity::Low => 2.0,
        }
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sensitivity::High => write!(f, "high"),
            Sensitivity::Medium => write!(f, "medium"),
            Sensitivity::Low => write!(f, "low"),
        }
    }
}

#[derive(
    Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VisMode {
    /// Range derived from each month's percentiles
    #[default]
    Adaptive,
    Sensitive,
    Standard,
    Robust,
}

impl std::fmt::Display for VisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisMode::Adaptive => write!(f, "adaptive"),
            VisMode::Sensitive => write!(f, "sensitive"),
            VisMode::Standard => write!(f, "standard"),
            VisMode::Robust => write!(f, "robust"),
        }
    }
}

/// Enhanced applies the speckle filter before compositing; standard skips it.
#[derive(
    Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    Enhanced,
    Standard,
}
