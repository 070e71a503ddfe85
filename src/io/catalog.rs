//! `catalog.json`: the list of scenes the local platform can serve.
//!
//! ```json
//! {
//!   "scenes": [
//!     {
//!       "id": "S1A_IW_GRDH_20240503",
//!       "acquired": "2024-05-03T18:22:41Z",
//!       "instrument_mode": "IW",
//!       "polarizations": ["VV", "VH"],
//!       "orbit_pass": "DESCENDING",
//!       "bounds": {"lat_min": 33.5, "lat_max": 33.7, "lon_min": -7.7, "lon_max": -7.5},
//!       "file": "scenes/20240503.tif",
//!       "bands": ["VV", "VH"]
//!     }
//!   ]
//! }
//! ```
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::region::RoiBounds;
use crate::error::{Error, Result};
use crate::types::{InstrumentMode, OrbitPass, Polarization};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneRecord {
    pub id: String,
    pub acquired: DateTime<Utc>,
    pub instrument_mode: InstrumentMode,
    pub polarizations: Vec<Polarization>,
    pub orbit_pass: OrbitPass,
    pub bounds: RoiBounds,
    /// Relative paths resolve against the catalog's directory
    pub file: PathBuf,
    /// Band order inside `file`; defaults to `polarizations`
    #[serde(default)]
    pub bands: Vec<Polarization>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub scenes: Vec<SceneRecord>,
}

impl SceneRecord {
    pub fn band_order(&self) -> &[Polarization] {
        if self.bands.is_empty() {
            &self.polarizations
        } else {
            &self.bands
        }
    }
}

pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<SceneRecord>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let catalog: Catalog = serde_json::from_str(&text)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let mut scenes = Vec::with_capacity(catalog.scenes.len());
    for mut record in catalog.scenes {
        if record.polarizations.is_empty() {
            return Err(Error::InvalidArgument {
                arg: "polarizations",
                value: format!("scene {} lists none", record.id),
            });
        }
        if record.file.is_relative() {
            record.file = base.join(&record.file);
        }
        scenes.push(record);
    }
    info!("Loaded {} scenes from {}", scenes.len(), path.display());
    Ok(scenes)
}
