//! Rectangular region of interest in geographic coordinates (EPSG:4326).
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const KM_PER_DEGREE: f64 = 111.0;

/// Raw bounds as they appear in config files, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

/// Validated, immutable axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RoiBounds", into = "RoiBounds")]
pub struct Roi {
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
}

impl Roi {
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Result<Self> {
        let bounds = [lat_min, lat_max, lon_min, lon_max];
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(Error::RegionValidation {
                reason: format!("bounds must be finite, got {bounds:?}"),
            });
        }
        if lat_min >= lat_max {
            return Err(Error::RegionValidation {
                reason: format!("lat_min ({lat_min}) must be less than lat_max ({lat_max})"),
            });
        }
        if lon_min >= lon_max {
            return Err(Error::RegionValidation {
                reason: format!("lon_min ({lon_min}) must be less than lon_max ({lon_max})"),
            });
        }
        if lat_min < -90.0 || lat_max > 90.0 || lon_min < -180.0 || lon_max > 180.0 {
            return Err(Error::RegionValidation {
                reason: format!("bounds {bounds:?} fall outside geographic coordinates"),
            });
        }
        Ok(Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        })
    }

    pub fn lat_min(&self) -> f64 {
        self.lat_min
    }

    pub fn lat_max(&self) -> f64 {
        self.lat_max
    }

    pub fn lon_min(&self) -> f64 {
        self.lon_min
    }

    pub fn lon_max(&self) -> f64 {
        self.lon_max
    }

    /// (lat, lon) of the rectangle centre
    pub fn center(&self) -> (f64, f64) {
        (
            (self.lat_min + self.lat_max) / 2.0,
            (self.lon_min + self.lon_max) / 2.0,
        )
    }

    /// Flat-earth area estimate, good enough for site-sized regions.
    pub fn area_km2(&self) -> f64 {
        let (lat_c, _) = self.center();
        (self.lat_max - self.lat_min)
            * (self.lon_max - self.lon_min)
            * KM_PER_DEGREE
            * KM_PER_DEGREE
            * lat_c.to_radians().cos()
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }

    pub fn intersects(&self, other: &Roi) -> bool {
        self.lat_min <= other.lat_max
            && other.lat_min <= self.lat_max
            && self.lon_min <= other.lon_max
            && other.lon_min <= self.lon_max
    }
}

impl TryFrom<RoiBounds> for Roi {
    type Error = Error;

    fn try_from(b: RoiBounds) -> Result<Self> {
        Roi::new(b.lat_min, b.lat_max, b.lon_min, b.lon_max)
    }
}

impl From<Roi> for RoiBounds {
    fn from(r: Roi) -> Self {
        RoiBounds {
            lat_min: r.lat_min,
            lat_max: r.lat_max,
            lon_min: r.lon_min,
            lon_max: r.lon_max,
        }
    }
}

impl std::fmt::Display for Roi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}) to ({:.6}, {:.6})",
            self.lat_min, self.lon_min, self.lat_max, self.lon_max
        )
    }
}
