//! Narrow synchronous interface to an imagery platform.
//!
//! The engine never touches pixels directly: it asks the platform to query scene
//! collections, preprocess and composite them, and reduce delta rasters to
//! statistics. Every call carries `RequestOptions` so a slow platform surfaces
//! as `Error::Timeout` instead of blocking the run.
use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::months::DateInterval;
use crate::core::processing::raster::Raster;
use crate::core::processing::stats::{DeltaSummary, PercentileStats, ReductionSpec};
use crate::core::processing::{DEFAULT_RESCALE, DEFAULT_SPECKLE_RADIUS_PX};
use crate::core::region::Roi;
use crate::error::{Error, Result};
use crate::types::{FilterMode, InstrumentMode, OrbitPass, Polarization};

pub mod credentials;
pub mod local;

pub use credentials::ServiceAccountCredentials;
pub use local::{LocalPlatform, Scene, SceneSource};

/// Opaque reference to a raster held by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RasterHandle(u64);

impl RasterHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RasterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "raster#{}", self.0)
    }
}

/// Scene selection criteria
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    pub roi: Roi,
    pub interval: DateInterval,
    pub instrument_mode: InstrumentMode,
    pub polarization: Polarization,
    pub orbit_pass: OrbitPass,
}

impl FilterSpec {
    /// IW mode, VV available, descending passes.
    pub fn sentinel1_vv(roi: Roi, interval: DateInterval) -> Self {
        Self {
            roi,
            interval,
            instrument_mode: InstrumentMode::Iw,
            polarization: Polarization::Vv,
            orbit_pass: OrbitPass::Descending,
        }
    }

    pub fn with_interval(&self, interval: DateInterval) -> Self {
        Self { interval, ..*self }
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "instrumentMode={}, polarization contains {}, orbitPass={}",
            self.instrument_mode, self.polarization, self.orbit_pass
        )
    }
}

/// Per-scene preprocessing chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessSpec {
    pub band: Polarization,
    pub rescale: f64,
    /// `None` skips the speckle filter
    pub speckle_radius_px: Option<f64>,
}

impl PreprocessSpec {
    pub fn for_filter_mode(mode: FilterMode) -> Self {
        Self {
            band: Polarization::Vv,
            rescale: DEFAULT_RESCALE,
            speckle_radius_px: match mode {
                FilterMode::Enhanced => Some(DEFAULT_SPECKLE_RADIUS_PX),
                FilterMode::Standard => None,
            },
        }
    }
}

impl Default for PreprocessSpec {
    fn default() -> Self {
        PreprocessSpec::for_filter_mode(FilterMode::default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// Start the clock for one request.
    pub fn deadline(&self, operation: &'static str) -> Deadline {
        Deadline {
            operation,
            started: Instant::now(),
            timeout: self.timeout,
        }
    }
}

/// Request clock checked between units of work.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    operation: &'static str,
    started: Instant,
    timeout: Option<Duration>,
}

impl Deadline {
    pub fn check(&self) -> Result<()> {
        let Some(timeout) = self.timeout else {
            return Ok(());
        };
        let elapsed = self.started.elapsed();
        if elapsed >= timeout {
            return Err(Error::Timeout {
                operation: self.operation,
                elapsed,
            });
        }
        Ok(())
    }
}

/// Authenticated platform session. Issued by `ImageryPlatform::authenticate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub project_id: String,
    pub client_email: String,
    pub established_at: DateTime<Utc>,
    #[serde(skip)]
    token: u64,
}

impl Session {
    pub fn new(project_id: impl Into<String>, client_email: impl Into<String>, token: u64) -> Self {
        Self {
            project_id: project_id.into(),
            client_email: client_email.into(),
            established_at: Utc::now(),
            token,
        }
    }

    pub fn token(&self) -> u64 {
        self.token
    }
}

/// Operations the delta engine needs from an imagery backend.
pub trait ImageryPlatform {
    fn authenticate(&mut self, credentials: &ServiceAccountCredentials) -> Result<Session>;

    /// Scenes intersecting the filter's ROI and interval, in acquisition order.
    fn query(
        &mut self,
        session: &Session,
        filter: &FilterSpec,
        opts: &RequestOptions,
    ) -> Result<Vec<RasterHandle>>;

    /// Band select, rescale, optional speckle filter, clip to `roi`.
    fn preprocess(
        &mut self,
        session: &Session,
        scene: RasterHandle,
        spec: &PreprocessSpec,
        roi: &Roi,
        opts: &RequestOptions,
    ) -> Result<RasterHandle>;

    fn median(
        &mut self,
        session: &Session,
        images: &[RasterHandle],
        opts: &RequestOptions,
    ) -> Result<RasterHandle>;

    fn subtract(
        &mut self,
        session: &Session,
        minuend: RasterHandle,
        subtrahend: RasterHandle,
        opts: &RequestOptions,
    ) -> Result<RasterHandle>;

    /// `None` when the ROI holds no valid pixel.
    fn reduce_percentiles(
        &mut self,
        session: &Session,
        image: RasterHandle,
        roi: &Roi,
        reduction: &ReductionSpec,
        opts: &RequestOptions,
    ) -> Result<Option<PercentileStats>>;

    fn reduce_summary(
        &mut self,
        session: &Session,
        image: RasterHandle,
        roi: &Roi,
        reduction: &ReductionSpec,
        opts: &RequestOptions,
    ) -> Result<Option<DeltaSummary>>;

    /// Materialize a raster for export.
    fn raster(&self, session: &Session, image: RasterHandle) -> Result<Raster>;

    /// Drop rasters the caller no longer needs. Unknown handles are ignored.
    fn release(&mut self, session: &Session, handles: &[RasterHandle]) -> Result<()>;
}
