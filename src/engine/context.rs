use tracing::info;

use super::aggregate::{AnalysisResult, ProgressObserver};
use super::analyze;
use crate::core::params::AnalysisRequest;
use crate::error::{AuthError, Result};
use crate::platform::{ImageryPlatform, ServiceAccountCredentials, Session};

/// Per-session state: the authenticated session and the latest result.
#[derive(Debug, Default)]
pub struct RunContext {
    session: Option<Session>,
    last_result: Option<AnalysisResult>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authenticate<P: ImageryPlatform + ?Sized>(
        &mut self,
        platform: &mut P,
        credentials: &ServiceAccountCredentials,
    ) -> Result<&Session> {
        let session = platform.authenticate(credentials)?;
        info!("Authenticated as {}", session.client_email);
        self.last_result = None;
        Ok(self.session.insert(session))
    }

    /// Validate a raw credential document, then authenticate with it.
    pub fn authenticate_json<P: ImageryPlatform + ?Sized>(
        &mut self,
        platform: &mut P,
        document: &str,
    ) -> Result<&Session> {
        let credentials = ServiceAccountCredentials::from_json(document)?;
        self.authenticate(platform, &credentials)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| AuthError::NotAuthenticated.into())
    }

    pub fn reset_session(&mut self) {
        self.session = None;
        self.last_result = None;
    }

    /// Run an analysis with the stored session and keep its result.
    pub fn analyze<P: ImageryPlatform + ?Sized>(
        &mut self,
        platform: &mut P,
        request: &AnalysisRequest,
        observer: &mut dyn ProgressObserver,
    ) -> Result<&AnalysisResult> {
        let session = self.session()?;
        let result = analyze(platform, session, request, observer)?;
        Ok(self.last_result.insert(result))
    }

    pub fn last_result(&self) -> Option<&AnalysisResult> {
        self.last_result.as_ref()
    }
}
