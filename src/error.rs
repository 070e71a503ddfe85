//! Crate-level error type and `Result` alias.
//! Hard failures (authentication, missing reference, malformed region) abort a run;
//! `NoMonthData`, `Timeout` and `Transient` are recovered from per month by the engine.
use std::time::Duration;

use thiserror::Error;

use crate::core::months::{DateInterval, YearMonth};

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a credential handshake can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("credential document is not valid JSON: {0}")]
    InvalidDocument(String),

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("credential type is '{0}', expected 'service_account'")]
    WrongType(String),

    #[error("signing key rejected: {0}")]
    Rejected(String),

    #[error("no authenticated session, run the credential handshake first")]
    NotAuthenticated,

    #[error("session was not issued by this platform")]
    UnknownSession,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::GdalError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication failed: {0}")]
    Authentication(#[from] AuthError),

    #[error("Invalid region of interest: {reason}")]
    RegionValidation { reason: String },

    #[error("No reference imagery in {interval} matching {filter}")]
    NoReferenceData {
        interval: DateInterval,
        filter: String,
    },

    #[error("No imagery for {month} matching {filter}")]
    NoMonthData { month: YearMonth, filter: String },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("{operation} timed out after {elapsed:?}")]
    Timeout {
        operation: &'static str,
        elapsed: Duration,
    },

    #[error("Transient platform failure: {0}")]
    Transient(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("External error: {0}")]
    External(String),
}

impl Error {
    pub fn external<E: std::fmt::Display>(e: E) -> Self {
        Error::External(e.to_string())
    }

    /// Failures worth retrying: request timeouts and transient platform hiccups.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Timeout { .. } | Error::Transient(_))
    }

    /// Errors that only cost one month and never abort a run.
    pub fn is_soft(&self) -> bool {
        matches!(self, Error::NoMonthData { .. })
    }
}
