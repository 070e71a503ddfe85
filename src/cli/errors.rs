use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid quicklook size: {size}. Must be a positive integer or 'original'")]
    InvalidSize { size: String },

    #[error("Size must be greater than 0, got: {size}")]
    ZeroSize { size: usize },

    #[error("Invalid {arg}: {value} ({reason})")]
    InvalidValue {
        arg: &'static str,
        value: String,
        reason: String,
    },

    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error(transparent)]
    Analysis(#[from] deltavv::Error),
}
