//! Command Line Interface (CLI) layer for DELTAVV.
//!
//! Argument parsing (`args`), CLI error types (`errors`) and the run
//! orchestration (`runner`): load parameters, authenticate, analyse, export.
//! Embedders should use `deltavv::api` instead.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
