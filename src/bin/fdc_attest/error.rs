//! Error types for the attestation tool.

use fdc_sdk::error::FdcError;

use crate::config::ConfigError;

/// Main error type for the attestation tool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Environment configuration error: {0}")]
    EnvConfig(#[from] envy::Error),

    #[error("Alloy signer error: {0}")]
    AlloySigner(#[from] alloy::signers::local::LocalSignerError),

    #[error("FDC error: {0}")]
    Fdc(#[from] FdcError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workflow did not finish within {0} seconds")]
    Deadline(u64),
}

pub type Result<T> = std::result::Result<T, Error>;
