//! Error type for loading, configuration and orchestration
//!
//! The estimators and the projection engine never fail; they fall back to
//! zero pyramids, identity survival and zero scales. Errors only come from
//! reading inputs and from asking for a variant that was never calibrated.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid model configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("unknown variant: {0}")]
    UnknownVariant(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
