//! Failure taxonomy for risk data sources.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RiskError {
    #[error("risk data unavailable: {0}")]
    Unavailable(String),

    #[error("risk data request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid risk payload: {0}")]
    InvalidResponse(String),

    #[error("risk request cancelled")]
    Cancelled,
}

impl RiskError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RiskError::Unavailable(_) | RiskError::Timeout(_))
    }
}

impl From<serde_json::Error> for RiskError {
    fn from(err: serde_json::Error) -> Self {
        RiskError::InvalidResponse(err.to_string())
    }
}

pub type RiskResult<T> = Result<T, RiskError>;
