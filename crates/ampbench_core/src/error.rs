//! Core Error Types

use thiserror::Error;

use crate::points::RangeError;

/// Errors that can occur in the sweep engine
///
/// Per-point hardware failures are deliberately NOT here: the orchestrator
/// converts those into report entries instead of propagating them.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid sweep parameters: {0}")]
    InvalidRange(#[from] RangeError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to spawn monitor worker: {0}")]
    WorkerSpawn(String),

    #[error("export failed: {0}")]
    Export(#[from] serde_json::Error),
}

/// Result type alias for engine operations
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidConfig("points must be >= 2".into());
        assert!(err.to_string().contains("points must be >= 2"));
    }

    #[test]
    fn test_error_from_range() {
        let range_err = RangeError::TooFewPoints(1);
        let err: CoreError = range_err.into();
        assert!(matches!(err, CoreError::InvalidRange(_)));
        assert!(err.to_string().contains("points"));
    }
}
