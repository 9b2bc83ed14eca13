//! Unified error type for the simulation engine.
//!
//! Every failure mode is fatal and propagates out of `run()` or the `add_*`
//! call that triggered it; there is no local recovery. Missed load, missed
//! firm dispatch, and missed spinning reserve are recorded outputs, never
//! errors.

use thiserror::Error;

/// Unified error type for all simulation operations.
#[derive(Error, Debug)]
pub enum SimError {
    /// I/O errors (missing or unreadable input file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-numeric cell where a numeric value is required
    #[error("parse error: {0}")]
    Parse(String),

    /// Out-of-range inputs (SOC bounds, efficiencies, intensities, angles)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Interpolation query outside table bounds, or unknown key
    #[error("out of domain: {0}")]
    OutOfDomain(String),

    /// Resource series length or sample instants do not match the load grid
    #[error("grid mismatch: {0}")]
    GridMismatch(String),

    /// Asset type or model tag not recognised
    #[error("unknown kind: {0}")]
    UnknownKind(String),
}

/// Convenience type alias for Results using SimError.
pub type SimResult<T> = Result<T, SimError>;

impl From<anyhow::Error> for SimError {
    fn from(err: anyhow::Error) -> Self {
        SimError::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::GridMismatch("resource key 3 has 12 points, load grid has 8760".into());
        assert!(err.to_string().contains("grid mismatch"));
        assert!(err.to_string().contains("key 3"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let sim_err: SimError = io_err.into();
        assert!(matches!(sim_err, SimError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> SimResult<()> {
            Err(SimError::OutOfDomain("query 1.5 above max 1.0".into()))
        }

        fn outer() -> SimResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
