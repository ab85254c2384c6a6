//! Error types for a pagination pass

use thiserror::Error;

/// Result type alias for pagination operations
pub type Result<T> = std::result::Result<T, PaginationError>;

/// Failures that abandon a pagination pass.
///
/// Measurement gaps, infeasible splits and cursor-mapping misses are not
/// errors; they have fallbacks inside the pass.
#[derive(Error, Debug)]
pub enum PaginationError {
    /// The document tree does not have the expected page/region shape
    #[error("malformed page {page}: {reason}")]
    Structural { page: usize, reason: String },

    /// A composer invariant was violated; the pass produced nothing
    #[error("internal pagination inconsistency: {0}")]
    Internal(String),

    /// A JSON job or document could not be decoded
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    /// A job file or stdin could not be read
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl PaginationError {
    pub(crate) fn structural(page: usize, reason: impl Into<String>) -> Self {
        Self::Structural {
            page,
            reason: reason.into(),
        }
    }

    pub(crate) fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_message() {
        let err = PaginationError::structural(3, "no body region");
        assert_eq!(err.to_string(), "malformed page 3: no body region");
    }

    #[test]
    fn test_json_conversion() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("{");
        let err: PaginationError = parse.unwrap_err().into();
        assert!(matches!(err, PaginationError::Json(_)));
    }
}
