//! Error types shared by the analysis modules.

use thiserror::Error;

/// Errors raised by the analysis library.
#[derive(Debug, Error)]
pub enum FncError {
    /// A pattern test category that is not in the battery.
    #[error("unknown test category: {0}")]
    UnknownCategory(String),

    /// A case name with no timeline data.
    #[error("unknown case: {0}")]
    UnknownCase(String),

    /// A numeric argument outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An aggregate was requested over no data.
    #[error("no data: {0}")]
    EmptyInput(String),

    /// A VCF record that could not be interpreted.
    #[error("malformed VCF record: {0}")]
    MalformedVcf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for the analysis library.
pub type FncResult<T> = std::result::Result<T, FncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FncError::UnknownCategory("astrology".to_string());
        assert_eq!(err.to_string(), "unknown test category: astrology");

        let err = FncError::InvalidParameter("n_total must be positive".to_string());
        assert!(err.to_string().contains("n_total"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.vcf");
        let err: FncError = io.into();
        assert!(matches!(err, FncError::Io(_)));
    }
}
