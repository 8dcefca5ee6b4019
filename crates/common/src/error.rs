/// EmbedSearch error types
#[derive(Debug, thiserror::Error)]
pub enum EmbedSearchError {
    /// Embedding service could not be reached
    #[error("Embedding service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Embedding service answered with a non-success status
    #[error("Embedding service error (status {status}): {body}")]
    Service { status: u16, body: String },

    /// Embedding service response could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Stored vector literal is malformed
    #[error("Malformed vector: {0}")]
    MalformedVector(String),

    /// Vectors of different dimension were combined
    #[error("Dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// Store connectivity or execution failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Store is missing the expected shape
    #[error("Schema error: {0}")]
    Schema(String),

    /// Operation was cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

}

impl EmbedSearchError {
    /// Create service unavailable error
    pub fn service_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    /// Create service error from a status code and response body
    pub fn service<S: Into<String>>(status: u16, body: S) -> Self {
        Self::Service {
            status,
            body: body.into(),
        }
    }

    /// Create decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create malformed vector error
    pub fn malformed_vector<S: Into<String>>(msg: S) -> Self {
        Self::MalformedVector(msg.into())
    }

    /// Create dimension mismatch error
    pub fn dimension_mismatch(left: usize, right: usize) -> Self {
        Self::DimensionMismatch { left, right }
    }

    /// Create persistence error
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Self::Schema(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// Process exit code conversion (for the CLI)
impl EmbedSearchError {
    /// Get process exit code; never zero
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 3,
            Self::ServiceUnavailable(_) => 4,
            Self::Service { .. } => 5,
            Self::Decode(_) => 6,
            Self::MalformedVector(_) => 6,
            Self::DimensionMismatch { .. } => 7,
            Self::Persistence(_) => 8,
            Self::Schema(_) => 9,
            Self::Cancelled => 130,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_carries_status_and_body() {
        let err = EmbedSearchError::service(500, "model not loaded");
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("model not loaded"));
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = EmbedSearchError::dimension_mismatch(3, 4);
        assert_eq!(err.to_string(), "Dimension mismatch: 3 vs 4");
    }

    #[test]
    fn test_exit_codes_are_non_zero() {
        let errors = vec![
            EmbedSearchError::service_unavailable("refused"),
            EmbedSearchError::service(503, ""),
            EmbedSearchError::decode("bad json"),
            EmbedSearchError::malformed_vector("[1,x]"),
            EmbedSearchError::dimension_mismatch(1, 2),
            EmbedSearchError::persistence("down"),
            EmbedSearchError::schema("missing column"),
            EmbedSearchError::Cancelled,
            EmbedSearchError::config("bad"),
        ];

        for err in errors {
            assert_ne!(err.exit_code(), 0, "{err}");
        }
    }

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(EmbedSearchError::config("bad").exit_code(), 3);
        assert_eq!(EmbedSearchError::service_unavailable("refused").exit_code(), 4);
        assert_eq!(EmbedSearchError::service(500, "").exit_code(), 5);
        assert_eq!(EmbedSearchError::decode("x").exit_code(), 6);
        assert_eq!(EmbedSearchError::malformed_vector("x").exit_code(), 6);
        assert_eq!(EmbedSearchError::dimension_mismatch(3, 4).exit_code(), 7);
        assert_eq!(EmbedSearchError::persistence("x").exit_code(), 8);
        assert_eq!(EmbedSearchError::schema("x").exit_code(), 9);
        assert_eq!(EmbedSearchError::Cancelled.exit_code(), 130);
    }

    #[test]
    fn test_is_cancelled() {
        assert!(EmbedSearchError::Cancelled.is_cancelled());
        assert!(!EmbedSearchError::persistence("x").is_cancelled());
    }
}
