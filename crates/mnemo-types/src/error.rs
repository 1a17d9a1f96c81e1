use thiserror::Error;

/// Errors from the key-value store port (implementations live in
/// mnemo-infra).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error")]
    Connection,

    #[error("store query error: {0}")]
    Query(String),
}

/// Errors surfaced by the engine components.
///
/// Absence of a context or profile is never an error -- query methods
/// return `None`/empty instead. Persistence failures are logged at the
/// call site and treated as non-fatal; they only appear here when an
/// explicit load is requested.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input, with a user-facing remediation hint.
    #[error("validation failed: {message}")]
    Validation { message: String, hint: String },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>, hint: impl Into<String>) -> Self {
        EngineError::Validation {
            message: message.into(),
            hint: hint.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = EngineError::validation("message text is required", "send a non-empty message");
        assert_eq!(err.to_string(), "validation failed: message text is required");
        match err {
            EngineError::Validation { hint, .. } => {
                assert_eq!(hint, "send a non-empty message");
            }
            _ => panic!("expected validation error"),
        }
    }

    #[test]
    fn test_store_error_conversion() {
        let err: EngineError = StoreError::Query("disk full".to_string()).into();
        assert!(err.to_string().contains("disk full"));
    }
}
