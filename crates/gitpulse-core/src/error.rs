//! Error types and result aliases shared across GitPulse components.

/// The result type used throughout `gitpulse-core`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Creates a new invalid-input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_display() {
        let err = Error::invalid_input("GITPULSE_TOP_REPOSITORIES must be greater than 0");
        assert!(err.to_string().contains("invalid input"));
        assert!(err.to_string().contains("GITPULSE_TOP_REPOSITORIES"));
    }

    #[test]
    fn internal_display() {
        let err = Error::internal("merge produced an empty key");
        assert!(err.to_string().contains("internal error"));
    }
}
