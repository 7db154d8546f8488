//! Error types for the store domain.
//!
//! Write-side failures roll the in-flight transaction back and leave the
//! prior snapshot visible; read-side failures surface to the caller and
//! never affect write-side state.

/// The result type used throughout `gitpulse-store`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The Postgres pool could not be established.
    #[error("failed to connect to postgres: {source}")]
    Connect {
        /// The underlying driver error.
        #[source]
        source: sqlx::Error,
    },

    /// Schema migration failed.
    #[error("migration failed: {source}")]
    Migrate {
        /// The underlying migration error.
        #[source]
        source: sqlx::migrate::MigrateError,
    },

    /// A write failed during materialization.
    #[error("write failed during {context}: {source}")]
    Write {
        /// The materialization step that failed.
        context: &'static str,
        /// The underlying driver error.
        #[source]
        source: sqlx::Error,
    },

    /// A read failed on the published views.
    #[error("read failed during {context}: {source}")]
    Read {
        /// The query that failed.
        context: &'static str,
        /// The underlying driver error.
        #[source]
        source: sqlx::Error,
    },

    /// The batch planner was given inconsistent arguments.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Creates a write error for the given materialization step.
    #[must_use]
    pub fn write(context: &'static str, source: sqlx::Error) -> Self {
        Self::Write { context, source }
    }

    /// Creates a read error for the given query.
    #[must_use]
    pub fn read(context: &'static str, source: sqlx::Error) -> Self {
        Self::Read { context, source }
    }

    /// Creates an invalid-input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_error_names_the_step() {
        let err = Error::write("prune raw aggregates", sqlx::Error::PoolClosed);
        assert!(err.to_string().contains("prune raw aggregates"));
    }

    #[test]
    fn invalid_input_display() {
        let err = Error::invalid_input("parameter limit 2 cannot fit one row of arity 3");
        assert!(err.to_string().contains("arity 3"));
    }
}
