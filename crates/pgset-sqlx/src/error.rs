//! Error types for the sqlx engine

use pgset_core::EngineError;

/// Errors building an engine from configuration
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Connection URL could not be parsed
    #[error("invalid connection url: {0}")]
    InvalidUrl(#[source] sqlx::Error),

    /// The blocking runtime could not be created
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Convert a driver error, keeping the server's own message for database errors
pub(crate) fn engine_error(error: sqlx::Error) -> EngineError {
    match error {
        sqlx::Error::Database(db) => EngineError::new(db.message()),
        other => EngineError::new(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_use_display() {
        let err = engine_error(sqlx::Error::RowNotFound);
        assert_eq!(err.message(), sqlx::Error::RowNotFound.to_string());
    }
}
