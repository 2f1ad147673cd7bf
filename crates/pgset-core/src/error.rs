//! Error types for pgset
//!
//! Every failure aborts the run at the point of detection:
//! - Caller input errors (value/reset combination)
//! - Catalog errors (unknown or immutable parameter)
//! - Engine failures, passed through verbatim

/// Error raised by an engine call
///
/// The message is whatever the server or driver reported. It is never
/// rewritten on its way to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    /// Create engine error from a driver message
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The driver message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Main reconciliation error type
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Both a value and a reset were requested
    #[error("{name}: value and reset params are mutually exclusive")]
    MutuallyExclusiveInput { name: String },

    /// Neither a value nor a reset was requested
    #[error("{name}: at least one of value or reset param must be specified")]
    MissingInput { name: String },

    /// Catalog lookup returned no row
    #[error(
        "no such parameter: {name}. Please check its spelling or presence in your PostgreSQL version"
    )]
    UnknownParameter { name: String },

    /// Parameter has the `internal` context and can never be changed
    #[error("{name}: cannot be changed (internal context)")]
    ImmutableParameter { name: String },

    /// An engine call failed
    #[error("{operation}: {source}")]
    QueryExecution {
        /// What was being attempted
        operation: String,
        /// Engine error, unmodified
        #[source]
        source: EngineError,
    },
}

impl ReconcileError {
    /// Wrap an engine failure with the operation that triggered it
    #[inline]
    pub fn query(operation: impl Into<String>, source: EngineError) -> Self {
        Self::QueryExecution {
            operation: operation.into(),
            source,
        }
    }

    /// Check if the caller supplied an invalid value/reset combination
    #[inline]
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MutuallyExclusiveInput { .. } | Self::MissingInput { .. }
        )
    }

    /// Engine message for query failures
    #[must_use]
    pub fn engine_message(&self) -> Option<&str> {
        match self {
            Self::QueryExecution { source, .. } => Some(source.message()),
            _ => None,
        }
    }
}
