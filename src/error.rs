//! Typed errors for the data store gateway.
//!
//! The gateway uses `thiserror` so the controller can tell an unreachable store
//! apart from a rejected statement or bad input. Application glue keeps using
//! `anyhow`.

use thiserror::Error;

/// Result alias used by every gateway operation.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failures surfaced by the gateway. None of them leave a half-applied
/// mutation behind.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Store unreachable, file unopenable or not a database, or credentials
    /// rejected.
    #[error("could not reach the student store: {message}")]
    Connection {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The store rejected the statement.
    #[error("student store rejected the statement: {message}")]
    Statement {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Input broke a field rule; no statement was issued.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl GatewayError {
    pub(crate) fn connection<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        GatewayError::Connection {
            message: message.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn statement<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        GatewayError::Statement {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Short name used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Connection { .. } => "connection",
            GatewayError::Statement { .. } => "statement",
            GatewayError::Validation(_) => "validation",
        }
    }
}

/// Field rule violations, reported with user-facing wording.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required.")]
    Empty { field: &'static str },

    #[error("{field} must be at most {max} characters.")]
    TooLong { field: &'static str, max: usize },

    #[error("\"{0}\" is not one of the offered courses.")]
    UnknownCourse(String),

    #[error("Mobile does not match the required format ({pattern}).")]
    MobilePattern { pattern: String },
}
