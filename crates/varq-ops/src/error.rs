//! Error types for operator algebra.

use thiserror::Error;

/// Errors arising from operator construction and manipulation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpsError {
    /// A term string failed to parse.
    #[error("Malformed term: {0}")]
    MalformedTerm(String),

    /// An operation needs numeric coefficients but found a symbol.
    #[error("Symbolic coefficient in context requiring a number: {0}")]
    SymbolicCoefficient(String),

    /// A coefficient operation failed.
    #[error("Parameter error: {0}")]
    Parameter(#[from] varq_ir::IrError),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for operator algebra.
pub type OpsResult<T> = Result<T, OpsError>;
