//! Error types for the IR crate.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A numeric evaluation needed a binding for a declared name.
    #[error("Parameter '{0}' is unbound")]
    UnboundParameter(String),

    /// A grad-flag operation referenced a name that was never declared.
    #[error("Parameter '{0}' is not declared in this resolver")]
    UnknownParameter(String),

    /// Strict resolver combination hit a naming collision.
    #[error("Parameter '{0}' is declared on both sides of a strict combine")]
    NameConflict(String),

    /// Gate bound to the wrong number of target qubits.
    #[error("Gate '{gate}' requires {expected} target qubit(s), got {got}")]
    QubitArityMismatch {
        /// Name of the gate.
        gate: String,
        /// Required number of target qubits.
        expected: u32,
        /// Number of target qubits provided.
        got: u32,
    },

    /// A qubit appears twice among the targets and controls of one gate.
    #[error("Target and control qubits cannot have same qubits: {qubit} repeats")]
    QubitOverlap {
        /// The repeated qubit.
        qubit: QubitId,
    },

    /// Noise-channel probability outside [0, 1] or probabilities summing above 1.
    #[error("Channel '{channel}' requires probabilities in [0, 1] summing to at most 1, got {value}")]
    InvalidProbability {
        /// Name of the channel.
        channel: String,
        /// The offending probability (or sum).
        value: f64,
    },

    /// A user-supplied matrix has the wrong number of entries for its
    /// declared qubit count.
    #[error("Gate '{gate}' expects a matrix of {expected} entries for {num_qubits} qubit(s), got {got}")]
    InvalidMatrixShape {
        /// Name of the gate.
        gate: String,
        /// Declared number of target qubits.
        num_qubits: u32,
        /// Required number of entries.
        expected: usize,
        /// Number of entries provided.
        got: usize,
    },

    /// A unitary matrix was requested from a non-unitary operation.
    #[error("'{gate}' is a noise channel and has no unitary matrix")]
    NonUnitary {
        /// Name of the gate.
        gate: String,
    },

    /// A serialized form could not be produced or parsed.
    #[error("Invalid serialized form: {0}")]
    Serialization(String),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
