//! Error types for decomposition rules.

use thiserror::Error;

/// Errors raised when a rule is applied to the wrong gate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecomposeError {
    /// The gate kind does not match the rule.
    #[error("Rule '{rule}' does not apply to gate '{gate}'")]
    UnsupportedGate {
        /// Name of the offending gate.
        gate: String,
        /// Name of the rule.
        rule: &'static str,
    },

    /// The gate has the wrong number of control qubits for the rule.
    #[error("Rule '{rule}' expects {expected} control(s), got {got}")]
    WrongControlCount {
        /// Name of the rule.
        rule: &'static str,
        /// Controls the rule expects.
        expected: usize,
        /// Controls the gate carries.
        got: usize,
    },
}

/// Result type alias for decomposition.
pub type DecomposeResult<T> = Result<T, DecomposeError>;
