//! Varq Operator Algebra
//!
//! Sparse sums of Pauli and fermionic terms with symbolic
//! coefficients, used to express Hamiltonians and observables for
//! variational algorithms.
//!
//! # Overview
//!
//! A [`TermsOperator`] is a map from canonical terms to
//! [`varq_ir::ParameterResolver`] coefficients, generic over a
//! [`SiteAlgebra`] that supplies the single-site multiplication table.
//! [`QubitOperator`] uses the Pauli table, [`FermionOperator`] the
//! fermionic ladder table with anticommutation signs.
//!
//! # Example
//!
//! ```rust
//! use varq_ops::QubitOperator;
//!
//! let x1 = QubitOperator::from_term("X1").unwrap();
//! let y1 = QubitOperator::from_term("Y1").unwrap();
//!
//! // Same-site Pauli product picks up the phase: X1·Y1 = i·Z1.
//! assert_eq!(x1.dot(&y1).unwrap().to_string(), "(1j) [Z1] ");
//! ```

pub mod algebra;
pub mod error;
pub mod interop;
pub mod parser;
pub mod terms;

pub use algebra::{
    FermionAlgebra, FermionLetter, PauliAlgebra, PauliLetter, SiteAlgebra, SiteProduct,
};
pub use error::{OpsError, OpsResult};
pub use interop::{ExternalTerm, ExternalTerms, external_interop_supported, from_external, to_external};
pub use parser::ParseTerm;
pub use terms::{COMPRESS_PRECISION, FermionOperator, QubitOperator, TermKey, TermsOperator};
