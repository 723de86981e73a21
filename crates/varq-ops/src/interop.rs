//! Plain-data exchange format for Pauli operators.
//!
//! External simulators consume Hamiltonians as flat term lists with
//! numeric coefficients. [`ExternalTerms`] is that shape: no symbols,
//! no resolver machinery, serde-friendly. Whether a given operator can
//! cross the boundary is an explicit per-value check
//! ([`external_interop_supported`]), not ambient state.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use varq_ir::ParameterResolver;

use crate::algebra::PauliLetter;
use crate::error::{OpsError, OpsResult};
use crate::terms::QubitOperator;

/// One Pauli term: `(site, letter)` factors and a numeric coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalTerm {
    /// Site-sorted factors; letters are `'X'`, `'Y'` or `'Z'`.
    pub factors: Vec<(u32, char)>,
    /// Real part of the coefficient.
    pub coeff_re: f64,
    /// Imaginary part of the coefficient.
    pub coeff_im: f64,
}

/// A flat Pauli operator for the external boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalTerms {
    /// The terms, in canonical order.
    pub terms: Vec<ExternalTerm>,
}

/// True when `op` can be handed to an external consumer, i.e. every
/// coefficient is fully numeric.
pub fn external_interop_supported(op: &QubitOperator) -> bool {
    !op.is_parameterized()
}

/// Convert to the external shape. Fails with `SymbolicCoefficient` if
/// any coefficient still carries a symbol.
pub fn to_external(op: &QubitOperator) -> OpsResult<ExternalTerms> {
    let mut terms = Vec::with_capacity(op.size());
    for (key, coeff) in op.terms() {
        if !coeff.is_const() {
            return Err(OpsError::SymbolicCoefficient(coeff.to_string()));
        }
        let c = coeff.const_term();
        terms.push(ExternalTerm {
            factors: key
                .iter()
                .map(|&(site, letter)| {
                    let c = match letter {
                        PauliLetter::X => 'X',
                        PauliLetter::Y => 'Y',
                        PauliLetter::Z => 'Z',
                    };
                    (site, c)
                })
                .collect(),
            coeff_re: c.re,
            coeff_im: c.im,
        });
    }
    Ok(ExternalTerms { terms })
}

/// Convert back from the external shape. Fails with `MalformedTerm`
/// on unknown letters or duplicate sites within one term.
pub fn from_external(ext: &ExternalTerms) -> OpsResult<QubitOperator> {
    let mut op = QubitOperator::new();
    for term in &ext.terms {
        let mut factors = Vec::with_capacity(term.factors.len());
        for &(site, c) in &term.factors {
            let letter = match c.to_ascii_uppercase() {
                'X' => PauliLetter::X,
                'Y' => PauliLetter::Y,
                'Z' => PauliLetter::Z,
                other => {
                    return Err(OpsError::MalformedTerm(format!(
                        "unknown letter '{other}'"
                    )));
                }
            };
            if factors.iter().any(|&(s, _)| s == site) {
                return Err(OpsError::MalformedTerm(format!(
                    "duplicate site {site} in external term"
                )));
            }
            factors.push((site, letter));
        }
        let coeff = ParameterResolver::constant(Complex64::new(term.coeff_re, term.coeff_im));
        op = op.plus(&QubitOperator::from_factors(factors, coeff));
    }
    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let op = QubitOperator::parse("Z1 Z2", 2.0).unwrap()
            + QubitOperator::parse("X0", Complex64::new(0.0, 1.0)).unwrap();
        assert!(external_interop_supported(&op));

        let ext = to_external(&op).unwrap();
        assert_eq!(ext.terms.len(), 2);
        let back = from_external(&ext).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn test_symbolic_rejected() {
        let op = QubitOperator::parse("Z0", ParameterResolver::single("a")).unwrap();
        assert!(!external_interop_supported(&op));
        assert!(matches!(
            to_external(&op),
            Err(OpsError::SymbolicCoefficient(_))
        ));
    }

    #[test]
    fn test_bad_external_letter() {
        let ext = ExternalTerms {
            terms: vec![ExternalTerm {
                factors: vec![(0, 'Q')],
                coeff_re: 1.0,
                coeff_im: 0.0,
            }],
        };
        assert!(matches!(
            from_external(&ext),
            Err(OpsError::MalformedTerm(_))
        ));
    }

    #[test]
    fn test_duplicate_site_rejected() {
        let ext = ExternalTerms {
            terms: vec![ExternalTerm {
                factors: vec![(1, 'X'), (1, 'Z')],
                coeff_re: 1.0,
                coeff_im: 0.0,
            }],
        };
        assert!(matches!(
            from_external(&ext),
            Err(OpsError::MalformedTerm(_))
        ));
    }
}
