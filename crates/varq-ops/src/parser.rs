//! Term-string lexing.
//!
//! Operator terms are written the way physicists write them: Pauli
//! terms as `"X0 Y1 Z2"` (letters case-insensitive), fermion terms as
//! `"2^ 0"` where a trailing caret marks a creation operator. The
//! lexer yields `(site, letter)` factors in input order. A repeated
//! site in a Pauli term is rejected; fermion terms may repeat a site,
//! so ladder products like the number operator `"1^ 1"` parse and
//! merge through the single-site table downstream.

use logos::Logos;

use crate::algebra::{FermionAlgebra, FermionLetter, PauliAlgebra, PauliLetter, SiteAlgebra};
use crate::error::{OpsError, OpsResult};

/// An algebra whose terms can be read from a string.
pub trait ParseTerm: SiteAlgebra {
    /// Lex one term body into `(site, letter)` factors, input order.
    fn parse_term(input: &str) -> OpsResult<Vec<(u32, Self::Letter)>>;
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum PauliToken {
    #[regex(r"[XYZxyz][0-9]+", lex_pauli)]
    Factor((u32, PauliLetter)),
}

fn lex_pauli(lex: &mut logos::Lexer<'_, PauliToken>) -> Option<(u32, PauliLetter)> {
    let s = lex.slice();
    let letter = match s.as_bytes()[0].to_ascii_uppercase() {
        b'X' => PauliLetter::X,
        b'Y' => PauliLetter::Y,
        b'Z' => PauliLetter::Z,
        _ => return None,
    };
    let site: u32 = s[1..].parse().ok()?;
    Some((site, letter))
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum FermionToken {
    #[regex(r"[0-9]+\^?", lex_fermion)]
    Factor((u32, FermionLetter)),
}

fn lex_fermion(lex: &mut logos::Lexer<'_, FermionToken>) -> Option<(u32, FermionLetter)> {
    let s = lex.slice();
    if let Some(digits) = s.strip_suffix('^') {
        Some((digits.parse().ok()?, FermionLetter::Adag))
    } else {
        Some((s.parse().ok()?, FermionLetter::A))
    }
}

fn collect<T, L>(input: &str, factors: T) -> OpsResult<Vec<(u32, L)>>
where
    T: Iterator<Item = Result<(u32, L), ()>>,
{
    factors
        .map(|factor| factor.map_err(|()| OpsError::MalformedTerm(input.to_string())))
        .collect()
}

fn reject_repeated_sites<L>(input: &str, factors: &[(u32, L)]) -> OpsResult<()> {
    for (i, (site, _)) in factors.iter().enumerate() {
        if factors[..i].iter().any(|(seen, _)| seen == site) {
            return Err(OpsError::MalformedTerm(format!(
                "duplicate site {site} in '{input}'"
            )));
        }
    }
    Ok(())
}

impl ParseTerm for PauliAlgebra {
    fn parse_term(input: &str) -> OpsResult<Vec<(u32, PauliLetter)>> {
        let factors = collect(
            input,
            PauliToken::lexer(input).map(|tok| match tok {
                Ok(PauliToken::Factor(f)) => Ok(f),
                Err(()) => Err(()),
            }),
        )?;
        // A qubit carries at most one Pauli letter per term.
        reject_repeated_sites(input, &factors)?;
        Ok(factors)
    }
}

impl ParseTerm for FermionAlgebra {
    fn parse_term(input: &str) -> OpsResult<Vec<(u32, FermionLetter)>> {
        collect(
            input,
            FermionToken::lexer(input).map(|tok| match tok {
                Ok(FermionToken::Factor(f)) => Ok(f),
                Err(()) => Err(()),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pauli_terms() {
        assert_eq!(
            PauliAlgebra::parse_term("X0 Y1 Z12").unwrap(),
            vec![
                (0, PauliLetter::X),
                (1, PauliLetter::Y),
                (12, PauliLetter::Z)
            ]
        );
        // Case-insensitive, input order preserved.
        assert_eq!(
            PauliAlgebra::parse_term("z2 x1").unwrap(),
            vec![(2, PauliLetter::Z), (1, PauliLetter::X)]
        );
        // Empty body is the identity term.
        assert_eq!(PauliAlgebra::parse_term("").unwrap(), vec![]);
        assert_eq!(PauliAlgebra::parse_term("  ").unwrap(), vec![]);
    }

    #[test]
    fn test_pauli_rejects() {
        assert!(matches!(
            PauliAlgebra::parse_term("X0 Q1"),
            Err(OpsError::MalformedTerm(_))
        ));
        assert!(matches!(
            PauliAlgebra::parse_term("X1 Z1"),
            Err(OpsError::MalformedTerm(_))
        ));
        assert!(matches!(
            PauliAlgebra::parse_term("X"),
            Err(OpsError::MalformedTerm(_))
        ));
    }

    #[test]
    fn test_fermion_terms() {
        assert_eq!(
            FermionAlgebra::parse_term("2^ 0").unwrap(),
            vec![(2, FermionLetter::Adag), (0, FermionLetter::A)]
        );
        assert_eq!(
            FermionAlgebra::parse_term("1").unwrap(),
            vec![(1, FermionLetter::A)]
        );
        assert_eq!(FermionAlgebra::parse_term("").unwrap(), vec![]);
    }

    #[test]
    fn test_fermion_same_site_ladder_products() {
        // The number operator and its complement are legal terms.
        assert_eq!(
            FermionAlgebra::parse_term("1^ 1").unwrap(),
            vec![(1, FermionLetter::Adag), (1, FermionLetter::A)]
        );
        assert_eq!(
            FermionAlgebra::parse_term("1 1^").unwrap(),
            vec![(1, FermionLetter::A), (1, FermionLetter::Adag)]
        );
    }

    #[test]
    fn test_fermion_rejects() {
        assert!(matches!(
            FermionAlgebra::parse_term("^1"),
            Err(OpsError::MalformedTerm(_))
        ));
        assert!(matches!(
            FermionAlgebra::parse_term("X1"),
            Err(OpsError::MalformedTerm(_))
        ));
    }
}
