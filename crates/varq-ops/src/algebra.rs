//! Single-site operator algebras.
//!
//! An operator term is a product of single-site letters. When two
//! terms multiply, letters landing on the same site combine through a
//! closed single-site table; the table result is a phase and at most
//! one letter. [`PauliAlgebra`] and [`FermionAlgebra`] provide the two
//! tables used by the operator types.

use num_complex::Complex64;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;

/// Result of multiplying two letters on one site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SiteProduct<L> {
    /// The product is zero; the whole term vanishes.
    Annihilated,
    /// The product is `phase · identity`; the site drops out.
    Scalar(Complex64),
    /// The product is `phase · letter`.
    Letter(Complex64, L),
}

/// A closed single-site algebra.
pub trait SiteAlgebra {
    /// Non-identity letters of the algebra.
    type Letter: Copy + Eq + Ord + fmt::Debug + Serialize + DeserializeOwned + 'static;

    /// Multiply `l · r` on one site.
    fn mul(l: Self::Letter, r: Self::Letter) -> SiteProduct<Self::Letter>;

    /// Odd letters pick up a sign when reordered past each other
    /// across sites.
    fn parity(letter: Self::Letter) -> bool;

    /// Render `letter` applied to `site` inside a term bracket.
    fn write_letter(f: &mut fmt::Formatter<'_>, site: u32, letter: Self::Letter) -> fmt::Result;
}

/// Pauli letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PauliLetter {
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

/// The Pauli single-site algebra.
///
/// Squares are the identity; distinct letters multiply to the third
/// with phase `+i` in cyclic order (X·Y = iZ) and `-i` against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauliAlgebra;

impl SiteAlgebra for PauliAlgebra {
    type Letter = PauliLetter;

    fn mul(l: PauliLetter, r: PauliLetter) -> SiteProduct<PauliLetter> {
        use PauliLetter::{X, Y, Z};
        let i = Complex64::new(0.0, 1.0);
        let one = Complex64::new(1.0, 0.0);
        match (l, r) {
            (X, X) | (Y, Y) | (Z, Z) => SiteProduct::Scalar(one),
            (X, Y) => SiteProduct::Letter(i, Z),
            (Y, X) => SiteProduct::Letter(-i, Z),
            (Y, Z) => SiteProduct::Letter(i, X),
            (Z, Y) => SiteProduct::Letter(-i, X),
            (Z, X) => SiteProduct::Letter(i, Y),
            (X, Z) => SiteProduct::Letter(-i, Y),
        }
    }

    fn parity(_letter: PauliLetter) -> bool {
        false
    }

    fn write_letter(f: &mut fmt::Formatter<'_>, site: u32, letter: PauliLetter) -> fmt::Result {
        let c = match letter {
            PauliLetter::X => 'X',
            PauliLetter::Y => 'Y',
            PauliLetter::Z => 'Z',
        };
        write!(f, "{c}{site}")
    }
}

/// Fermionic ladder letters.
///
/// `N` and `NBar` are the number operator `a†a` and its complement
/// `aa†`; they arise from same-site products and close the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FermionLetter {
    /// Annihilation operator `a`.
    A,
    /// Creation operator `a†`.
    Adag,
    /// Number operator `a†a`.
    N,
    /// Hole operator `aa†`.
    NBar,
}

/// The fermionic single-site algebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FermionAlgebra;

impl SiteAlgebra for FermionAlgebra {
    type Letter = FermionLetter;

    fn mul(l: FermionLetter, r: FermionLetter) -> SiteProduct<FermionLetter> {
        use FermionLetter::{A, Adag, N, NBar};
        let one = Complex64::new(1.0, 0.0);
        match (l, r) {
            // Ladder products land on the projectors.
            (A, Adag) => SiteProduct::Letter(one, NBar),
            (Adag, A) => SiteProduct::Letter(one, N),
            // Projector absorption.
            (A, N) | (NBar, A) => SiteProduct::Letter(one, A),
            (Adag, NBar) | (N, Adag) => SiteProduct::Letter(one, Adag),
            (N, N) => SiteProduct::Letter(one, N),
            (NBar, NBar) => SiteProduct::Letter(one, NBar),
            // Everything else is zero.
            (A, A)
            | (Adag, Adag)
            | (A, NBar)
            | (NBar, Adag)
            | (Adag, N)
            | (N, A)
            | (N, NBar)
            | (NBar, N) => SiteProduct::Annihilated,
        }
    }

    fn parity(letter: FermionLetter) -> bool {
        matches!(letter, FermionLetter::A | FermionLetter::Adag)
    }

    fn write_letter(f: &mut fmt::Formatter<'_>, site: u32, letter: FermionLetter) -> fmt::Result {
        match letter {
            FermionLetter::A => write!(f, "{site}"),
            FermionLetter::Adag => write!(f, "{site}^"),
            // Projectors render as their ladder expansion, which the
            // parser merges back through the table.
            FermionLetter::N => write!(f, "{site}^ {site}"),
            FermionLetter::NBar => write!(f, "{site} {site}^"),
        }
    }
}
