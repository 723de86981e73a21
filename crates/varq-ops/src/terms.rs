//! Sparse operator sums over a single-site algebra.
//!
//! A [`TermsOperator`] maps canonical terms to coefficients. A term is
//! a site-sorted product of letters with unique sites; a coefficient
//! is a [`ParameterResolver`], so operators stay symbolic until bound.
//! [`QubitOperator`] and [`FermionOperator`] are the two
//! instantiations.

use num_complex::Complex64;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Div, Mul, Neg, Sub};

use varq_ir::{Bindings, ParameterResolver};

use crate::algebra::{FermionAlgebra, PauliAlgebra, SiteAlgebra, SiteProduct};
use crate::error::{OpsError, OpsResult};
use crate::parser::ParseTerm;

/// Default magnitude below which numeric coefficients are dropped by
/// [`TermsOperator::compress`].
pub const COMPRESS_PRECISION: f64 = 1e-9;

/// A canonical term: site-sorted letters, unique sites.
pub type TermKey<A> = Vec<(u32, <A as SiteAlgebra>::Letter)>;

/// Sum of Pauli terms with resolver coefficients.
pub type QubitOperator = TermsOperator<PauliAlgebra>;

/// Sum of fermionic ladder terms with resolver coefficients.
pub type FermionOperator = TermsOperator<FermionAlgebra>;

/// A sparse sum of terms over the algebra `A`.
#[derive(Debug)]
pub struct TermsOperator<A: SiteAlgebra> {
    terms: BTreeMap<TermKey<A>, ParameterResolver>,
    _algebra: PhantomData<A>,
}

// Manual impl: the algebra marker carries no data, so no `A: Clone`
// bound.
impl<A: SiteAlgebra> Clone for TermsOperator<A> {
    fn clone(&self) -> Self {
        Self {
            terms: self.terms.clone(),
            _algebra: PhantomData,
        }
    }
}

fn is_exact_zero(pr: &ParameterResolver) -> bool {
    pr.const_term().norm() == 0.0
        && pr.params_name().iter().all(|n| pr.partial(n).norm() == 0.0)
}

impl<A: SiteAlgebra> TermsOperator<A> {
    /// The zero operator.
    pub fn new() -> Self {
        Self {
            terms: BTreeMap::new(),
            _algebra: PhantomData,
        }
    }

    /// `coeff · identity`.
    pub fn identity(coeff: impl Into<ParameterResolver>) -> Self {
        let mut op = Self::new();
        op.accumulate(Vec::new(), coeff.into());
        op
    }

    /// Build `coeff · term` from `(site, letter)` factors in arbitrary
    /// order; canonicalization applies the same sorting, merging and
    /// sign rules as parsing and multiplication.
    pub fn from_factors(
        factors: Vec<(u32, A::Letter)>,
        coeff: impl Into<ParameterResolver>,
    ) -> Self {
        let mut op = Self::new();
        op.accumulate_factors(factors, coeff.into());
        op
    }

    /// Bring `factors` (arbitrary order, same-site runs allowed) into
    /// canonical form and add `phase · coeff` for the resulting key.
    /// Within one operator, coefficients on the same key sum.
    fn accumulate_factors(&mut self, factors: Vec<(u32, A::Letter)>, coeff: ParameterResolver) {
        if let Some((key, phase)) = canonicalize::<A>(factors) {
            self.accumulate(key, coeff.scale(phase));
        }
    }

    fn accumulate(&mut self, key: TermKey<A>, coeff: ParameterResolver) {
        use std::collections::btree_map::Entry;
        match self.terms.entry(key) {
            Entry::Vacant(slot) => {
                if !is_exact_zero(&coeff) {
                    slot.insert(coeff);
                }
            }
            Entry::Occupied(mut slot) => {
                let merged = slot.get().add(&coeff);
                // Exact cancellation leaves no entry behind.
                if is_exact_zero(&merged) {
                    slot.remove();
                } else {
                    slot.insert(merged);
                }
            }
        }
    }

    /// The canonical term map.
    pub fn terms(&self) -> &BTreeMap<TermKey<A>, ParameterResolver> {
        &self.terms
    }

    /// Number of terms.
    pub fn size(&self) -> usize {
        self.terms.len()
    }

    /// True for the zero operator.
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// `1 + max site` over all terms; 0 for zero or pure-identity
    /// operators.
    pub fn min_qubits(&self) -> u32 {
        self.terms
            .keys()
            .flat_map(|key| key.iter().map(|(site, _)| site + 1))
            .max()
            .unwrap_or(0)
    }

    /// True if any coefficient carries an unbound symbol.
    pub fn is_parameterized(&self) -> bool {
        self.terms.values().any(|pr| !pr.is_const())
    }

    /// Pointwise sum.
    pub fn plus(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (key, coeff) in &other.terms {
            out.accumulate(key.clone(), coeff.clone());
        }
        out
    }

    /// Pointwise difference.
    pub fn minus(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (key, coeff) in &other.terms {
            out.accumulate(key.clone(), coeff.neg());
        }
        out
    }

    /// Operator product.
    ///
    /// Every term pair merges through the single-site table with
    /// anticommutation signs for odd letters; coefficients multiply.
    /// Fails with `SymbolicCoefficient` when both coefficients of a
    /// pair are symbolic, since the product would no longer be linear
    /// in the symbols.
    pub fn dot(&self, other: &Self) -> OpsResult<Self> {
        let mut out = Self::new();
        for (lk, lc) in &self.terms {
            for (rk, rc) in &other.terms {
                let coeff = mul_resolvers(lc, rc)?;
                let mut factors = lk.clone();
                factors.extend(rk.iter().copied());
                out.accumulate_factors(factors, coeff);
            }
        }
        Ok(out)
    }

    /// Scale every coefficient by a constant.
    pub fn scale(&self, scalar: impl Into<Complex64>) -> Self {
        let scalar = scalar.into();
        let mut out = Self::new();
        for (key, coeff) in &self.terms {
            out.accumulate(key.clone(), coeff.scale(scalar));
        }
        out
    }

    /// Scale every coefficient by a resolver. Fails with
    /// `SymbolicCoefficient` when both this operator and the scalar
    /// carry symbols.
    pub fn scale_symbolic(&self, scalar: &ParameterResolver) -> OpsResult<Self> {
        let mut out = Self::new();
        for (key, coeff) in &self.terms {
            out.accumulate(key.clone(), mul_resolvers(coeff, scalar)?);
        }
        Ok(out)
    }

    /// Drop terms whose fully-numeric coefficient magnitude falls
    /// below `tol`; symbolic coefficients are never dropped.
    /// Idempotent.
    pub fn compress(&self, tol: f64) -> Self {
        let mut out = Self::new();
        for (key, coeff) in &self.terms {
            if coeff.is_const() && coeff.const_term().norm() < tol {
                continue;
            }
            out.terms.insert(key.clone(), coeff.clone());
        }
        out
    }

    /// Substitute bound names into every coefficient, leaving the
    /// rest symbolic.
    pub fn subs(&self, bindings: &Bindings) -> Self {
        let mut out = Self::new();
        for (key, coeff) in &self.terms {
            out.accumulate(key.clone(), coeff.partial_substitute(bindings));
        }
        out
    }

    /// True if the operator holds exactly one term.
    pub fn is_singlet(&self) -> bool {
        self.terms.len() == 1
    }

    /// Split into one operator per term.
    pub fn singlets(&self) -> Vec<Self> {
        self.terms
            .iter()
            .map(|(key, coeff)| {
                let mut op = Self::new();
                op.terms.insert(key.clone(), coeff.clone());
                op
            })
            .collect()
    }

    /// The coefficient of the single term, if there is exactly one.
    pub fn singlet_coeff(&self) -> Option<&ParameterResolver> {
        if self.is_singlet() {
            self.terms.values().next()
        } else {
            None
        }
    }

    /// For a single-term operator, split the term into unit-coefficient
    /// single-letter operators, one per site factor.
    pub fn split_letters(&self) -> Option<Vec<Self>> {
        if !self.is_singlet() {
            return None;
        }
        let key = self.terms.keys().next()?;
        Some(
            key.iter()
                .map(|&(site, letter)| {
                    let mut op = Self::new();
                    op.terms
                        .insert(vec![(site, letter)], ParameterResolver::constant(1.0));
                    op
                })
                .collect(),
        )
    }
}

impl<A: ParseTerm> TermsOperator<A> {
    /// Build `coeff · term` from a term string such as `"Z1 Z2"` or
    /// `"2^ 0"`. Canonicalization sorts by site and tracks the
    /// anticommutation sign for odd letters.
    pub fn parse(term: &str, coeff: impl Into<ParameterResolver>) -> OpsResult<Self> {
        let factors = A::parse_term(term)?;
        let mut op = Self::new();
        op.accumulate_factors(factors, coeff.into());
        Ok(op)
    }

    /// Shorthand for [`parse`](Self::parse) with coefficient 1.
    pub fn from_term(term: &str) -> OpsResult<Self> {
        Self::parse(term, 1.0)
    }
}

/// Multiply two linear coefficient forms. At most one side may carry
/// symbols.
fn mul_resolvers(a: &ParameterResolver, b: &ParameterResolver) -> OpsResult<ParameterResolver> {
    if a.is_const() {
        Ok(b.scale(a.const_term()))
    } else if b.is_const() {
        Ok(a.scale(b.const_term()))
    } else {
        Err(OpsError::SymbolicCoefficient(format!("{a} * {b}")))
    }
}

/// Sort factors by site and merge same-site runs through the algebra
/// table. Returns the canonical key and accumulated phase, or `None`
/// if a same-site product annihilates the term.
fn canonicalize<A: SiteAlgebra>(
    mut factors: Vec<(u32, A::Letter)>,
) -> Option<(TermKey<A>, Complex64)> {
    let mut phase = Complex64::new(1.0, 0.0);

    // Stable bubble sort; each swap of two odd letters flips the sign.
    loop {
        let mut swapped = false;
        for i in 1..factors.len() {
            if factors[i - 1].0 > factors[i].0 {
                if A::parity(factors[i - 1].1) && A::parity(factors[i].1) {
                    phase = -phase;
                }
                factors.swap(i - 1, i);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }

    let mut key: TermKey<A> = Vec::with_capacity(factors.len());
    for (site, letter) in factors {
        match key.last().copied() {
            Some((prev_site, prev_letter)) if prev_site == site => {
                match A::mul(prev_letter, letter) {
                    SiteProduct::Annihilated => return None,
                    SiteProduct::Scalar(p) => {
                        phase *= p;
                        key.pop();
                    }
                    SiteProduct::Letter(p, merged) => {
                        phase *= p;
                        key.last_mut().expect("run is non-empty").1 = merged;
                    }
                }
            }
            _ => key.push((site, letter)),
        }
    }
    Some((key, phase))
}

impl<A: SiteAlgebra> Default for TermsOperator<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: SiteAlgebra> PartialEq for TermsOperator<A> {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms
    }
}

impl<A: SiteAlgebra> Add for TermsOperator<A> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.plus(&rhs)
    }
}

impl<A: SiteAlgebra> Sub for TermsOperator<A> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.minus(&rhs)
    }
}

impl<A: SiteAlgebra> Neg for TermsOperator<A> {
    type Output = Self;

    fn neg(self) -> Self {
        self.scale(-1.0)
    }
}

impl<A: SiteAlgebra> Mul<f64> for TermsOperator<A> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

impl<A: SiteAlgebra> Mul<Complex64> for TermsOperator<A> {
    type Output = Self;

    fn mul(self, rhs: Complex64) -> Self {
        self.scale(rhs)
    }
}

impl<A: SiteAlgebra> Div<f64> for TermsOperator<A> {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        self.scale(1.0 / rhs)
    }
}

impl<A: SiteAlgebra> fmt::Display for TermsOperator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        let last = self.terms.len() - 1;
        for (i, (key, coeff)) in self.terms.iter().enumerate() {
            write!(f, "{coeff} [")?;
            for (j, &(site, letter)) in key.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                A::write_letter(f, site, letter)?;
            }
            write!(f, "] ")?;
            if i != last {
                writeln!(f, "+")?;
            }
        }
        Ok(())
    }
}

// JSON persistence. The term map serializes as an entry list because
// JSON object keys must be strings.
impl<A: SiteAlgebra> TermsOperator<A> {
    /// Serialize to JSON.
    pub fn dumps(&self) -> OpsResult<String> {
        let entries: Vec<(&TermKey<A>, &ParameterResolver)> = self.terms.iter().collect();
        serde_json::to_string(&entries).map_err(|e| OpsError::Serialization(e.to_string()))
    }

    /// Deserialize from JSON produced by [`dumps`](Self::dumps).
    pub fn loads(data: &str) -> OpsResult<Self> {
        let entries: Vec<(TermKey<A>, ParameterResolver)> =
            serde_json::from_str(data).map_err(|e| OpsError::Serialization(e.to_string()))?;
        let mut op = Self::new();
        for (key, coeff) in entries {
            op.accumulate(key, coeff);
        }
        Ok(op)
    }
}
