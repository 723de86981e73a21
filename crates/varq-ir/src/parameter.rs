//! Symbolic coefficients for parameterized gates and operators.
//!
//! A [`ParameterResolver`] is a linear combination of named parameters
//! plus a constant term:
//!
//!   value = const + Σ_i  c_i · name_i
//!
//! Coefficients are complex so the same type can carry operator
//! coefficients (e.g. `i`·Z₁) and gate angles alike. Every declared
//! name is either grad-trainable or frozen; names are trainable by
//! default and the frozen subset is tracked explicitly, so the two
//! sets always partition the declared names.

use num_complex::Complex64;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};

/// Numeric bindings for symbolic parameters.
pub type Bindings = FxHashMap<String, f64>;

/// Build a [`Bindings`] map from name/value pairs.
pub fn bindings<S: Into<String>>(pairs: impl IntoIterator<Item = (S, f64)>) -> Bindings {
    pairs.into_iter().map(|(n, v)| (n.into(), v)).collect()
}

/// A named, partially-symbolic coefficient bundle with grad metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterResolver {
    /// Declared names, in insertion order.
    names: Vec<String>,
    /// Linear coefficient per declared name.
    values: FxHashMap<String, Complex64>,
    /// Names frozen out of gradient computation.
    no_grad: FxHashSet<String>,
    /// Parameter-independent term.
    const_term: Complex64,
}

impl ParameterResolver {
    /// Create an empty (zero-valued) resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a constant resolver with no declared names.
    pub fn constant(value: impl Into<Complex64>) -> Self {
        Self {
            const_term: value.into(),
            ..Self::default()
        }
    }

    /// Create a resolver for a single name with coefficient 1.
    pub fn single(name: impl Into<String>) -> Self {
        let mut pr = Self::new();
        pr.set(name, Complex64::new(1.0, 0.0));
        pr
    }

    /// Create a resolver from name/coefficient pairs.
    pub fn from_pairs<S, C>(pairs: impl IntoIterator<Item = (S, C)>) -> Self
    where
        S: Into<String>,
        C: Into<Complex64>,
    {
        let mut pr = Self::new();
        for (name, value) in pairs {
            pr.set(name, value);
        }
        pr
    }

    /// Declare a name or overwrite its coefficient.
    ///
    /// Newly declared names are grad-trainable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Complex64>) {
        let name = name.into();
        if !self.values.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.values.insert(name, value.into());
    }

    /// Get the coefficient of a declared name.
    pub fn get(&self, name: &str) -> Option<Complex64> {
        self.values.get(name).copied()
    }

    /// Declared names, in insertion order.
    pub fn params_name(&self) -> &[String] {
        &self.names
    }

    /// Coefficients in declaration order.
    pub fn para_value(&self) -> Vec<Complex64> {
        self.names.iter().map(|n| self.values[n]).collect()
    }

    /// The parameter-independent term.
    pub fn const_term(&self) -> Complex64 {
        self.const_term
    }

    /// Set the parameter-independent term.
    pub fn set_const(&mut self, value: impl Into<Complex64>) {
        self.const_term = value.into();
    }

    /// True if no names are declared.
    pub fn is_const(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of declared names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no names are declared and the constant is zero.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.const_term == Complex64::new(0.0, 0.0)
    }

    /// Check whether a name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The linear coefficient of a name: the partial derivative of the
    /// resolved value with respect to it. Zero for undeclared names.
    pub fn partial(&self, name: &str) -> Complex64 {
        self.get(name).unwrap_or(Complex64::new(0.0, 0.0))
    }

    // =========================================================================
    // Combination and substitution
    // =========================================================================

    /// Merge another resolver into this one.
    ///
    /// Colliding names take the incoming *value* but keep the grad flag
    /// of the existing declaration; names new to this resolver arrive
    /// with their incoming flag. Constants are left untouched. This is
    /// the lenient policy; see [`combine_strict`](Self::combine_strict)
    /// for the failing variant.
    pub fn combine(&mut self, other: &Self) {
        for name in &other.names {
            let known = self.values.contains_key(name);
            self.set(name.clone(), other.values[name]);
            if !known && other.no_grad.contains(name) {
                self.no_grad.insert(name.clone());
            }
        }
    }

    /// Merge another resolver, failing on any shared name.
    pub fn combine_strict(&mut self, other: &Self) -> IrResult<()> {
        if let Some(name) = other.names.iter().find(|n| self.contains(n)) {
            return Err(IrError::NameConflict(name.clone()));
        }
        self.combine(other);
        Ok(())
    }

    /// Resolve to a fully numeric value.
    ///
    /// Every declared name must have a binding.
    pub fn substitute(&self, bindings: &Bindings) -> IrResult<Complex64> {
        let mut total = self.const_term;
        for name in &self.names {
            let value = bindings
                .get(name)
                .ok_or_else(|| IrError::UnboundParameter(name.clone()))?;
            total += self.values[name] * *value;
        }
        Ok(total)
    }

    /// Bind whichever names appear in `bindings`, folding them into the
    /// constant term. Unbound names stay symbolic.
    pub fn partial_substitute(&self, bindings: &Bindings) -> Self {
        let mut out = Self::new();
        out.const_term = self.const_term;
        for name in &self.names {
            match bindings.get(name) {
                Some(value) => out.const_term += self.values[name] * *value,
                None => {
                    out.set(name.clone(), self.values[name]);
                    if self.no_grad.contains(name) {
                        out.no_grad.insert(name.clone());
                    }
                }
            }
        }
        out
    }

    // =========================================================================
    // Grad partition
    // =========================================================================

    /// Mark every declared name as grad-trainable.
    pub fn requires_grad(&mut self) {
        self.no_grad.clear();
    }

    /// Freeze every declared name out of gradient computation.
    pub fn no_grad(&mut self) {
        self.no_grad = self.names.iter().cloned().collect();
    }

    /// Move the given names into the trainable partition.
    pub fn requires_grad_part<S: AsRef<str>>(
        &mut self,
        names: impl IntoIterator<Item = S>,
    ) -> IrResult<()> {
        for name in names {
            let name = name.as_ref();
            if !self.contains(name) {
                return Err(IrError::UnknownParameter(name.to_string()));
            }
            self.no_grad.remove(name);
        }
        Ok(())
    }

    /// Move the given names into the frozen partition.
    pub fn no_grad_part<S: AsRef<str>>(
        &mut self,
        names: impl IntoIterator<Item = S>,
    ) -> IrResult<()> {
        for name in names {
            let name = name.as_ref();
            if !self.contains(name) {
                return Err(IrError::UnknownParameter(name.to_string()));
            }
            self.no_grad.insert(name.to_string());
        }
        Ok(())
    }

    /// The trainable names.
    pub fn requires_grad_parameters(&self) -> FxHashSet<&str> {
        self.names
            .iter()
            .filter(|n| !self.no_grad.contains(n.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// The frozen names.
    pub fn no_grad_parameters(&self) -> FxHashSet<&str> {
        self.names
            .iter()
            .filter(|n| self.no_grad.contains(n.as_str()))
            .map(String::as_str)
            .collect()
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    /// Elementwise sum; names on one side only are implicitly zero on
    /// the other. Shared names keep this resolver's grad flag.
    pub fn add(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.const_term += other.const_term;
        for name in &other.names {
            let sum = out.partial(name) + other.values[name];
            let known = out.contains(name);
            out.set(name.clone(), sum);
            if !known && other.no_grad.contains(name) {
                out.no_grad.insert(name.clone());
            }
        }
        out
    }

    /// Elementwise difference, with the same name conventions as `add`.
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.scale(Complex64::new(-1.0, 0.0)))
    }

    /// Scale every coefficient (and the constant) by a scalar.
    pub fn scale(&self, scalar: impl Into<Complex64>) -> Self {
        let scalar = scalar.into();
        let mut out = self.clone();
        out.const_term *= scalar;
        for value in out.values.values_mut() {
            *value *= scalar;
        }
        out
    }

    /// Divide every coefficient (and the constant) by a scalar.
    pub fn div(&self, scalar: impl Into<Complex64>) -> Self {
        self.scale(Complex64::new(1.0, 0.0) / scalar.into())
    }

    /// Negate every coefficient and the constant.
    pub fn neg(&self) -> Self {
        self.scale(Complex64::new(-1.0, 0.0))
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Serialize to a lossless JSON string.
    pub fn dumps(&self) -> IrResult<String> {
        serde_json::to_string(self).map_err(|e| IrError::Serialization(e.to_string()))
    }

    /// Parse a resolver back from [`dumps`](Self::dumps) output.
    pub fn loads(s: &str) -> IrResult<Self> {
        let pr: Self =
            serde_json::from_str(s).map_err(|e| IrError::Serialization(e.to_string()))?;
        for name in &pr.no_grad {
            if !pr.values.contains_key(name) {
                return Err(IrError::Serialization(format!(
                    "no-grad name '{name}' is not declared"
                )));
            }
        }
        Ok(pr)
    }
}

impl PartialEq for ParameterResolver {
    fn eq(&self, other: &Self) -> bool {
        // Name order is bookkeeping, not value.
        self.const_term == other.const_term
            && self.values == other.values
            && self.no_grad == other.no_grad
    }
}

impl From<f64> for ParameterResolver {
    fn from(value: f64) -> Self {
        ParameterResolver::constant(value)
    }
}

impl From<Complex64> for ParameterResolver {
    fn from(value: Complex64) -> Self {
        ParameterResolver::constant(value)
    }
}

impl From<&str> for ParameterResolver {
    fn from(name: &str) -> Self {
        ParameterResolver::single(name)
    }
}

impl From<String> for ParameterResolver {
    fn from(name: String) -> Self {
        ParameterResolver::single(name)
    }
}

impl std::ops::Add for ParameterResolver {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParameterResolver::add(&self, &rhs)
    }
}

impl std::ops::Sub for ParameterResolver {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        ParameterResolver::sub(&self, &rhs)
    }
}

impl std::ops::Mul<f64> for ParameterResolver {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl std::ops::Div<f64> for ParameterResolver {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        ParameterResolver::div(&self, rhs)
    }
}

impl std::ops::Neg for ParameterResolver {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterResolver::neg(&self)
    }
}

/// Format a complex scalar the way operator sums print coefficients:
/// plain for reals, `(1j)`-style for imaginary and complex values.
pub(crate) fn format_complex(c: Complex64) -> String {
    if c.im == 0.0 {
        format_real(c.re)
    } else if c.re == 0.0 {
        format!("({}j)", format_real(c.im))
    } else {
        let sign = if c.im < 0.0 { "-" } else { "+" };
        format!("({}{}{}j)", format_real(c.re), sign, format_real(c.im.abs()))
    }
}

fn format_real(x: f64) -> String {
    if x == x.trunc() && x.abs() < 1e15 {
        return format!("{}", x as i64);
    }
    if let Some((p, q)) = as_fraction(x) {
        return format!("{p}/{q}");
    }
    format!("{x}")
}

/// Proper fractions with a small or power-of-ten denominator render as
/// `p/q`, so `0.5` prints as `1/2` and `1e-4` as `1/10000`. Values of
/// magnitude one or more keep decimal notation.
fn as_fraction(x: f64) -> Option<(i64, u64)> {
    if !x.is_finite() || x.abs() >= 1.0 {
        return None;
    }
    let denominators = (2u64..=100).chain((3u32..=9).map(|k| 10u64.pow(k)));
    for q in denominators {
        let p = (x * q as f64).round();
        // Exact reproduction only; approximations keep the decimal.
        if p != 0.0 && p / q as f64 == x {
            let g = gcd(p.abs() as u64, q);
            return Some((p as i64 / g as i64, q / g));
        }
    }
    None
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

impl fmt::Display for ParameterResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const() {
            return write!(f, "{}", format_complex(self.const_term));
        }
        let mut parts = Vec::with_capacity(self.names.len() + 1);
        for name in &self.names {
            let c = self.values[name];
            if c == Complex64::new(1.0, 0.0) {
                parts.push(name.clone());
            } else if c == Complex64::new(-1.0, 0.0) {
                parts.push(format!("-{name}"));
            } else {
                parts.push(format!("{}*{name}", format_complex(c)));
            }
        }
        if self.const_term != Complex64::new(0.0, 0.0) {
            parts.push(format_complex(self.const_term));
        }
        write!(f, "{}", parts.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_constant() {
        let pr = ParameterResolver::constant(1.5);
        assert!(pr.is_const());
        assert_eq!(pr.substitute(&Bindings::default()).unwrap(), c(1.5));
    }

    #[test]
    fn test_ordered_names_and_values() {
        let mut pr = ParameterResolver::from_pairs([("a", 1.0)]);
        pr.set("b", 2.0);
        pr.set("c", 3.0);
        pr.set("d", 4.0);
        let pr = pr.scale(2.0).scale(2.0);
        assert_eq!(pr.params_name(), ["a", "b", "c", "d"]);
        assert_eq!(pr.para_value(), vec![c(4.0), c(8.0), c(12.0), c(16.0)]);
    }

    #[test]
    fn test_grad_partition() {
        let mut pr = ParameterResolver::from_pairs([("a", 1.0), ("b", 2.0)]);
        let mut frozen = ParameterResolver::from_pairs([("e", 5.0), ("f", 6.0)]);
        frozen.no_grad();
        pr.combine(&frozen);

        pr.requires_grad_part(["e"]).unwrap();
        pr.no_grad_part(["b"]).unwrap();
        assert_eq!(
            pr.requires_grad_parameters(),
            ["a", "e"].into_iter().collect()
        );
        assert_eq!(pr.no_grad_parameters(), ["b", "f"].into_iter().collect());

        pr.requires_grad();
        assert!(pr.no_grad_parameters().is_empty());
    }

    #[test]
    fn test_grad_scenario_whole_set_toggle() {
        let mut pr = ParameterResolver::from_pairs([("a", 1.0)]);
        pr.requires_grad_part(["a"]).unwrap();
        pr.no_grad();
        assert_eq!(pr.no_grad_parameters(), ["a"].into_iter().collect());
    }

    #[test]
    fn test_unknown_parameter() {
        let mut pr = ParameterResolver::from_pairs([("a", 1.0)]);
        assert!(matches!(
            pr.no_grad_part(["zz"]),
            Err(IrError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_combine_policy() {
        // Incoming value wins; base grad flag wins.
        let mut base = ParameterResolver::from_pairs([("a", 1.0)]);
        let mut incoming = ParameterResolver::from_pairs([("a", 2.0), ("b", 3.0)]);
        incoming.no_grad();
        base.combine(&incoming);
        assert_eq!(base.get("a"), Some(c(2.0)));
        assert_eq!(base.get("b"), Some(c(3.0)));
        // 'a' was declared trainable in the base; 'b' arrives frozen.
        assert_eq!(base.requires_grad_parameters(), ["a"].into_iter().collect());
        assert_eq!(base.no_grad_parameters(), ["b"].into_iter().collect());
    }

    #[test]
    fn test_combine_strict_conflict() {
        let mut base = ParameterResolver::from_pairs([("a", 1.0)]);
        let other = ParameterResolver::from_pairs([("a", 2.0)]);
        assert!(matches!(
            base.combine_strict(&other),
            Err(IrError::NameConflict(_))
        ));
    }

    #[test]
    fn test_substitute() {
        let pr = ParameterResolver::from_pairs([("a", 2.0), ("b", 1.0)]);
        let value = pr.substitute(&bindings([("a", 0.5), ("b", 3.0)])).unwrap();
        assert_eq!(value, c(4.0));

        assert!(matches!(
            pr.substitute(&bindings([("a", 0.5)])),
            Err(IrError::UnboundParameter(_))
        ));
    }

    #[test]
    fn test_partial_substitute() {
        let pr = ParameterResolver::from_pairs([("a", 2.0), ("b", 1.0)]);
        let bound = pr.partial_substitute(&bindings([("a", 0.5)]));
        assert_eq!(bound.params_name(), ["b"]);
        assert_eq!(bound.const_term(), c(1.0));
    }

    #[test]
    fn test_arithmetic_union() {
        let a = ParameterResolver::from_pairs([("x", 1.0)]);
        let b = ParameterResolver::from_pairs([("x", 2.0), ("y", 3.0)]);
        let sum = a.add(&b);
        assert_eq!(sum.get("x"), Some(c(3.0)));
        assert_eq!(sum.get("y"), Some(c(3.0)));

        let diff = a.sub(&b);
        assert_eq!(diff.get("x"), Some(c(-1.0)));
        assert_eq!(diff.get("y"), Some(c(-3.0)));
    }

    #[test]
    fn test_dumps_loads_roundtrip() {
        let mut pr =
            ParameterResolver::from_pairs([("a", 1.0), ("b", 2.0), ("c", 3.0), ("d", 4.0)]);
        pr.no_grad_part(["a", "b"]).unwrap();
        let s = pr.dumps().unwrap();
        let back = ParameterResolver::loads(&s).unwrap();
        assert_eq!(back, pr);
        assert_eq!(back.params_name(), pr.params_name());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_resolver() -> impl Strategy<Value = ParameterResolver> {
            let names = proptest::sample::subsequence(vec!["a", "b", "c", "d"], 0..4);
            (names, -10.0..10.0f64, -10.0..10.0f64).prop_map(|(names, coeff, konst)| {
                let mut pr = ParameterResolver::constant(konst);
                for (i, name) in names.into_iter().enumerate() {
                    pr.set(name, coeff + i as f64);
                }
                pr
            })
        }

        proptest! {
            #[test]
            fn substitution_is_linear(a in arb_resolver(), b in arb_resolver()) {
                let values = bindings([("a", 0.3), ("b", -1.1), ("c", 2.0), ("d", 0.0)]);
                let sum = a.add(&b).substitute(&values).unwrap();
                let parts = a.substitute(&values).unwrap() + b.substitute(&values).unwrap();
                prop_assert!((sum - parts).norm() < 1e-9);
            }

            #[test]
            fn partial_then_full_matches_direct(pr in arb_resolver()) {
                let first = bindings([("a", 0.5), ("c", -2.0)]);
                let rest = bindings([("b", 1.5), ("d", 4.0)]);
                let all = bindings([("a", 0.5), ("b", 1.5), ("c", -2.0), ("d", 4.0)]);
                let staged = pr.partial_substitute(&first).substitute(&rest).unwrap();
                let direct = pr.substitute(&all).unwrap();
                prop_assert!((staged - direct).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn test_display() {
        let pr = ParameterResolver::single("a");
        assert_eq!(format!("{pr}"), "a");
        assert_eq!(format!("{}", pr.scale(2.0)), "2*a");
        assert_eq!(format!("{}", pr.scale(-1.0)), "-a");
        assert_eq!(
            format!("{}", ParameterResolver::constant(Complex64::new(0.0, 1.0))),
            "(1j)"
        );
        assert_eq!(format!("{}", ParameterResolver::constant(-2.0)), "-2");
    }

    #[test]
    fn test_display_fractions() {
        // Proper fractions print as p/q, larger values stay decimal.
        assert_eq!(format!("{}", ParameterResolver::constant(0.5)), "1/2");
        assert_eq!(
            format!("{}", ParameterResolver::single("a").scale(0.5)),
            "1/2*a"
        );
        assert_eq!(
            format!("{}", ParameterResolver::single("a").scale(-0.5)),
            "-1/2*a"
        );
        assert_eq!(format!("{}", ParameterResolver::constant(1e-4)), "1/10000");
        assert_eq!(
            format!("{}", ParameterResolver::constant(1e-9)),
            "1/1000000000"
        );
        assert_eq!(
            format!(
                "{}",
                ParameterResolver::constant(Complex64::new(0.0, -1e-9))
            ),
            "(-1/1000000000j)"
        );
        assert_eq!(format!("{}", ParameterResolver::constant(1.1)), "1.1");
        assert_eq!(format!("{}", ParameterResolver::constant(0.75)), "3/4");
    }
}
