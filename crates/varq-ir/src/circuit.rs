//! Quantum circuit representation.
//!
//! A [`Circuit`] is an ordered sequence of bound gates. Gate order is
//! application order: the circuit matrix is `U_k ··· U_2 U_1` for
//! gates pushed in order `1..k`. Qubit 0 is the least significant bit
//! of a computational basis index.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::matrix;
use crate::parameter::{Bindings, ParameterResolver};

/// An ordered sequence of gates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    gates: Vec<Gate>,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a gate.
    pub fn push(&mut self, gate: Gate) {
        self.gates.push(gate);
    }

    /// Insert a gate at position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, gate: Gate) {
        self.gates.insert(index, gate);
    }

    /// Append every gate of `other`.
    pub fn extend(&mut self, other: impl IntoIterator<Item = Gate>) {
        self.gates.extend(other);
    }

    /// The gates in application order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Iterate over the gates in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Gate> {
        self.gates.iter()
    }

    /// Number of gates.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// True if the circuit holds no gates.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Number of qubits, `1 + max index` over all touched qubits.
    /// An empty circuit has zero qubits.
    pub fn n_qubits(&self) -> u32 {
        self.gates
            .iter()
            .map(|g| g.max_qubit() + 1)
            .max()
            .unwrap_or(0)
    }

    /// True if any gate is a noise channel.
    pub fn has_channel(&self) -> bool {
        self.gates.iter().any(|g| g.kind.is_channel())
    }

    /// True if any gate carries an unbound symbolic coefficient.
    pub fn is_parameterized(&self) -> bool {
        self.gates.iter().any(Gate::is_parameterized)
    }

    /// The union of all gate coefficients as a single resolver.
    ///
    /// Later gates overwrite earlier values for a shared name; a
    /// name's grad flag is fixed by the gate that declares it first.
    pub fn parameter_resolver(&self) -> ParameterResolver {
        let mut total = ParameterResolver::new();
        for gate in &self.gates {
            for pr in gate.parameters() {
                total.combine(pr);
            }
        }
        total
    }

    /// Names of all symbolic coefficients, in declaration order.
    pub fn params_name(&self) -> Vec<String> {
        self.parameter_resolver()
            .params_name()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// The circuit repeated `n` times back to back.
    pub fn repeat(&self, n: usize) -> Self {
        let mut out = Self::new();
        for _ in 0..n {
            out.extend(self.gates.iter().cloned());
        }
        out
    }

    /// Substitute bound names in every gate, leaving the rest
    /// symbolic. Returns a new circuit.
    pub fn apply_value(&self, bindings: &Bindings) -> Self {
        Self {
            gates: self.gates.iter().map(|g| g.apply_value(bindings)).collect(),
        }
    }

    /// Mark every coefficient name in every gate as grad-trainable.
    pub fn requires_grad(&mut self) {
        for gate in &mut self.gates {
            gate.requires_grad();
        }
    }

    /// Freeze every coefficient name out of gradient computation.
    pub fn no_grad(&mut self) {
        for gate in &mut self.gates {
            gate.no_grad();
        }
    }

    /// The adjoint circuit: gates reversed, each replaced by its
    /// adjoint on the same qubits.
    pub fn hermitian(&self) -> Self {
        Self {
            gates: self.gates.iter().rev().map(Gate::hermitian).collect(),
        }
    }

    /// The full unitary matrix of the circuit over `n_qubits()`
    /// qubits, with qubit 0 as the least significant bit.
    ///
    /// An empty circuit yields the 1×1 identity. Fails with
    /// `NonUnitary` if the circuit holds a noise channel and with
    /// `UnboundParameter` if a coefficient name is missing from
    /// `bindings`.
    pub fn matrix(&self, bindings: &Bindings) -> IrResult<Array2<Complex64>> {
        let n = self.n_qubits();
        let mut total = matrix::identity(1usize << n);
        for gate in &self.gates {
            if gate.kind.is_channel() {
                return Err(IrError::NonUnitary {
                    gate: gate.name().to_string(),
                });
            }
            let local = gate.matrix(bindings)?;
            let full = matrix::embed(&local, &gate.targets, &gate.controls, n);
            total = full.dot(&total);
        }
        Ok(total)
    }
}

impl FromIterator<Gate> for Circuit {
    fn from_iter<T: IntoIterator<Item = Gate>>(iter: T) -> Self {
        Self {
            gates: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Circuit {
    type Item = Gate;
    type IntoIter = std::vec::IntoIter<Gate>;

    fn into_iter(self) -> Self::IntoIter {
        self.gates.into_iter()
    }
}

impl<'a> IntoIterator for &'a Circuit {
    type Item = &'a Gate;
    type IntoIter = std::slice::Iter<'a, Gate>;

    fn into_iter(self) -> Self::IntoIter {
        self.gates.iter()
    }
}

impl Add for Circuit {
    type Output = Circuit;

    fn add(mut self, rhs: Circuit) -> Circuit {
        self.gates.extend(rhs.gates);
        self
    }
}

impl Add<&Circuit> for Circuit {
    type Output = Circuit;

    fn add(mut self, rhs: &Circuit) -> Circuit {
        self.extend(rhs.gates.iter().cloned());
        self
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for gate in &self.gates {
            writeln!(f, "{gate}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateKind;
    use crate::matrix::{approx_eq, dagger, identity};
    use crate::parameter::bindings;
    use std::f64::consts::PI;

    const TOL: f64 = 1e-10;

    fn no_bindings() -> Bindings {
        Bindings::default()
    }

    #[test]
    fn test_n_qubits() {
        let mut c = Circuit::new();
        assert_eq!(c.n_qubits(), 0);
        c.push(GateKind::H.on_targets([0u32]).unwrap());
        assert_eq!(c.n_qubits(), 1);
        c.push(GateKind::X.on([0u32], [3u32]).unwrap());
        assert_eq!(c.n_qubits(), 4);
    }

    #[test]
    fn test_empty_matrix_is_scalar_identity() {
        let c = Circuit::new();
        let m = c.matrix(&no_bindings()).unwrap();
        assert_eq!(m.dim(), (1, 1));
        assert!((m[(0, 0)] - Complex64::new(1.0, 0.0)).norm() < TOL);
    }

    #[test]
    fn test_gate_order_is_application_order() {
        // X then H on one qubit: matrix is H·X, not X·H.
        let mut c = Circuit::new();
        c.push(GateKind::X.on_targets([0u32]).unwrap());
        c.push(GateKind::H.on_targets([0u32]).unwrap());
        let m = c.matrix(&no_bindings()).unwrap();

        let x = GateKind::X.on_targets([0u32]).unwrap().matrix(&no_bindings()).unwrap();
        let h = GateKind::H.on_targets([0u32]).unwrap().matrix(&no_bindings()).unwrap();
        assert!(approx_eq(&m, &h.dot(&x), TOL));
    }

    #[test]
    fn test_bell_state_amplitudes() {
        // H q0, then CNOT(control 0, target 1).
        let mut c = Circuit::new();
        c.push(GateKind::H.on_targets([0u32]).unwrap());
        c.push(GateKind::X.on([1u32], [0u32]).unwrap());
        let m = c.matrix(&no_bindings()).unwrap();

        // First column is the state reached from |00>.
        let s = 1.0 / 2.0_f64.sqrt();
        assert!((m[(0, 0)].re - s).abs() < TOL);
        assert!(m[(1, 0)].norm() < TOL);
        assert!(m[(2, 0)].norm() < TOL);
        assert!((m[(3, 0)].re - s).abs() < TOL);
    }

    #[test]
    fn test_little_endian_convention() {
        // X on qubit 1 of a 2-qubit circuit maps |00> to |10> = index 2.
        let mut c = Circuit::new();
        c.push(GateKind::I.on_targets([0u32]).unwrap());
        c.push(GateKind::X.on_targets([1u32]).unwrap());
        let m = c.matrix(&no_bindings()).unwrap();
        assert!((m[(2, 0)].re - 1.0).abs() < TOL);
        assert!(m[(0, 0)].norm() < TOL);
    }

    #[test]
    fn test_repeat() {
        let mut c = Circuit::new();
        c.push(GateKind::rx("a").on_targets([0u32]).unwrap());
        let r = c.repeat(3);
        assert_eq!(r.len(), 3);

        // Three Rx(θ) compose to Rx(3θ).
        let b = bindings([("a", 0.4)]);
        let composed = r.matrix(&b).unwrap();
        let direct = GateKind::rx(1.2)
            .on_targets([0u32])
            .unwrap()
            .matrix(&no_bindings())
            .unwrap();
        assert!(approx_eq(&composed, &direct, TOL));
    }

    #[test]
    fn test_apply_value_partial() {
        let mut c = Circuit::new();
        c.push(GateKind::rx("a").on_targets([0u32]).unwrap());
        c.push(GateKind::rz("b").on_targets([0u32]).unwrap());

        let bound = c.apply_value(&bindings([("a", 0.1)]));
        assert!(bound.is_parameterized());
        assert_eq!(bound.params_name(), vec!["b".to_string()]);

        let fully = bound.apply_value(&bindings([("b", 0.2)]));
        assert!(!fully.is_parameterized());
        fully.matrix(&no_bindings()).unwrap();
    }

    #[test]
    fn test_parameter_resolver_union() {
        let mut c = Circuit::new();
        c.push(GateKind::rx("a").on_targets([0u32]).unwrap());
        c.push(GateKind::ry("b").on_targets([1u32]).unwrap());
        c.push(GateKind::rz("a").on_targets([0u32]).unwrap());
        assert_eq!(
            c.params_name(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_grad_toggles() {
        let mut c = Circuit::new();
        c.push(GateKind::rx("a").on_targets([0u32]).unwrap());
        c.push(GateKind::ry("b").on_targets([0u32]).unwrap());

        c.no_grad();
        let pr = c.parameter_resolver();
        assert!(pr.requires_grad_parameters().is_empty());

        c.requires_grad();
        let pr = c.parameter_resolver();
        assert_eq!(pr.requires_grad_parameters().len(), 2);
    }

    #[test]
    fn test_hermitian_inverts() {
        let mut c = Circuit::new();
        c.push(GateKind::H.on_targets([0u32]).unwrap());
        c.push(GateKind::rx("a").on_targets([0u32]).unwrap());
        c.push(GateKind::T.on_targets([1u32]).unwrap());
        c.push(GateKind::X.on([1u32], [0u32]).unwrap());

        let b = bindings([("a", 0.7)]);
        let m = c.matrix(&b).unwrap();
        let adj = c.hermitian().matrix(&b).unwrap();
        assert!(approx_eq(&adj.dot(&m), &identity(4), TOL));
        assert!(approx_eq(&adj, &dagger(&m), TOL));
    }

    #[test]
    fn test_channel_blocks_matrix() {
        use crate::channel::NoiseChannel;
        let mut c = Circuit::new();
        c.push(GateKind::H.on_targets([0u32]).unwrap());
        c.push(
            GateKind::Channel(NoiseChannel::bit_flip(0.1).unwrap())
                .on_targets([0u32])
                .unwrap(),
        );
        assert!(c.has_channel());
        assert!(matches!(
            c.matrix(&no_bindings()),
            Err(IrError::NonUnitary { .. })
        ));
    }

    #[test]
    fn test_rx_evolution_amplitudes() {
        // Rx(0.3) on q0 and Ry(0.5) on q1 from |00>: amplitude of |01>
        // is -i·sin(0.15)·cos(0.25).
        let mut c = Circuit::new();
        c.push(GateKind::rx(0.3).on_targets([0u32]).unwrap());
        c.push(GateKind::ry(0.5).on_targets([1u32]).unwrap());
        let m = c.matrix(&no_bindings()).unwrap();

        let expect = Complex64::new(0.0, -(0.15f64).sin() * (0.25f64).cos());
        assert!((m[(1, 0)] - expect).norm() < TOL);
        let expect00 = Complex64::new((0.15f64).cos() * (0.25f64).cos(), 0.0);
        assert!((m[(0, 0)] - expect00).norm() < TOL);
    }

    #[test]
    fn test_add_concat() {
        let mut a = Circuit::new();
        a.push(GateKind::H.on_targets([0u32]).unwrap());
        let mut b = Circuit::new();
        b.push(GateKind::X.on_targets([1u32]).unwrap());
        let c = a + b;
        assert_eq!(c.len(), 2);
        assert_eq!(c.gates()[0].name(), "h");
        assert_eq!(c.gates()[1].name(), "x");
    }

    #[test]
    fn test_global_phase_shifts_everything() {
        let mut plain = Circuit::new();
        plain.push(GateKind::H.on_targets([0u32]).unwrap());

        let mut phased = plain.clone();
        phased.push(GateKind::global_phase(PI / 3.0).on_targets([0u32]).unwrap());

        let a = plain.matrix(&no_bindings()).unwrap();
        let b = phased.matrix(&no_bindings()).unwrap();
        let phase = Complex64::from_polar(1.0, -PI / 3.0);
        assert!(approx_eq(&b, &a.mapv(|v| v * phase), TOL));
    }
}
