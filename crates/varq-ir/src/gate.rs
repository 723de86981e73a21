//! Quantum gate types.
//!
//! [`GateKind`] is a closed enumeration of known gate kinds; the
//! per-kind capability table (arity, hermitian transform, derivative
//! rule) lives in match arms rather than in a type hierarchy. A
//! [`Gate`] is a kind bound to target and control qubits via
//! [`GateKind::on`].

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::channel::NoiseChannel;
use crate::error::{IrError, IrResult};
use crate::matrix;
use crate::parameter::{Bindings, ParameterResolver};
use crate::qubit::QubitId;

/// A user-supplied unitary matrix gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitaryGate {
    /// Name of the gate.
    pub name: String,
    /// Number of target qubits.
    pub num_qubits: u32,
    /// Row-major 2^n × 2^n matrix.
    pub matrix: Vec<Complex64>,
}

impl UnitaryGate {
    /// Create a new matrix gate. The matrix must hold exactly
    /// `(2^num_qubits)^2` row-major entries.
    pub fn new(
        name: impl Into<String>,
        num_qubits: u32,
        matrix: Vec<Complex64>,
    ) -> IrResult<Self> {
        let name = name.into();
        let dim = 1usize << num_qubits;
        if matrix.len() != dim * dim {
            return Err(IrError::InvalidMatrixShape {
                gate: name,
                num_qubits,
                expected: dim * dim,
                got: matrix.len(),
            });
        }
        Ok(Self {
            name,
            num_qubits,
            matrix,
        })
    }
}

/// A gate kind, possibly carrying symbolic coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum GateKind {
    // Fixed single-qubit gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// SWAP gate.
    Swap,

    // Rotation family
    /// Rotation around X: exp(-iθX/2).
    Rx(ParameterResolver),
    /// Rotation around Y: exp(-iθY/2).
    Ry(ParameterResolver),
    /// Rotation around Z: exp(-iθZ/2).
    Rz(ParameterResolver),
    /// Ising XX coupling: exp(-iθ X⊗X).
    Rxx(ParameterResolver),
    /// Ising YY coupling: exp(-iθ Y⊗Y).
    Ryy(ParameterResolver),
    /// Ising ZZ coupling: exp(-iθ Z⊗Z).
    Rzz(ParameterResolver),
    /// Phase shift: diag(1, e^{iθ}).
    PhaseShift(ParameterResolver),
    /// Global phase: e^{-iθ}·I.
    GlobalPhase(ParameterResolver),
    /// Universal single-qubit gate U3(θ, φ, λ).
    U3(ParameterResolver, ParameterResolver, ParameterResolver),
    /// Fermionic simulation gate FSim(θ, φ).
    FSim(ParameterResolver, ParameterResolver),

    /// A user-defined unitary matrix gate.
    Unitary(UnitaryGate),

    /// A noise channel (non-unitary).
    Channel(NoiseChannel),
}

impl GateKind {
    /// Rotation around X.
    pub fn rx(theta: impl Into<ParameterResolver>) -> Self {
        GateKind::Rx(theta.into())
    }

    /// Rotation around Y.
    pub fn ry(theta: impl Into<ParameterResolver>) -> Self {
        GateKind::Ry(theta.into())
    }

    /// Rotation around Z.
    pub fn rz(theta: impl Into<ParameterResolver>) -> Self {
        GateKind::Rz(theta.into())
    }

    /// XX coupling rotation.
    pub fn rxx(theta: impl Into<ParameterResolver>) -> Self {
        GateKind::Rxx(theta.into())
    }

    /// YY coupling rotation.
    pub fn ryy(theta: impl Into<ParameterResolver>) -> Self {
        GateKind::Ryy(theta.into())
    }

    /// ZZ coupling rotation.
    pub fn rzz(theta: impl Into<ParameterResolver>) -> Self {
        GateKind::Rzz(theta.into())
    }

    /// Phase-shift gate.
    pub fn phase_shift(theta: impl Into<ParameterResolver>) -> Self {
        GateKind::PhaseShift(theta.into())
    }

    /// Global-phase gate.
    pub fn global_phase(theta: impl Into<ParameterResolver>) -> Self {
        GateKind::GlobalPhase(theta.into())
    }

    /// Universal three-angle gate.
    pub fn u3(
        theta: impl Into<ParameterResolver>,
        phi: impl Into<ParameterResolver>,
        lambda: impl Into<ParameterResolver>,
    ) -> Self {
        GateKind::U3(theta.into(), phi.into(), lambda.into())
    }

    /// Fermionic simulation gate.
    pub fn fsim(
        theta: impl Into<ParameterResolver>,
        phi: impl Into<ParameterResolver>,
    ) -> Self {
        GateKind::FSim(theta.into(), phi.into())
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        match self {
            GateKind::I => "id",
            GateKind::X => "x",
            GateKind::Y => "y",
            GateKind::Z => "z",
            GateKind::H => "h",
            GateKind::S => "s",
            GateKind::Sdg => "sdg",
            GateKind::T => "t",
            GateKind::Tdg => "tdg",
            GateKind::Swap => "swap",
            GateKind::Rx(_) => "rx",
            GateKind::Ry(_) => "ry",
            GateKind::Rz(_) => "rz",
            GateKind::Rxx(_) => "rxx",
            GateKind::Ryy(_) => "ryy",
            GateKind::Rzz(_) => "rzz",
            GateKind::PhaseShift(_) => "phase_shift",
            GateKind::GlobalPhase(_) => "global_phase",
            GateKind::U3(_, _, _) => "u3",
            GateKind::FSim(_, _) => "fsim",
            GateKind::Unitary(g) => &g.name,
            GateKind::Channel(ch) => ch.name(),
        }
    }

    /// Get the number of target qubits this gate operates on.
    pub fn arity(&self) -> u32 {
        match self {
            GateKind::Swap
            | GateKind::Rxx(_)
            | GateKind::Ryy(_)
            | GateKind::Rzz(_)
            | GateKind::FSim(_, _) => 2,
            GateKind::Unitary(g) => g.num_qubits,
            _ => 1,
        }
    }

    /// True for noise channels.
    pub fn is_channel(&self) -> bool {
        matches!(self, GateKind::Channel(_))
    }

    /// Check if this gate carries any unbound symbolic coefficient.
    pub fn is_parameterized(&self) -> bool {
        self.parameters().iter().any(|pr| !pr.is_const())
    }

    /// Get the coefficient resolvers of this gate.
    pub fn parameters(&self) -> Vec<&ParameterResolver> {
        match self {
            GateKind::Rx(p)
            | GateKind::Ry(p)
            | GateKind::Rz(p)
            | GateKind::Rxx(p)
            | GateKind::Ryy(p)
            | GateKind::Rzz(p)
            | GateKind::PhaseShift(p)
            | GateKind::GlobalPhase(p) => vec![p],
            GateKind::U3(a, b, c) => vec![a, b, c],
            GateKind::FSim(a, b) => vec![a, b],
            _ => vec![],
        }
    }

    fn parameters_mut(&mut self) -> Vec<&mut ParameterResolver> {
        match self {
            GateKind::Rx(p)
            | GateKind::Ry(p)
            | GateKind::Rz(p)
            | GateKind::Rxx(p)
            | GateKind::Ryy(p)
            | GateKind::Rzz(p)
            | GateKind::PhaseShift(p)
            | GateKind::GlobalPhase(p) => vec![p],
            GateKind::U3(a, b, c) => vec![a, b, c],
            GateKind::FSim(a, b) => vec![a, b],
            _ => vec![],
        }
    }

    /// Bind this gate to target (and optional control) qubits.
    ///
    /// Fails with `QubitArityMismatch` if the target count does not
    /// match the gate arity, and with `QubitOverlap` if any qubit
    /// repeats among targets and controls.
    pub fn on(
        self,
        targets: impl IntoIterator<Item = impl Into<QubitId>>,
        controls: impl IntoIterator<Item = impl Into<QubitId>>,
    ) -> IrResult<Gate> {
        let targets: Vec<QubitId> = targets.into_iter().map(Into::into).collect();
        let controls: Vec<QubitId> = controls.into_iter().map(Into::into).collect();

        let expected = self.arity();
        let got = u32::try_from(targets.len()).unwrap_or(u32::MAX);
        if got != expected {
            return Err(IrError::QubitArityMismatch {
                gate: self.name().to_string(),
                expected,
                got,
            });
        }

        let mut seen = Vec::with_capacity(targets.len() + controls.len());
        for q in targets.iter().chain(controls.iter()) {
            if seen.contains(q) {
                return Err(IrError::QubitOverlap { qubit: *q });
            }
            seen.push(*q);
        }

        Ok(Gate {
            kind: self,
            targets,
            controls,
        })
    }

    /// Bind without controls.
    pub fn on_targets(
        self,
        targets: impl IntoIterator<Item = impl Into<QubitId>>,
    ) -> IrResult<Gate> {
        self.on(targets, std::iter::empty::<QubitId>())
    }

    /// The adjoint gate kind.
    ///
    /// Self-adjoint kinds map to themselves; the rotation family
    /// negates its angle; multi-parameter kinds follow their own
    /// transform table.
    pub fn hermitian(&self) -> Self {
        match self {
            GateKind::S => GateKind::Sdg,
            GateKind::Sdg => GateKind::S,
            GateKind::T => GateKind::Tdg,
            GateKind::Tdg => GateKind::T,
            GateKind::Rx(p) => GateKind::Rx(p.neg()),
            GateKind::Ry(p) => GateKind::Ry(p.neg()),
            GateKind::Rz(p) => GateKind::Rz(p.neg()),
            GateKind::Rxx(p) => GateKind::Rxx(p.neg()),
            GateKind::Ryy(p) => GateKind::Ryy(p.neg()),
            GateKind::Rzz(p) => GateKind::Rzz(p.neg()),
            GateKind::PhaseShift(p) => GateKind::PhaseShift(p.neg()),
            GateKind::GlobalPhase(p) => GateKind::GlobalPhase(p.neg()),
            // U3(θ, φ, λ)† = U3(-θ, -λ, -φ): φ and λ swap as well as negate.
            GateKind::U3(theta, phi, lambda) => {
                GateKind::U3(theta.neg(), lambda.neg(), phi.neg())
            }
            GateKind::FSim(theta, phi) => GateKind::FSim(theta.neg(), phi.neg()),
            GateKind::Unitary(g) => {
                let dag = matrix::dagger(&matrix::from_row_major(&g.matrix));
                GateKind::Unitary(UnitaryGate {
                    name: g.name.clone(),
                    num_qubits: g.num_qubits,
                    matrix: dag.iter().copied().collect(),
                })
            }
            // Pauli, H, Swap and channels are self-hermitian.
            other => other.clone(),
        }
    }

    /// The target-space matrix given numeric bindings.
    ///
    /// Symbolic coefficients resolve through `bindings`; rotation
    /// angles take the real part of the resolved value. Fails with
    /// `UnboundParameter` if a declared name is missing and with
    /// `NonUnitary` for noise channels.
    pub fn matrix(&self, bindings: &Bindings) -> IrResult<Array2<Complex64>> {
        let angle = |pr: &ParameterResolver| -> IrResult<f64> {
            Ok(pr.substitute(bindings)?.re)
        };
        let m = match self {
            GateKind::I => matrix::identity(2),
            GateKind::X => fixed::x(),
            GateKind::Y => fixed::y(),
            GateKind::Z => fixed::z(),
            GateKind::H => fixed::h(),
            GateKind::S => fixed::phase_diag(std::f64::consts::FRAC_PI_2),
            GateKind::Sdg => fixed::phase_diag(-std::f64::consts::FRAC_PI_2),
            GateKind::T => fixed::phase_diag(std::f64::consts::FRAC_PI_4),
            GateKind::Tdg => fixed::phase_diag(-std::f64::consts::FRAC_PI_4),
            GateKind::Swap => fixed::swap(),
            GateKind::Rx(p) => param::rx(angle(p)?),
            GateKind::Ry(p) => param::ry(angle(p)?),
            GateKind::Rz(p) => param::rz(angle(p)?),
            GateKind::Rxx(p) => param::rxx(angle(p)?),
            GateKind::Ryy(p) => param::ryy(angle(p)?),
            GateKind::Rzz(p) => param::rzz(angle(p)?),
            GateKind::PhaseShift(p) => fixed::phase_diag(angle(p)?),
            GateKind::GlobalPhase(p) => {
                let phase = Complex64::from_polar(1.0, -angle(p)?);
                matrix::identity(2).mapv(|v| v * phase)
            }
            GateKind::U3(t, f, l) => param::u3(angle(t)?, angle(f)?, angle(l)?),
            GateKind::FSim(t, f) => param::fsim(angle(t)?, angle(f)?),
            GateKind::Unitary(g) => matrix::from_row_major(&g.matrix),
            GateKind::Channel(_) => {
                return Err(IrError::NonUnitary {
                    gate: self.name().to_string(),
                });
            }
        };
        Ok(m)
    }

    /// The analytic derivative ∂(matrix)/∂`wrt` at the binding point.
    ///
    /// Uses the per-kind closed form (Pauli rotations differentiate to
    /// `0.5·matrix(θ+π)`, two-qubit couplings to `matrix(θ+π/2)`),
    /// scaled by the coefficient's linear partial with respect to
    /// `wrt`. A gate that does not depend on `wrt` differentiates to
    /// the zero matrix.
    pub fn diff_matrix(&self, bindings: &Bindings, wrt: &str) -> IrResult<Array2<Complex64>> {
        let angle = |pr: &ParameterResolver| -> IrResult<f64> {
            Ok(pr.substitute(bindings)?.re)
        };
        let scaled = |m: Array2<Complex64>, factor: Complex64| m.mapv(|v| v * factor);

        let m = match self {
            GateKind::Rx(p) | GateKind::Ry(p) | GateKind::Rz(p) => {
                let factor = p.partial(wrt) * 0.5;
                let shifted = angle(p)? + std::f64::consts::PI;
                let base = match self {
                    GateKind::Rx(_) => param::rx(shifted),
                    GateKind::Ry(_) => param::ry(shifted),
                    _ => param::rz(shifted),
                };
                scaled(base, factor)
            }
            GateKind::Rxx(p) | GateKind::Ryy(p) | GateKind::Rzz(p) => {
                let factor = p.partial(wrt);
                let shifted = angle(p)? + std::f64::consts::FRAC_PI_2;
                let base = match self {
                    GateKind::Rxx(_) => param::rxx(shifted),
                    GateKind::Ryy(_) => param::ryy(shifted),
                    _ => param::rzz(shifted),
                };
                scaled(base, factor)
            }
            GateKind::PhaseShift(p) => {
                let theta = angle(p)?;
                let mut m = matrix::zeros(2);
                m[(1, 1)] = Complex64::new(0.0, 1.0) * Complex64::from_polar(1.0, theta);
                scaled(m, p.partial(wrt))
            }
            GateKind::GlobalPhase(p) => {
                let theta = angle(p)?;
                let d = Complex64::new(0.0, -1.0) * Complex64::from_polar(1.0, -theta);
                scaled(matrix::identity(2).mapv(|v| v * d), p.partial(wrt))
            }
            GateKind::U3(t, f, l) => {
                let (theta, phi, lambda) = (angle(t)?, angle(f)?, angle(l)?);
                let mut total = matrix::zeros(2);
                total = total + scaled(param::u3_dtheta(theta, phi, lambda), t.partial(wrt));
                total = total + scaled(param::u3_dphi(theta, phi, lambda), f.partial(wrt));
                total = total + scaled(param::u3_dlambda(theta, phi, lambda), l.partial(wrt));
                total
            }
            GateKind::FSim(t, f) => {
                let (theta, phi) = (angle(t)?, angle(f)?);
                let mut total = matrix::zeros(4);
                total = total + scaled(param::fsim_dtheta(theta), t.partial(wrt));
                total = total + scaled(param::fsim_dphi(phi), f.partial(wrt));
                total
            }
            GateKind::Channel(_) => {
                return Err(IrError::NonUnitary {
                    gate: self.name().to_string(),
                });
            }
            // Fixed and matrix gates carry no parameters.
            _ => matrix::zeros(1usize << self.arity()),
        };
        Ok(m)
    }
}

/// Fixed gate matrices.
mod fixed {
    use super::*;

    pub fn x() -> Array2<Complex64> {
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        matrix::from_row_major(&[o, l, l, o])
    }

    pub fn y() -> Array2<Complex64> {
        let o = Complex64::new(0.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        matrix::from_row_major(&[o, -i, i, o])
    }

    pub fn z() -> Array2<Complex64> {
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        matrix::from_row_major(&[l, o, o, -l])
    }

    pub fn h() -> Array2<Complex64> {
        let s = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);
        matrix::from_row_major(&[s, s, s, -s])
    }

    /// diag(1, e^{iφ}): S, Sdg, T, Tdg and the phase-shift gate.
    pub fn phase_diag(phi: f64) -> Array2<Complex64> {
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        matrix::from_row_major(&[l, o, o, Complex64::from_polar(1.0, phi)])
    }

    pub fn swap() -> Array2<Complex64> {
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        matrix::from_row_major(&[
            l, o, o, o, //
            o, o, l, o, //
            o, l, o, o, //
            o, o, o, l,
        ])
    }
}

/// Parameterized gate matrices and their closed-form derivatives.
mod param {
    use super::*;

    pub fn rx(theta: f64) -> Array2<Complex64> {
        let c = Complex64::new((theta / 2.0).cos(), 0.0);
        let s = Complex64::new(0.0, -(theta / 2.0).sin());
        matrix::from_row_major(&[c, s, s, c])
    }

    pub fn ry(theta: f64) -> Array2<Complex64> {
        let c = Complex64::new((theta / 2.0).cos(), 0.0);
        let s = Complex64::new((theta / 2.0).sin(), 0.0);
        matrix::from_row_major(&[c, -s, s, c])
    }

    pub fn rz(theta: f64) -> Array2<Complex64> {
        let o = Complex64::new(0.0, 0.0);
        matrix::from_row_major(&[
            Complex64::from_polar(1.0, -theta / 2.0),
            o,
            o,
            Complex64::from_polar(1.0, theta / 2.0),
        ])
    }

    pub fn rxx(theta: f64) -> Array2<Complex64> {
        let c = Complex64::new(theta.cos(), 0.0);
        let s = Complex64::new(0.0, -theta.sin());
        let o = Complex64::new(0.0, 0.0);
        matrix::from_row_major(&[
            c, o, o, s, //
            o, c, s, o, //
            o, s, c, o, //
            s, o, o, c,
        ])
    }

    pub fn ryy(theta: f64) -> Array2<Complex64> {
        let c = Complex64::new(theta.cos(), 0.0);
        let s = Complex64::new(0.0, -theta.sin());
        let o = Complex64::new(0.0, 0.0);
        matrix::from_row_major(&[
            c, o, o, -s, //
            o, c, s, o, //
            o, s, c, o, //
            -s, o, o, c,
        ])
    }

    pub fn rzz(theta: f64) -> Array2<Complex64> {
        let neg = Complex64::from_polar(1.0, -theta);
        let pos = Complex64::from_polar(1.0, theta);
        let o = Complex64::new(0.0, 0.0);
        matrix::from_row_major(&[
            neg, o, o, o, //
            o, pos, o, o, //
            o, o, pos, o, //
            o, o, o, neg,
        ])
    }

    pub fn u3(theta: f64, phi: f64, lambda: f64) -> Array2<Complex64> {
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        matrix::from_row_major(&[
            Complex64::new(c, 0.0),
            -Complex64::from_polar(s, lambda),
            Complex64::from_polar(s, phi),
            Complex64::from_polar(c, phi + lambda),
        ])
    }

    pub fn u3_dtheta(theta: f64, phi: f64, lambda: f64) -> Array2<Complex64> {
        let c = 0.5 * (theta / 2.0).cos();
        let s = 0.5 * (theta / 2.0).sin();
        matrix::from_row_major(&[
            Complex64::new(-s, 0.0),
            -Complex64::from_polar(c, lambda),
            Complex64::from_polar(c, phi),
            -Complex64::from_polar(s, phi + lambda),
        ])
    }

    pub fn u3_dphi(theta: f64, phi: f64, lambda: f64) -> Array2<Complex64> {
        let i = Complex64::new(0.0, 1.0);
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        let o = Complex64::new(0.0, 0.0);
        matrix::from_row_major(&[
            o,
            o,
            i * Complex64::from_polar(s, phi),
            i * Complex64::from_polar(c, phi + lambda),
        ])
    }

    pub fn u3_dlambda(theta: f64, phi: f64, lambda: f64) -> Array2<Complex64> {
        let i = Complex64::new(0.0, 1.0);
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        let o = Complex64::new(0.0, 0.0);
        matrix::from_row_major(&[
            o,
            -i * Complex64::from_polar(s, lambda),
            o,
            i * Complex64::from_polar(c, phi + lambda),
        ])
    }

    pub fn fsim(theta: f64, phi: f64) -> Array2<Complex64> {
        let c = Complex64::new(theta.cos(), 0.0);
        let s = Complex64::new(0.0, -theta.sin());
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        matrix::from_row_major(&[
            l, o, o, o, //
            o, c, s, o, //
            o, s, c, o, //
            o, o, o, Complex64::from_polar(1.0, phi),
        ])
    }

    pub fn fsim_dtheta(theta: f64) -> Array2<Complex64> {
        let c = Complex64::new(0.0, -theta.cos());
        let s = Complex64::new(-theta.sin(), 0.0);
        let o = Complex64::new(0.0, 0.0);
        matrix::from_row_major(&[
            o, o, o, o, //
            o, s, c, o, //
            o, c, s, o, //
            o, o, o, o,
        ])
    }

    pub fn fsim_dphi(phi: f64) -> Array2<Complex64> {
        let mut m = matrix::zeros(4);
        m[(3, 3)] = Complex64::new(0.0, 1.0) * Complex64::from_polar(1.0, phi);
        m
    }
}

/// A gate bound to target and control qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Target qubits (length equals the kind's arity).
    pub targets: Vec<QubitId>,
    /// Control qubits (disjoint from targets).
    pub controls: Vec<QubitId>,
}

impl Gate {
    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// The highest qubit index this gate touches.
    pub fn max_qubit(&self) -> u32 {
        self.targets
            .iter()
            .chain(self.controls.iter())
            .map(|q| q.0)
            .max()
            .unwrap_or(0)
    }

    /// Check if this gate carries any unbound symbolic coefficient.
    pub fn is_parameterized(&self) -> bool {
        self.kind.is_parameterized()
    }

    /// The coefficient resolvers of this gate.
    pub fn parameters(&self) -> Vec<&ParameterResolver> {
        self.kind.parameters()
    }

    /// The target-space matrix. See [`GateKind::matrix`].
    pub fn matrix(&self, bindings: &Bindings) -> IrResult<Array2<Complex64>> {
        self.kind.matrix(bindings)
    }

    /// The analytic parameter derivative. See [`GateKind::diff_matrix`].
    pub fn diff_matrix(&self, bindings: &Bindings, wrt: &str) -> IrResult<Array2<Complex64>> {
        self.kind.diff_matrix(bindings, wrt)
    }

    /// The adjoint gate on the same qubits.
    pub fn hermitian(&self) -> Self {
        Self {
            kind: self.kind.hermitian(),
            targets: self.targets.clone(),
            controls: self.controls.clone(),
        }
    }

    /// Substitute bound names in the coefficients, leaving the rest
    /// symbolic. Returns a new gate.
    pub fn apply_value(&self, bindings: &Bindings) -> Self {
        let mut kind = self.kind.clone();
        for pr in kind.parameters_mut() {
            *pr = pr.partial_substitute(bindings);
        }
        Self {
            kind,
            targets: self.targets.clone(),
            controls: self.controls.clone(),
        }
    }

    /// Mark every coefficient name as grad-trainable.
    pub fn requires_grad(&mut self) {
        for pr in self.kind.parameters_mut() {
            pr.requires_grad();
        }
    }

    /// Freeze every coefficient name out of gradient computation.
    pub fn no_grad(&mut self) {
        for pr in self.kind.parameters_mut() {
            pr.no_grad();
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.kind.parameters();
        if params.is_empty() {
            write!(f, "{}", self.name())?;
        } else {
            let rendered: Vec<String> = params.iter().map(|p| p.to_string()).collect();
            write!(f, "{}({})", self.name(), rendered.join(", "))?;
        }
        let targets: Vec<String> = self.targets.iter().map(ToString::to_string).collect();
        write!(f, " {}", targets.join(" "))?;
        if !self.controls.is_empty() {
            let controls: Vec<String> = self.controls.iter().map(ToString::to_string).collect();
            write!(f, " ctrl[{}]", controls.join(" "))?;
        }
        Ok(())
    }
}
