//! Controlled-gate decomposition rules.
//!
//! Each rule is a pure function from a bound gate to one or more
//! equivalent circuits over elementary gates (Pauli, H, S, T, CX,
//! single-qubit rotations, phase shift). Every produced circuit has
//! exactly the unitary of the input gate, global phase included.
//!
//! Rules validate the gate kind and control count up front and never
//! partially apply.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use tracing::debug;
use varq_ir::{Circuit, Gate, GateKind, ParameterResolver, QubitId};

use crate::error::{DecomposeError, DecomposeResult};

fn expect_controls(gate: &Gate, expected: usize, rule: &'static str) -> DecomposeResult<()> {
    if gate.controls.len() != expected {
        return Err(DecomposeError::WrongControlCount {
            rule,
            expected,
            got: gate.controls.len(),
        });
    }
    Ok(())
}

fn unsupported(gate: &Gate, rule: &'static str) -> DecomposeError {
    DecomposeError::UnsupportedGate {
        gate: gate.name().to_string(),
        rule,
    }
}

// Rule outputs only rearrange qubits already validated on the input
// gate, so gates are assembled directly.
fn g1(kind: GateKind, target: QubitId) -> Gate {
    Gate {
        kind,
        targets: vec![target],
        controls: vec![],
    }
}

fn cx(control: QubitId, target: QubitId) -> Gate {
    Gate {
        kind: GateKind::X,
        targets: vec![target],
        controls: vec![control],
    }
}

/// Controlled-S.
///
/// Two solutions: a T-gate network and a phase-shift/RZ network.
pub fn cs_decompose(gate: &Gate) -> DecomposeResult<Vec<Circuit>> {
    const RULE: &str = "cs";
    if !matches!(gate.kind, GateKind::S) {
        return Err(unsupported(gate, RULE));
    }
    expect_controls(gate, 1, RULE)?;
    debug!(gate = %gate, rule = RULE, "decomposing");

    let (c, t) = (gate.controls[0], gate.targets[0]);

    let sol1: Circuit = [
        g1(GateKind::T, c),
        g1(GateKind::T, t),
        cx(c, t),
        g1(GateKind::Tdg, t),
        cx(c, t),
    ]
    .into_iter()
    .collect();

    let sol2: Circuit = [
        g1(GateKind::phase_shift(FRAC_PI_4), c),
        g1(GateKind::rz(FRAC_PI_4), t),
        cx(c, t),
        g1(GateKind::rz(-FRAC_PI_4), t),
        cx(c, t),
    ]
    .into_iter()
    .collect();

    Ok(vec![sol1, sol2])
}

/// Controlled-T.
pub fn ct_decompose(gate: &Gate) -> DecomposeResult<Vec<Circuit>> {
    const RULE: &str = "ct";
    if !matches!(gate.kind, GateKind::T) {
        return Err(unsupported(gate, RULE));
    }
    expect_controls(gate, 1, RULE)?;
    debug!(gate = %gate, rule = RULE, "decomposing");

    let (c, t) = (gate.controls[0], gate.targets[0]);
    Ok(vec![controlled_phase(c, t, ParameterResolver::constant(FRAC_PI_4))])
}

/// Controlled phase shift.
pub fn cphase_decompose(gate: &Gate) -> DecomposeResult<Vec<Circuit>> {
    const RULE: &str = "cphase";
    let GateKind::PhaseShift(theta) = &gate.kind else {
        return Err(unsupported(gate, RULE));
    };
    expect_controls(gate, 1, RULE)?;
    debug!(gate = %gate, rule = RULE, "decomposing");

    let (c, t) = (gate.controls[0], gate.targets[0]);
    Ok(vec![controlled_phase(c, t, theta.clone())])
}

/// `diag(1, 1, 1, e^{iθ})` over control `c` and target `t`.
fn controlled_phase(c: QubitId, t: QubitId, theta: ParameterResolver) -> Circuit {
    let half = theta.scale(0.5);
    [
        g1(GateKind::PhaseShift(half.clone()), c),
        g1(GateKind::Rz(half.clone()), t),
        cx(c, t),
        g1(GateKind::Rz(half.neg()), t),
        cx(c, t),
    ]
    .into_iter()
    .collect()
}

/// Controlled-H.
pub fn ch_decompose(gate: &Gate) -> DecomposeResult<Vec<Circuit>> {
    const RULE: &str = "ch";
    if !matches!(gate.kind, GateKind::H) {
        return Err(unsupported(gate, RULE));
    }
    expect_controls(gate, 1, RULE)?;
    debug!(gate = %gate, rule = RULE, "decomposing");

    let (c, t) = (gate.controls[0], gate.targets[0]);
    let circuit: Circuit = [
        g1(GateKind::S, t),
        g1(GateKind::H, t),
        g1(GateKind::T, t),
        cx(c, t),
        g1(GateKind::Tdg, t),
        g1(GateKind::H, t),
        g1(GateKind::Sdg, t),
    ]
    .into_iter()
    .collect();
    Ok(vec![circuit])
}

/// Controlled-Rx.
pub fn crx_decompose(gate: &Gate) -> DecomposeResult<Vec<Circuit>> {
    const RULE: &str = "crx";
    let GateKind::Rx(theta) = &gate.kind else {
        return Err(unsupported(gate, RULE));
    };
    expect_controls(gate, 1, RULE)?;
    debug!(gate = %gate, rule = RULE, "decomposing");

    let (c, t) = (gate.controls[0], gate.targets[0]);
    let half = theta.scale(0.5);
    let circuit: Circuit = [
        g1(GateKind::H, t),
        g1(GateKind::Rz(half.clone()), t),
        cx(c, t),
        g1(GateKind::Rz(half.neg()), t),
        cx(c, t),
        g1(GateKind::H, t),
    ]
    .into_iter()
    .collect();
    Ok(vec![circuit])
}

/// Controlled-Ry.
pub fn cry_decompose(gate: &Gate) -> DecomposeResult<Vec<Circuit>> {
    const RULE: &str = "cry";
    let GateKind::Ry(theta) = &gate.kind else {
        return Err(unsupported(gate, RULE));
    };
    expect_controls(gate, 1, RULE)?;
    debug!(gate = %gate, rule = RULE, "decomposing");

    let (c, t) = (gate.controls[0], gate.targets[0]);
    let half = theta.scale(0.5);
    let circuit: Circuit = [
        g1(GateKind::Ry(half.clone()), t),
        cx(c, t),
        g1(GateKind::Ry(half.neg()), t),
        cx(c, t),
    ]
    .into_iter()
    .collect();
    Ok(vec![circuit])
}

/// Controlled-Rz.
pub fn crz_decompose(gate: &Gate) -> DecomposeResult<Vec<Circuit>> {
    const RULE: &str = "crz";
    let GateKind::Rz(theta) = &gate.kind else {
        return Err(unsupported(gate, RULE));
    };
    expect_controls(gate, 1, RULE)?;
    debug!(gate = %gate, rule = RULE, "decomposing");

    let (c, t) = (gate.controls[0], gate.targets[0]);
    let half = theta.scale(0.5);
    let circuit: Circuit = [
        g1(GateKind::Rz(half.clone()), t),
        cx(c, t),
        g1(GateKind::Rz(half.neg()), t),
        cx(c, t),
    ]
    .into_iter()
    .collect();
    Ok(vec![circuit])
}

/// ZZ coupling over a CX conjugation.
pub fn zz_decompose(gate: &Gate) -> DecomposeResult<Vec<Circuit>> {
    const RULE: &str = "zz";
    let GateKind::Rzz(theta) = &gate.kind else {
        return Err(unsupported(gate, RULE));
    };
    expect_controls(gate, 0, RULE)?;
    debug!(gate = %gate, rule = RULE, "decomposing");

    let (a, b) = (gate.targets[0], gate.targets[1]);
    Ok(vec![zz_core(a, b, theta)])
}

fn zz_core(a: QubitId, b: QubitId, theta: &ParameterResolver) -> Circuit {
    [
        cx(a, b),
        g1(GateKind::Rz(theta.scale(2.0)), b),
        cx(a, b),
    ]
    .into_iter()
    .collect()
}

/// XX coupling: ZZ conjugated by Hadamards.
pub fn xx_decompose(gate: &Gate) -> DecomposeResult<Vec<Circuit>> {
    const RULE: &str = "xx";
    let GateKind::Rxx(theta) = &gate.kind else {
        return Err(unsupported(gate, RULE));
    };
    expect_controls(gate, 0, RULE)?;
    debug!(gate = %gate, rule = RULE, "decomposing");

    let (a, b) = (gate.targets[0], gate.targets[1]);
    let mut circuit = Circuit::new();
    circuit.push(g1(GateKind::H, a));
    circuit.push(g1(GateKind::H, b));
    circuit.extend(zz_core(a, b, theta));
    circuit.push(g1(GateKind::H, a));
    circuit.push(g1(GateKind::H, b));
    Ok(vec![circuit])
}

/// YY coupling: ZZ conjugated by X-rotations.
pub fn yy_decompose(gate: &Gate) -> DecomposeResult<Vec<Circuit>> {
    const RULE: &str = "yy";
    let GateKind::Ryy(theta) = &gate.kind else {
        return Err(unsupported(gate, RULE));
    };
    expect_controls(gate, 0, RULE)?;
    debug!(gate = %gate, rule = RULE, "decomposing");

    let (a, b) = (gate.targets[0], gate.targets[1]);
    let mut circuit = Circuit::new();
    circuit.push(g1(GateKind::rx(FRAC_PI_2), a));
    circuit.push(g1(GateKind::rx(FRAC_PI_2), b));
    circuit.extend(zz_core(a, b, theta));
    circuit.push(g1(GateKind::rx(-FRAC_PI_2), a));
    circuit.push(g1(GateKind::rx(-FRAC_PI_2), b));
    Ok(vec![circuit])
}

/// SWAP as three alternating CX gates.
pub fn swap_decompose(gate: &Gate) -> DecomposeResult<Vec<Circuit>> {
    const RULE: &str = "swap";
    if !matches!(gate.kind, GateKind::Swap) {
        return Err(unsupported(gate, RULE));
    }
    expect_controls(gate, 0, RULE)?;
    debug!(gate = %gate, rule = RULE, "decomposing");

    let (a, b) = (gate.targets[0], gate.targets[1]);
    let circuit: Circuit = [cx(a, b), cx(b, a), cx(a, b)].into_iter().collect();
    Ok(vec![circuit])
}

/// Toffoli over the standard T-gate network.
pub fn ccx_decompose(gate: &Gate) -> DecomposeResult<Vec<Circuit>> {
    const RULE: &str = "ccx";
    if !matches!(gate.kind, GateKind::X) {
        return Err(unsupported(gate, RULE));
    }
    expect_controls(gate, 2, RULE)?;
    debug!(gate = %gate, rule = RULE, "decomposing");

    let (c1, c2, t) = (gate.controls[0], gate.controls[1], gate.targets[0]);
    let circuit: Circuit = [
        g1(GateKind::H, t),
        cx(c2, t),
        g1(GateKind::Tdg, t),
        cx(c1, t),
        g1(GateKind::T, t),
        cx(c2, t),
        g1(GateKind::Tdg, t),
        cx(c1, t),
        g1(GateKind::T, t),
        g1(GateKind::T, c2),
        g1(GateKind::H, t),
        cx(c1, c2),
        g1(GateKind::T, c1),
        g1(GateKind::Tdg, c2),
        cx(c1, c2),
    ]
    .into_iter()
    .collect();
    Ok(vec![circuit])
}
