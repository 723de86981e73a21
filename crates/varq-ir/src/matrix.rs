//! Dense complex matrix kernels.
//!
//! Small helpers shared by gate matrices, circuit realization and the
//! decomposition tests: identity/kron/dagger, tolerance comparison
//! (with and without global phase), and embedding of a controlled
//! k-qubit gate into the full 2^n space.
//!
//! Qubit indexing is little-endian throughout: qubit 0 is the least
//! significant bit of a basis-state index.

use ndarray::Array2;
use num_complex::Complex64;

use crate::qubit::QubitId;

/// Tolerance for floating point comparisons.
pub const EPSILON: f64 = 1e-10;

/// The n×n zero matrix.
pub fn zeros(dim: usize) -> Array2<Complex64> {
    Array2::from_elem((dim, dim), Complex64::new(0.0, 0.0))
}

/// The n×n identity matrix.
pub fn identity(dim: usize) -> Array2<Complex64> {
    let mut m = zeros(dim);
    for i in 0..dim {
        m[(i, i)] = Complex64::new(1.0, 0.0);
    }
    m
}

/// Build a matrix from a row-major element slice.
///
/// # Panics
///
/// Panics if `elems.len()` is not a perfect square.
pub fn from_row_major(elems: &[Complex64]) -> Array2<Complex64> {
    let dim = (elems.len() as f64).sqrt() as usize;
    assert_eq!(dim * dim, elems.len(), "element count is not a square");
    Array2::from_shape_vec((dim, dim), elems.to_vec()).expect("shape checked above")
}

/// Kronecker product `a ⊗ b`.
pub fn kron(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (ra, ca) = a.dim();
    let (rb, cb) = b.dim();
    let mut out = zeros(ra * rb);
    for i in 0..ra {
        for j in 0..ca {
            for k in 0..rb {
                for l in 0..cb {
                    out[(i * rb + k, j * cb + l)] = a[(i, j)] * b[(k, l)];
                }
            }
        }
    }
    out
}

/// Conjugate transpose.
pub fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|v| v.conj())
}

/// Elementwise comparison within a tolerance.
pub fn approx_eq(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) -> bool {
    a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() <= tol)
}

/// Comparison up to a global phase factor.
///
/// Finds the first element of `b` above tolerance, takes the ratio of
/// the matching elements as the candidate phase, and compares the rest.
pub fn approx_eq_up_to_phase(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) -> bool {
    if a.dim() != b.dim() {
        return false;
    }
    let Some((idx, pivot)) = b.indexed_iter().find(|(_, v)| v.norm() > tol) else {
        // b is numerically zero; equal iff a is too.
        return a.iter().all(|x| x.norm() <= tol);
    };
    let phase = a[idx] / pivot;
    if (phase.norm() - 1.0).abs() > tol {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (x - y * phase).norm() <= tol)
}

/// Embed a k-qubit gate matrix acting on `targets`, conditioned on
/// `controls`, into the full 2^n space.
///
/// The gate-local index is formed with `targets[0]` as its least
/// significant bit. Basis states whose control bits are not all 1 pass
/// through unchanged.
pub fn embed(
    gate: &Array2<Complex64>,
    targets: &[QubitId],
    controls: &[QubitId],
    n_qubits: u32,
) -> Array2<Complex64> {
    let dim = 1usize << n_qubits;
    let mut out = zeros(dim);

    for col in 0..dim {
        if !controls.iter().all(|q| (col >> q.0) & 1 == 1) {
            out[(col, col)] = Complex64::new(1.0, 0.0);
            continue;
        }
        let mut local = 0usize;
        for (k, q) in targets.iter().enumerate() {
            local |= ((col >> q.0) & 1) << k;
        }
        for row_local in 0..gate.dim().0 {
            let amp = gate[(row_local, local)];
            if amp == Complex64::new(0.0, 0.0) {
                continue;
            }
            let mut row = col;
            for (k, q) in targets.iter().enumerate() {
                let bit = (row_local >> k) & 1;
                row = (row & !(1usize << q.0)) | (bit << q.0);
            }
            out[(row, col)] += amp;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x2() -> Array2<Complex64> {
        from_row_major(&[
            Complex64::new(0.0, 0.0),
            Complex64::new(1.0, 0.0),
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
        ])
    }

    #[test]
    fn test_identity_kron() {
        let id2 = identity(2);
        let id4 = kron(&id2, &id2);
        assert!(approx_eq(&id4, &identity(4), EPSILON));
    }

    #[test]
    fn test_dagger_involution() {
        let m = from_row_major(&[
            Complex64::new(1.0, 2.0),
            Complex64::new(0.0, -1.0),
            Complex64::new(3.0, 0.0),
            Complex64::new(0.5, 0.5),
        ]);
        assert!(approx_eq(&dagger(&dagger(&m)), &m, EPSILON));
    }

    #[test]
    fn test_embed_uncontrolled_x() {
        // X on qubit 0 of 2 swaps |00⟩↔|01⟩ and |10⟩↔|11⟩.
        let m = embed(&x2(), &[QubitId(0)], &[], 2);
        assert_eq!(m[(1, 0)], Complex64::new(1.0, 0.0));
        assert_eq!(m[(0, 1)], Complex64::new(1.0, 0.0));
        assert_eq!(m[(3, 2)], Complex64::new(1.0, 0.0));
        assert_eq!(m[(0, 0)], Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_embed_controlled_x_is_cnot() {
        // X on qubit 1 controlled by qubit 0: |01⟩↔|11⟩ only.
        let m = embed(&x2(), &[QubitId(1)], &[QubitId(0)], 2);
        assert_eq!(m[(0, 0)], Complex64::new(1.0, 0.0));
        assert_eq!(m[(2, 2)], Complex64::new(1.0, 0.0));
        assert_eq!(m[(3, 1)], Complex64::new(1.0, 0.0));
        assert_eq!(m[(1, 3)], Complex64::new(1.0, 0.0));
        assert_eq!(m[(1, 1)], Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_phase_comparison() {
        let id = identity(2);
        let phased = id.mapv(|v| v * Complex64::from_polar(1.0, 0.7));
        assert!(!approx_eq(&id, &phased, 1e-6));
        assert!(approx_eq_up_to_phase(&id, &phased, 1e-6));
    }
}
