//! Varq Gate Decomposition
//!
//! Rewrites controlled and two-qubit coupling gates into circuits of
//! elementary gates (Pauli, H, S, T, CX, rotations), preserving the
//! exact unitary. Each rule is a standalone function; callers pick the
//! rules their target supports.
//!
//! # Example
//!
//! ```rust
//! use varq_compile::crz_decompose;
//! use varq_ir::GateKind;
//!
//! let crz = GateKind::rz("theta").on([1u32], [0u32]).unwrap();
//! let circuits = crz_decompose(&crz).unwrap();
//! assert_eq!(circuits[0].len(), 4);
//! ```

pub mod error;
pub mod rules;

pub use error::{DecomposeError, DecomposeResult};
pub use rules::{
    ccx_decompose, ch_decompose, cphase_decompose, crx_decompose, cry_decompose, crz_decompose,
    cs_decompose, ct_decompose, swap_decompose, xx_decompose, yy_decompose, zz_decompose,
};
