//! Varq Circuit Intermediate Representation
//!
//! This crate provides the core data structures for representing
//! variational quantum circuits in Varq: symbolic coefficients, gates,
//! noise channels, and the circuit itself.
//!
//! # Overview
//!
//! A circuit is an ordered sequence of gates; qubit 0 is the least
//! significant bit of a basis index. Gate coefficients are
//! [`ParameterResolver`] values, linear forms `const + Σ cᵢ·nameᵢ`
//! over named symbols, so a circuit stays symbolic until numeric
//! bindings are supplied.
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] for addressing qubits
//! - **Parameters**: [`ParameterResolver`] for symbolic coefficients,
//!   [`Bindings`] for numeric values
//! - **Gates**: [`GateKind`] for the gate table, [`Gate`] for a kind
//!   bound to qubits via [`GateKind::on`]
//! - **Noise**: [`NoiseChannel`] with Kraus decompositions
//! - **Circuit**: [`Circuit`] gate sequence with matrix, adjoint, and
//!   gradient plumbing
//! - **Backend**: [`Backend`] execution boundary
//!
//! # Example: Parameterized Bell Pair
//!
//! ```rust
//! use varq_ir::{Circuit, GateKind, bindings};
//!
//! let mut circuit = Circuit::new();
//! circuit.push(GateKind::ry("theta").on_targets([0u32]).unwrap());
//! circuit.push(GateKind::X.on([1u32], [0u32]).unwrap());
//!
//! assert_eq!(circuit.n_qubits(), 2);
//! assert!(circuit.is_parameterized());
//!
//! let m = circuit.matrix(&bindings([("theta", 0.5)])).unwrap();
//! assert_eq!(m.dim(), (4, 4));
//! ```

pub mod backend;
pub mod channel;
pub mod circuit;
pub mod error;
pub mod gate;
pub mod matrix;
pub mod parameter;
pub mod qubit;

pub use backend::{Backend, Counts};
pub use channel::NoiseChannel;
pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{Gate, GateKind, UnitaryGate};
pub use parameter::{Bindings, ParameterResolver, bindings};
pub use qubit::QubitId;
