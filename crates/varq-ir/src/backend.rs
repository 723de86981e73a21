//! Execution backend boundary.
//!
//! A backend consumes a circuit plus numeric bindings and produces
//! states, samples, or gradients. Calls block until the result is
//! available; queueing and transport are the implementor's concern.

use num_complex::Complex64;

use crate::circuit::Circuit;
use crate::error::IrResult;
use crate::parameter::Bindings;

/// Measurement counts keyed by bitstring with qubit 0 first, e.g.
/// `"01"` for qubit 1 set and qubit 0 clear.
pub type Counts = rustc_hash::FxHashMap<String, u64>;

/// A circuit execution target.
pub trait Backend {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Largest circuit width this backend accepts.
    fn max_qubits(&self) -> u32;

    /// Evolve `|0...0>` through the circuit and return the final state
    /// vector, indexed little-endian.
    fn run_state(&self, circuit: &Circuit, bindings: &Bindings) -> IrResult<Vec<Complex64>>;

    /// Sample measurement outcomes in the computational basis.
    fn sample(&self, circuit: &Circuit, bindings: &Bindings, shots: u64) -> IrResult<Counts>;

    /// Gradient of the expectation value with respect to each
    /// grad-trainable coefficient name, in declaration order.
    fn gradient(
        &self,
        circuit: &Circuit,
        bindings: &Bindings,
        wrt: &[String],
    ) -> IrResult<Vec<Complex64>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateKind;
    use crate::parameter::bindings;

    /// Matrix-based reference backend for tests.
    struct DenseBackend;

    impl Backend for DenseBackend {
        fn name(&self) -> &str {
            "dense"
        }

        fn max_qubits(&self) -> u32 {
            16
        }

        fn run_state(&self, circuit: &Circuit, bindings: &Bindings) -> IrResult<Vec<Complex64>> {
            let m = circuit.matrix(bindings)?;
            Ok(m.column(0).to_vec())
        }

        fn sample(&self, circuit: &Circuit, bindings: &Bindings, shots: u64) -> IrResult<Counts> {
            // Deterministic argmax sampling, good enough for tests.
            let state = self.run_state(circuit, bindings)?;
            let n = circuit.n_qubits();
            let best = state
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.norm_sqr().total_cmp(&b.norm_sqr()))
                .map(|(i, _)| i)
                .unwrap_or(0);
            let bits: String = (0..n).map(|q| if best >> q & 1 == 1 { '1' } else { '0' }).collect();
            let mut counts = Counts::default();
            counts.insert(bits, shots);
            Ok(counts)
        }

        fn gradient(
            &self,
            circuit: &Circuit,
            bindings: &Bindings,
            wrt: &[String],
        ) -> IrResult<Vec<Complex64>> {
            let _ = (circuit, bindings);
            Ok(vec![Complex64::new(0.0, 0.0); wrt.len()])
        }
    }

    #[test]
    fn test_dense_backend_state() {
        let mut c = Circuit::new();
        c.push(GateKind::rx("a").on_targets([0u32]).unwrap());
        let backend = DenseBackend;
        let state = backend.run_state(&c, &bindings([("a", 0.3)])).unwrap();
        assert_eq!(state.len(), 2);
        assert!((state[0].re - (0.15f64).cos()).abs() < 1e-10);
        assert!((state[1].im + (0.15f64).sin()).abs() < 1e-10);
    }

    #[test]
    fn test_dense_backend_sample() {
        let mut c = Circuit::new();
        c.push(GateKind::X.on_targets([1u32]).unwrap());
        let backend = DenseBackend;
        let counts = backend.sample(&c, &Bindings::default(), 100).unwrap();
        assert_eq!(counts.get("01"), Some(&100));
    }
}
