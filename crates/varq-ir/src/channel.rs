//! Noise channel types.
//!
//! Channels are not unitary: they act on a density matrix through a
//! set of Kraus operators, each tagged with its occurrence
//! probability. The residual probability (doing nothing) is always the
//! identity branch. All channels here are single-qubit and
//! self-hermitian.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::matrix;

/// A single-qubit noise channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum NoiseChannel {
    /// Pauli channel: applies X, Y or Z with probabilities `px`, `py`,
    /// `pz`, identity with the remainder.
    Pauli {
        /// Probability of applying X.
        px: f64,
        /// Probability of applying Y.
        py: f64,
        /// Probability of applying Z.
        pz: f64,
    },

    /// Bit-flip channel: applies X with probability `p`.
    BitFlip {
        /// Flip probability.
        p: f64,
    },

    /// Phase-flip channel: applies Z with probability `p`.
    PhaseFlip {
        /// Flip probability.
        p: f64,
    },

    /// Bit-phase-flip channel: applies Y with probability `p`.
    BitPhaseFlip {
        /// Flip probability.
        p: f64,
    },

    /// Depolarizing channel: applies each of X, Y, Z with probability
    /// `p`/3.
    Depolarizing {
        /// Error probability.
        p: f64,
    },

    /// Amplitude damping: energy relaxation with damping `gamma`.
    AmplitudeDamping {
        /// Damping parameter.
        gamma: f64,
    },

    /// Phase damping: dephasing without energy loss.
    PhaseDamping {
        /// Dephasing parameter.
        gamma: f64,
    },
}

fn check_probability(channel: &str, p: f64) -> IrResult<()> {
    if !(0.0..=1.0).contains(&p) || !p.is_finite() {
        return Err(IrError::InvalidProbability {
            channel: channel.to_string(),
            value: p,
        });
    }
    Ok(())
}

impl NoiseChannel {
    /// Create a Pauli channel.
    ///
    /// Each probability must lie in [0, 1] and their sum must not
    /// exceed 1.
    pub fn pauli(px: f64, py: f64, pz: f64) -> IrResult<Self> {
        check_probability("pauli", px)?;
        check_probability("pauli", py)?;
        check_probability("pauli", pz)?;
        let total = px + py + pz;
        if total > 1.0 {
            return Err(IrError::InvalidProbability {
                channel: "pauli".to_string(),
                value: total,
            });
        }
        Ok(NoiseChannel::Pauli { px, py, pz })
    }

    /// Create a bit-flip channel.
    pub fn bit_flip(p: f64) -> IrResult<Self> {
        check_probability("bit_flip", p)?;
        Ok(NoiseChannel::BitFlip { p })
    }

    /// Create a phase-flip channel.
    pub fn phase_flip(p: f64) -> IrResult<Self> {
        check_probability("phase_flip", p)?;
        Ok(NoiseChannel::PhaseFlip { p })
    }

    /// Create a bit-phase-flip channel.
    pub fn bit_phase_flip(p: f64) -> IrResult<Self> {
        check_probability("bit_phase_flip", p)?;
        Ok(NoiseChannel::BitPhaseFlip { p })
    }

    /// Create a depolarizing channel.
    pub fn depolarizing(p: f64) -> IrResult<Self> {
        check_probability("depolarizing", p)?;
        Ok(NoiseChannel::Depolarizing { p })
    }

    /// Create an amplitude-damping channel.
    pub fn amplitude_damping(gamma: f64) -> IrResult<Self> {
        check_probability("amplitude_damping", gamma)?;
        Ok(NoiseChannel::AmplitudeDamping { gamma })
    }

    /// Create a phase-damping channel.
    pub fn phase_damping(gamma: f64) -> IrResult<Self> {
        check_probability("phase_damping", gamma)?;
        Ok(NoiseChannel::PhaseDamping { gamma })
    }

    /// Get a short name for this channel.
    pub fn name(&self) -> &'static str {
        match self {
            NoiseChannel::Pauli { .. } => "pauli_channel",
            NoiseChannel::BitFlip { .. } => "bit_flip",
            NoiseChannel::PhaseFlip { .. } => "phase_flip",
            NoiseChannel::BitPhaseFlip { .. } => "bit_phase_flip",
            NoiseChannel::Depolarizing { .. } => "depolarizing",
            NoiseChannel::AmplitudeDamping { .. } => "amplitude_damping",
            NoiseChannel::PhaseDamping { .. } => "phase_damping",
        }
    }

    /// The Kraus operators of this channel, each tagged with its
    /// occurrence probability. Branches whose operator vanishes are
    /// omitted.
    pub fn kraus_operators(&self) -> Vec<(f64, Array2<Complex64>)> {
        let i = Complex64::new(0.0, 1.0);
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);

        let pauli_branches = |px: f64, py: f64, pz: f64| {
            let x = matrix::from_row_major(&[zero, one, one, zero]);
            let y = matrix::from_row_major(&[zero, -i, i, zero]);
            let z = matrix::from_row_major(&[one, zero, zero, -one]);
            let mut branches = vec![(1.0 - px - py - pz, matrix::identity(2))];
            branches.push((px, x));
            branches.push((py, y));
            branches.push((pz, z));
            branches
        };

        let branches = match *self {
            NoiseChannel::Pauli { px, py, pz } => pauli_branches(px, py, pz),
            NoiseChannel::BitFlip { p } => pauli_branches(p, 0.0, 0.0),
            NoiseChannel::PhaseFlip { p } => pauli_branches(0.0, 0.0, p),
            NoiseChannel::BitPhaseFlip { p } => pauli_branches(0.0, p, 0.0),
            NoiseChannel::Depolarizing { p } => pauli_branches(p / 3.0, p / 3.0, p / 3.0),
            NoiseChannel::AmplitudeDamping { gamma } => {
                let k0 = matrix::from_row_major(&[
                    one,
                    zero,
                    zero,
                    Complex64::new((1.0 - gamma).sqrt(), 0.0),
                ]);
                let k1 = matrix::from_row_major(&[
                    zero,
                    Complex64::new(gamma.sqrt(), 0.0),
                    zero,
                    zero,
                ]);
                // K0 stays nonzero at gamma = 1 even though its tag is
                // zero, so filter on the operator rather than the tag.
                return vec![(1.0 - gamma, k0), (gamma, k1)]
                    .into_iter()
                    .filter(|(_, k)| k.iter().any(|v| v.norm() > 0.0))
                    .collect();
            }
            NoiseChannel::PhaseDamping { gamma } => {
                let k0 = matrix::from_row_major(&[
                    one,
                    zero,
                    zero,
                    Complex64::new((1.0 - gamma).sqrt(), 0.0),
                ]);
                let k1 = matrix::from_row_major(&[
                    zero,
                    zero,
                    zero,
                    Complex64::new(gamma.sqrt(), 0.0),
                ]);
                return vec![(1.0 - gamma, k0), (gamma, k1)]
                    .into_iter()
                    .filter(|(_, k)| k.iter().any(|v| v.norm() > 0.0))
                    .collect();
            }
        };

        branches
            .into_iter()
            .filter(|(p, _)| *p > 0.0)
            .map(|(p, m)| {
                let scale = Complex64::new(p.sqrt(), 0.0);
                (p, m.mapv(|v| v * scale))
            })
            .collect()
    }
}

impl std::fmt::Display for NoiseChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoiseChannel::Pauli { px, py, pz } => {
                write!(f, "pauli_channel(px={px:.4}, py={py:.4}, pz={pz:.4})")
            }
            NoiseChannel::BitFlip { p } => write!(f, "bit_flip(p={p:.4})"),
            NoiseChannel::PhaseFlip { p } => write!(f, "phase_flip(p={p:.4})"),
            NoiseChannel::BitPhaseFlip { p } => write!(f, "bit_phase_flip(p={p:.4})"),
            NoiseChannel::Depolarizing { p } => write!(f, "depolarizing(p={p:.4})"),
            NoiseChannel::AmplitudeDamping { gamma } => {
                write!(f, "amplitude_damping(γ={gamma:.4})")
            }
            NoiseChannel::PhaseDamping { gamma } => write!(f, "phase_damping(γ={gamma:.4})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{EPSILON, approx_eq, dagger, identity};

    #[test]
    fn test_probability_validation() {
        assert!(NoiseChannel::bit_flip(0.02).is_ok());
        assert!(matches!(
            NoiseChannel::bit_flip(1.5),
            Err(IrError::InvalidProbability { .. })
        ));
        assert!(matches!(
            NoiseChannel::bit_flip(-0.1),
            Err(IrError::InvalidProbability { .. })
        ));
        // Individually fine, sum above 1.
        assert!(matches!(
            NoiseChannel::pauli(0.5, 0.4, 0.3),
            Err(IrError::InvalidProbability { .. })
        ));
        assert!(NoiseChannel::pauli(0.8, 0.1, 0.1).is_ok());
    }

    #[test]
    fn test_kraus_completeness() {
        // Σ K†K = I for every channel.
        let channels = [
            NoiseChannel::pauli(0.1, 0.2, 0.3).unwrap(),
            NoiseChannel::bit_flip(0.02).unwrap(),
            NoiseChannel::phase_flip(0.3).unwrap(),
            NoiseChannel::bit_phase_flip(0.25).unwrap(),
            NoiseChannel::depolarizing(0.6).unwrap(),
            NoiseChannel::amplitude_damping(0.4).unwrap(),
            NoiseChannel::phase_damping(0.7).unwrap(),
            // Boundary damping: at gamma = 1 only K0's tag vanishes,
            // not K0 itself.
            NoiseChannel::amplitude_damping(0.0).unwrap(),
            NoiseChannel::amplitude_damping(1.0).unwrap(),
            NoiseChannel::phase_damping(0.0).unwrap(),
            NoiseChannel::phase_damping(1.0).unwrap(),
        ];
        for ch in channels {
            let mut total = crate::matrix::zeros(2);
            for (_, k) in ch.kraus_operators() {
                total = total + dagger(&k).dot(&k);
            }
            assert!(approx_eq(&total, &identity(2), EPSILON), "{ch}");
        }
    }

    #[test]
    fn test_branch_probabilities() {
        let ch = NoiseChannel::bit_flip(0.02).unwrap();
        let kraus = ch.kraus_operators();
        assert_eq!(kraus.len(), 2);
        assert!((kraus[0].0 - 0.98).abs() < EPSILON);
        assert!((kraus[1].0 - 0.02).abs() < EPSILON);
    }

    #[test]
    fn test_display() {
        let ch = NoiseChannel::depolarizing(0.03).unwrap();
        assert_eq!(format!("{ch}"), "depolarizing(p=0.0300)");
    }
}
