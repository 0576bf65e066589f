use crate::core::errors::ChannelError;
use crate::core::utils;
use ndarray::{array, Array2};
use num_complex::Complex64;

/// A quantum channel in Kraus-operator form.
///
/// Channels model the noise a qubit picks up in transit: the state evolves as
/// $\rho \to \sum_k K_k \rho K_k^\dagger$.
#[derive(Clone, Debug)]
pub struct QuantumChannel {
    pub kraus_ops: Vec<Array2<Complex64>>,
    pub num_qubits: usize,
}

/// The single-qubit Pauli matrices, scaled by a real weight.
fn weighted_pauli(pauli: char, weight: f64) -> Array2<Complex64> {
    let w = Complex64::new(weight, 0.0);
    let zero = Complex64::new(0.0, 0.0);
    match pauli {
        'I' => array![[w, zero], [zero, w]],
        'X' => array![[zero, w], [w, zero]],
        'Y' => array![[zero, -w * Complex64::i()], [w * Complex64::i(), zero]],
        'Z' => array![[w, zero], [zero, -w]],
        _ => unreachable!("unknown Pauli label"),
    }
}

impl QuantumChannel {
    pub fn new(kraus_ops: Vec<Array2<Complex64>>) -> Result<Self, ChannelError> {
        if kraus_ops.is_empty() {
            return Err(ChannelError::Empty);
        }

        let (rows, cols) = kraus_ops[0].dim();

        if rows != cols || !rows.is_power_of_two() {
            return Err(ChannelError::InvalidDimensions);
        }

        // log_2
        let num_qubits = rows.trailing_zeros() as usize;

        for op in &kraus_ops {
            if op.dim() != (rows, cols) {
                return Err(ChannelError::OperatorSizeMismatch);
            }
        }

        if !utils::check_completeness(&kraus_ops, rows) {
            return Err(ChannelError::NotComplete);
        }

        Ok(Self {
            kraus_ops,
            num_qubits,
        })
    }

    /// Builds a channel from a Pauli mixture: each `(label, probability)`
    /// pair contributes the Kraus operator $\sqrt{p} \cdot P$.
    fn from_pauli_mixture(mixture: &[(char, f64)]) -> Result<QuantumChannel, ChannelError> {
        let ops = mixture
            .iter()
            .filter(|(_, p)| *p > 0.0)
            .map(|&(pauli, p)| weighted_pauli(pauli, p.sqrt()))
            .collect();
        QuantumChannel::new(ops)
    }

    /// Composes the current QuantumChannel with another one (`other` after `self`).
    pub fn compose(&self, other: &QuantumChannel) -> Result<QuantumChannel, ChannelError> {
        if self.num_qubits != other.num_qubits {
            return Err(ChannelError::OperatorSizeMismatch);
        }

        let new_ops: Vec<_> = other
            .kraus_ops
            .iter()
            .flat_map(|op_b| self.kraus_ops.iter().map(move |op_a| op_b.dot(op_a)))
            .collect();

        Ok(QuantumChannel {
            kraus_ops: new_ops,
            num_qubits: self.num_qubits,
        })
    }

    /// Expands the Kraus operators to a larger system.
    pub fn get_expanded_operators(
        &self,
        num_total_qubits: usize,
        targets: &[usize],
    ) -> Result<Vec<Array2<Complex64>>, ChannelError> {
        if targets.len() != self.num_qubits {
            return Err(ChannelError::InvalidDimensions);
        }

        let mut expanded_ops = Vec::with_capacity(self.kraus_ops.len());

        for op in &self.kraus_ops {
            let full_op = utils::expand_operator(num_total_qubits, op, targets, &[]);
            expanded_ops.push(full_op);
        }

        Ok(expanded_ops)
    }

    /// Identity channel (noise-free transmission).
    pub fn identity() -> QuantumChannel {
        QuantumChannel::from_pauli_mixture(&[('I', 1.0)]).expect("identity channel is valid")
    }

    /// Bit Flip Channel -> X with probability p
    pub fn bit_flip(p: f64) -> Result<QuantumChannel, ChannelError> {
        validate_prob(p)?;
        QuantumChannel::from_pauli_mixture(&[('I', 1.0 - p), ('X', p)])
    }

    /// Phase Flip Channel -> Z with probability p
    pub fn phase_flip(p: f64) -> Result<QuantumChannel, ChannelError> {
        validate_prob(p)?;
        QuantumChannel::from_pauli_mixture(&[('I', 1.0 - p), ('Z', p)])
    }

    /// Depolarizing Channel
    ///
    /// The state is replaced by the maximally mixed state with probability p,
    /// i.e. each of X, Y, Z is applied with probability p/4.
    pub fn depolarizing(p: f64) -> Result<QuantumChannel, ChannelError> {
        validate_prob(p)?;
        QuantumChannel::from_pauli_mixture(&[
            ('I', 1.0 - 0.75 * p),
            ('X', p / 4.0),
            ('Y', p / 4.0),
            ('Z', p / 4.0),
        ])
    }

    /// Amplitude Damping -> T1 relaxation
    pub fn amplitude_damping(gamma: f64) -> Result<QuantumChannel, ChannelError> {
        validate_prob(gamma)?;

        let zero = Complex64::new(0.0, 0.0);
        let k0 = array![
            [Complex64::new(1.0, 0.0), zero],
            [zero, Complex64::new((1.0 - gamma).sqrt(), 0.0)]
        ];
        let k1 = array![
            [zero, Complex64::new(gamma.sqrt(), 0.0)],
            [zero, zero]
        ];

        QuantumChannel::new(vec![k0, k1])
    }

    /// Phase Damping -> T2 relaxation
    pub fn phase_damping(lambda: f64) -> Result<QuantumChannel, ChannelError> {
        validate_prob(lambda)?;

        let zero = Complex64::new(0.0, 0.0);
        let k0 = array![
            [Complex64::new(1.0, 0.0), zero],
            [zero, Complex64::new((1.0 - lambda).sqrt(), 0.0)]
        ];
        let k1 = array![
            [zero, zero],
            [zero, Complex64::new(lambda.sqrt(), 0.0)]
        ];

        QuantumChannel::new(vec![k0, k1])
    }
}

/// Validate probability parameter
fn validate_prob(p: f64) -> Result<(), ChannelError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ChannelError::InvalidProbability(p));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_channels_are_trace_preserving() {
        // Construction runs the completeness check, so building is the test.
        QuantumChannel::identity();
        QuantumChannel::bit_flip(0.3).unwrap();
        QuantumChannel::phase_flip(0.05).unwrap();
        QuantumChannel::depolarizing(0.2).unwrap();
        QuantumChannel::amplitude_damping(0.4).unwrap();
        QuantumChannel::phase_damping(0.1).unwrap();
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        assert!(matches!(
            QuantumChannel::bit_flip(1.5),
            Err(ChannelError::InvalidProbability(_))
        ));
        assert!(matches!(
            QuantumChannel::depolarizing(-0.1),
            Err(ChannelError::InvalidProbability(_))
        ));
    }

    #[test]
    fn empty_channel_is_rejected() {
        assert!(matches!(
            QuantumChannel::new(vec![]),
            Err(ChannelError::Empty)
        ));
    }

    #[test]
    fn zero_probability_flip_is_identity() {
        let ch = QuantumChannel::bit_flip(0.0).unwrap();
        assert_eq!(ch.kraus_ops.len(), 1);
    }

    #[test]
    fn composition_stays_trace_preserving() {
        let a = QuantumChannel::bit_flip(0.1).unwrap();
        let b = QuantumChannel::phase_flip(0.2).unwrap();
        let composed = a.compose(&b).unwrap();
        assert_eq!(composed.kraus_ops.len(), 4);
        assert!(utils::check_completeness(&composed.kraus_ops, 2));
    }

    #[test]
    fn composition_requires_equal_arity() {
        let a = QuantumChannel::bit_flip(0.1).unwrap();
        let big = QuantumChannel::new(vec![ndarray::Array2::<Complex64>::eye(4)]).unwrap();
        assert!(matches!(
            a.compose(&big),
            Err(ChannelError::OperatorSizeMismatch)
        ));
    }
}
