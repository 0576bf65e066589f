use crate::core::errors::StateError;
use crate::core::{Gate, QuantumState};
use ndarray::Array2;
use num_complex::Complex64;

/// A single circuit operation.
#[derive(Clone, Debug)]
pub enum Op {
    /// A unitary gate on `targets`, optionally conditioned on `controls`.
    Unitary {
        gate: Gate,
        targets: Vec<usize>,
        controls: Vec<usize>,
    },
    /// A Z-basis measurement of one qubit.
    Measure { qubit: usize },
}

/// An ordered list of gate and measurement operations over a fixed register.
///
/// Builder methods only record operations; qubit indices are validated when
/// the circuit is executed, so an out-of-range index surfaces as a
/// `StateError` from the run, not as a panic while building.
#[derive(Clone, Debug)]
pub struct Circuit {
    num_qubits: usize,
    ops: Vec<Op>,
}

impl Circuit {
    /// Creates an empty circuit over `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            ops: Vec::new(),
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Appends an arbitrary gate.
    pub fn push_gate(&mut self, gate: Gate, targets: &[usize], controls: &[usize]) -> &mut Self {
        self.ops.push(Op::Unitary {
            gate,
            targets: targets.to_vec(),
            controls: controls.to_vec(),
        });
        self
    }

    /// Appends a Hadamard gate.
    pub fn h(&mut self, qubit: usize) -> &mut Self {
        self.push_gate(Gate::h(), &[qubit], &[])
    }

    /// Appends a Pauli-X gate.
    pub fn x(&mut self, qubit: usize) -> &mut Self {
        self.push_gate(Gate::x(), &[qubit], &[])
    }

    /// Appends a Pauli-Z gate.
    pub fn z(&mut self, qubit: usize) -> &mut Self {
        self.push_gate(Gate::z(), &[qubit], &[])
    }

    /// Appends an S gate.
    pub fn s(&mut self, qubit: usize) -> &mut Self {
        self.push_gate(Gate::s(), &[qubit], &[])
    }

    /// Appends a phase gate diag(1, e^{iθ}).
    pub fn phase(&mut self, theta: f64, qubit: usize) -> &mut Self {
        self.push_gate(Gate::phase(theta), &[qubit], &[])
    }

    /// Appends a controlled-phase rotation.
    pub fn cp(&mut self, theta: f64, control: usize, target: usize) -> &mut Self {
        self.push_gate(Gate::phase(theta), &[target], &[control])
    }

    /// Appends a CNOT gate.
    pub fn cnot(&mut self, control: usize, target: usize) -> &mut Self {
        self.push_gate(Gate::x(), &[target], &[control])
    }

    /// Appends a SWAP gate.
    pub fn swap(&mut self, a: usize, b: usize) -> &mut Self {
        self.push_gate(Gate::swap(), &[a, b], &[])
    }

    /// Appends a Z-basis measurement of `qubit`.
    pub fn measure(&mut self, qubit: usize) -> &mut Self {
        self.ops.push(Op::Measure { qubit });
        self
    }

    /// The qubits with explicit measurements, in the order they were appended.
    pub fn measured_qubits(&self) -> Vec<usize> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Measure { qubit } => Some(*qubit),
                _ => None,
            })
            .collect()
    }

    /// Applies every unitary of the circuit to `state`, ignoring measurements.
    pub fn apply_unitaries(&self, state: &mut QuantumState) -> Result<(), StateError> {
        for op in &self.ops {
            if let Op::Unitary {
                gate,
                targets,
                controls,
            } = op
            {
                state.apply_controlled(gate, targets, Some(controls))?;
            }
        }
        Ok(())
    }

    /// Returns a circuit with adjacent self-inverse gate pairs removed.
    ///
    /// Two consecutive unitaries on the same targets and controls whose
    /// product is the identity (H·H, X·X, SWAP·SWAP, CP(θ)·CP(−θ), ...)
    /// cancel. Measurements are kept and break adjacency.
    pub fn simplified(&self) -> Circuit {
        let mut ops: Vec<Op> = Vec::with_capacity(self.ops.len());

        for op in &self.ops {
            let cancels_previous = match (op, ops.last()) {
                (
                    Op::Unitary {
                        gate,
                        targets,
                        controls,
                    },
                    Some(Op::Unitary {
                        gate: prev_gate,
                        targets: prev_targets,
                        controls: prev_controls,
                    }),
                ) => {
                    targets == prev_targets
                        && controls == prev_controls
                        && is_identity(&gate.matrix.dot(&prev_gate.matrix))
                }
                _ => false,
            };

            if cancels_previous {
                ops.pop();
            } else {
                ops.push(op.clone());
            }
        }

        Circuit {
            num_qubits: self.num_qubits,
            ops,
        }
    }
}

fn is_identity(matrix: &Array2<Complex64>) -> bool {
    let eye = Array2::<Complex64>::eye(matrix.nrows());
    matrix
        .iter()
        .zip(eye.iter())
        .all(|(a, b)| (a - b).norm() < 1e-9)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_records_ops_in_order() {
        let mut qc = Circuit::new(2);
        qc.h(0).cnot(0, 1).measure(0).measure(1);
        assert_eq!(qc.len(), 4);
        assert_eq!(qc.measured_qubits(), vec![0, 1]);
    }

    #[test]
    fn double_hadamard_cancels() {
        let mut qc = Circuit::new(1);
        qc.h(0).h(0);
        assert!(qc.simplified().is_empty());
    }

    #[test]
    fn opposite_phases_cancel() {
        let mut qc = Circuit::new(2);
        qc.cp(0.7, 0, 1).cp(-0.7, 0, 1);
        assert!(qc.simplified().is_empty());
    }

    #[test]
    fn gates_on_different_wires_do_not_cancel() {
        let mut qc = Circuit::new(2);
        qc.h(0).h(1);
        assert_eq!(qc.simplified().len(), 2);
    }

    #[test]
    fn measurement_blocks_cancellation() {
        let mut qc = Circuit::new(1);
        qc.h(0).measure(0).h(0);
        assert_eq!(qc.simplified().len(), 3);
    }

    #[test]
    fn cascading_pairs_cancel() {
        // X H H X leaves nothing once the inner pair is gone.
        let mut qc = Circuit::new(1);
        qc.x(0).h(0).h(0).x(0);
        assert!(qc.simplified().is_empty());
    }

    #[test]
    fn apply_unitaries_flips_bit() {
        let mut qc = Circuit::new(1);
        qc.x(0);

        let mut state = QuantumState::new(1);
        qc.apply_unitaries(&mut state).unwrap();
        assert!((state.density_matrix[[1, 1]].re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_index_fails_at_execution() {
        let mut qc = Circuit::new(1);
        qc.x(5);

        let mut state = QuantumState::new(1);
        assert!(qc.apply_unitaries(&mut state).is_err());
    }
}
