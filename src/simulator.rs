use crate::circuit::{Circuit, Op};
use crate::core::errors::{ChannelError, StateError};
use crate::core::{Measurement, QuantumChannel, QuantumState};
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

/// A noise model applied during circuit execution.
///
/// Holds a single-qubit error channel that is applied after every
/// single-qubit gate, mirroring how simple device noise models register a
/// depolarizing error for the single-qubit gate set.
#[derive(Debug, Clone)]
pub struct NoiseModel {
    gate_noise: QuantumChannel,
}

impl NoiseModel {
    /// A depolarizing error of probability `p` after each single-qubit gate.
    pub fn depolarizing(p: f64) -> Result<Self, ChannelError> {
        Ok(Self {
            gate_noise: QuantumChannel::depolarizing(p)?,
        })
    }

    /// Builds a noise model from any single-qubit channel.
    pub fn from_channel(channel: QuantumChannel) -> Result<Self, ChannelError> {
        if channel.num_qubits != 1 {
            return Err(ChannelError::InvalidDimensions);
        }
        Ok(Self {
            gate_noise: channel,
        })
    }

    pub fn gate_noise(&self) -> &QuantumChannel {
        &self.gate_noise
    }
}

/// Executes circuits, optionally under a [`NoiseModel`], and collects
/// measurement statistics over repeated shots.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    /// Optional noise model applied during execution.
    pub noise: Option<NoiseModel>,
}

impl Simulator {
    /// Creates a noise-free simulator.
    pub fn new() -> Self {
        Self { noise: None }
    }

    /// Sets the noise model for the simulator.
    pub fn with_noise(mut self, noise: NoiseModel) -> Self {
        self.noise = Some(noise);
        self
    }

    /// Evolves |0...0> through the circuit's unitaries (and gate noise, if
    /// configured) and returns the final state. Measurement ops are skipped,
    /// so the result is the pre-measurement state.
    pub fn evolve(&self, circuit: &Circuit) -> Result<QuantumState, StateError> {
        let mut state = QuantumState::new(circuit.num_qubits());

        for op in circuit.ops() {
            if let Op::Unitary {
                gate,
                targets,
                controls,
            } = op
            {
                state.apply_controlled(gate, targets, Some(controls))?;
                self.apply_gate_noise(&mut state, targets, controls)?;
            }
        }

        Ok(state)
    }

    /// Runs the circuit for `shots` shots with a thread-local RNG.
    pub fn run(
        &self,
        circuit: &Circuit,
        shots: usize,
    ) -> Result<HashMap<String, usize>, StateError> {
        self.run_with_rng(circuit, shots, &mut rand::rng())
    }

    /// Runs the circuit for `shots` shots, sampling outcomes from `rng`.
    ///
    /// Each shot starts from |0...0>, applies the operations in order (gate
    /// noise after each single-qubit gate when a noise model is set) and
    /// records one bit per `measure` op. The returned map counts outcome
    /// bitstrings, measured qubits ordered as their `measure` ops were
    /// appended, first measurement leftmost. A circuit without explicit
    /// measurements is measured on every qubit, in ascending order, at the
    /// end of the shot.
    pub fn run_with_rng(
        &self,
        circuit: &Circuit,
        shots: usize,
        rng: &mut impl Rng,
    ) -> Result<HashMap<String, usize>, StateError> {
        let z_basis = Measurement::z_basis();
        let measure_all = circuit.measured_qubits().is_empty();

        let mut counts: HashMap<String, usize> = HashMap::new();

        for _ in 0..shots {
            let mut state = QuantumState::new(circuit.num_qubits());
            let mut outcome = String::new();

            for op in circuit.ops() {
                match op {
                    Op::Unitary {
                        gate,
                        targets,
                        controls,
                    } => {
                        state.apply_controlled(gate, targets, Some(controls))?;
                        self.apply_gate_noise(&mut state, targets, controls)?;
                    }
                    Op::Measure { qubit } => {
                        let res = state.measure(&z_basis, &[*qubit], rng)?;
                        outcome.push(if res.index == 1 { '1' } else { '0' });
                    }
                }
            }

            if measure_all {
                for qubit in 0..circuit.num_qubits() {
                    let res = state.measure(&z_basis, &[qubit], rng)?;
                    outcome.push(if res.index == 1 { '1' } else { '0' });
                }
            }

            *counts.entry(outcome).or_insert(0) += 1;
        }

        debug!(shots, outcomes = counts.len(), "circuit run finished");

        Ok(counts)
    }

    fn apply_gate_noise(
        &self,
        state: &mut QuantumState,
        targets: &[usize],
        controls: &[usize],
    ) -> Result<(), StateError> {
        // Noise is registered for single-qubit gates only, as in the noise
        // model this mirrors.
        if let Some(noise) = &self.noise {
            if targets.len() == 1 && controls.is_empty() {
                state.apply_channel(noise.gate_noise(), targets)?;
            }
        }
        Ok(())
    }
}
