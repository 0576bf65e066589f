use crate::circuit::Circuit;
use std::f64::consts::PI;

/// Appends the quantum Fourier transform on the first `n_qubits` wires of `qc`.
///
/// For each qubit j (ascending): a Hadamard, then a controlled-phase rotation
/// CP(π / 2^(k−j)) from every later qubit k. A final round of swaps reverses
/// the qubit order to match the usual output convention.
pub fn qft(qc: &mut Circuit, n_qubits: usize) {
    for qubit in 0..n_qubits {
        qc.h(qubit);

        for other in (qubit + 1)..n_qubits {
            let theta = PI / (1 << (other - qubit)) as f64;
            qc.cp(theta, other, qubit);
        }
    }

    reverse_order(qc, n_qubits);
}

/// Appends the inverse quantum Fourier transform on the first `n_qubits` wires.
///
/// The exact mirror of [`qft`]: loops run in reverse, rotation angles are
/// negated and the Hadamard follows the rotation block, so `qft` then `iqft`
/// is the identity.
pub fn iqft(qc: &mut Circuit, n_qubits: usize) {
    // Same swaps as `qft`, emitted in mirror order (they commute, but the
    // mirror keeps the composed qft·iqft circuit a palindrome).
    for qubit in (0..n_qubits / 2).rev() {
        qc.swap(qubit, n_qubits - qubit - 1);
    }

    for qubit in (0..n_qubits).rev() {
        for other in ((qubit + 1)..n_qubits).rev() {
            let theta = -PI / (1 << (other - qubit)) as f64;
            qc.cp(theta, other, qubit);
        }

        qc.h(qubit);
    }
}

/// Swaps qubit j with qubit n-1-j.
fn reverse_order(qc: &mut Circuit, n_qubits: usize) {
    for qubit in 0..n_qubits / 2 {
        qc.swap(qubit, n_qubits - qubit - 1);
    }
}
