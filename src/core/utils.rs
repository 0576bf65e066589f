//! Utility functions for quantum operations.
//!
//! This module contains helper functions for:
//! - Matrix operations (trace, outer product).
//! - Operator expansion to larger systems.
//! - Completeness checks for measurements and channels.
//! - Bit manipulation for state indices.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Computes the trace of a matrix (sum of diagonal elements).
pub fn trace(matrix: &Array2<Complex64>) -> Complex64 {
    matrix.diag().sum()
}

/// Computes the outer product of two vectors $|a\rangle\langle b|$.
pub fn outer_product(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Array2<Complex64> {
    let n = a.len();
    let m = b.len();
    let mut res = Array2::zeros((n, m));

    for i in 0..n {
        for j in 0..m {
            res[[i, j]] = a[i] * b[j].conj();
        }
    }
    res
}

/// Generates the full operator matrix ($2^N \times 2^N$) for the whole system.
///
/// It expands a local operator acting on `targets` (and controlled by `controls`)
/// to an operator on the full system of `num_total_qubits`.
///
/// # Arguments
///
/// * `num_total_qubits` - Total number of qubits in the system.
/// * `matrix` - The matrix representation of the local gate.
/// * `targets` - Indices of the target qubits.
/// * `controls` - Indices of the control qubits.
pub fn expand_operator(
    num_total_qubits: usize,
    matrix: &Array2<Complex64>,
    targets: &[usize],
    controls: &[usize],
) -> Array2<Complex64> {
    let dim = 1 << num_total_qubits;
    let mut full_matrix = Array2::<Complex64>::zeros((dim, dim));

    let mut control_mask = 0usize;
    for &c in controls {
        control_mask |= 1 << c;
    }

    let mut target_mask = 0usize;
    for &t in targets {
        target_mask |= 1 << t;
    }

    // Bits outside the target set pass through unchanged.
    let passive_mask = !target_mask;

    // Each column corresponds to one basis state of the full register.
    for col_idx in 0..dim {
        if (col_idx & control_mask) != control_mask {
            // Not all control qubits are 1: the basis state is untouched.
            full_matrix[[col_idx, col_idx]] = Complex64::new(1.0, 0.0);
            continue;
        }

        // The local operator acts on the bits sitting at the target positions.
        let small_col = extract_bits(col_idx, targets);

        for small_row in 0..matrix.nrows() {
            let val = matrix[[small_row, small_col]];
            if val.norm_sqr() < f64::EPSILON {
                continue;
            }

            // Scatter the local row bits back to their physical positions and
            // recombine with the untouched passive bits.
            let new_target_bits = deposit_bits(small_row, targets);
            let row_idx = (col_idx & passive_mask) | new_target_bits;

            full_matrix[[row_idx, col_idx]] = val;
        }
    }
    full_matrix
}

/// Gathers the bits of `value` at positions `indices` into a compact index.
fn extract_bits(value: usize, indices: &[usize]) -> usize {
    let mut result = 0;
    for (i, &pos) in indices.iter().enumerate() {
        if (value >> pos) & 1 == 1 {
            result |= 1 << i;
        }
    }
    result
}

/// Scatters bits from `compact_value` into the positions specified by `indices`.
fn deposit_bits(compact_value: usize, indices: &[usize]) -> usize {
    // Maps the i-th bit of `compact_value` to bit position `indices[i]` in the result.
    let mut result = 0;
    for (i, &pos) in indices.iter().enumerate() {
        if (compact_value >> i) & 1 == 1 {
            result |= 1 << pos;
        }
    }
    result
}

/// Find duplicate in a slice of usize
pub fn find_duplicate(indices: &[usize]) -> Option<usize> {
    let mut seen = std::collections::HashSet::new();
    indices.iter().find(|&&idx| !seen.insert(idx)).copied()
}

/// Checks completeness relation for measurement or Kraus operators.
///
/// Verifies if $\sum M_k^\dagger M_k = I$.
pub fn check_completeness(ops: &[Array2<Complex64>], dim: usize) -> bool {
    let eye = Array2::<Complex64>::eye(dim);
    let sum = ops
        .iter()
        .fold(Array2::<Complex64>::zeros((dim, dim)), |acc, op| {
            let dag = op.t().mapv(|c| c.conj());
            acc + dag.dot(op)
        });
    sum.iter()
        .zip(eye.iter())
        .all(|(a, b)| (a - b).norm() < 1e-9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn trace_sums_diagonal() {
        let m = array![[c(1.0, 0.0), c(5.0, 0.0)], [c(7.0, 0.0), c(2.0, 3.0)]];
        assert_eq!(trace(&m), c(3.0, 3.0));
    }

    #[test]
    fn outer_product_of_basis_vectors_is_projector() {
        let v0 = array![c(1.0, 0.0), c(0.0, 0.0)];
        let p0 = outer_product(&v0, &v0);
        assert_eq!(p0[[0, 0]], c(1.0, 0.0));
        assert_eq!(p0[[1, 1]], c(0.0, 0.0));
        assert_eq!(p0[[0, 1]], c(0.0, 0.0));
    }

    #[test]
    fn expand_x_on_second_qubit() {
        let x = array![[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]];
        let full = expand_operator(2, &x, &[1], &[]);

        // |00> (index 0) must map to |10> (index 2).
        assert_eq!(full[[2, 0]], c(1.0, 0.0));
        assert_eq!(full[[0, 2]], c(1.0, 0.0));
        assert_eq!(full[[3, 1]], c(1.0, 0.0));
        assert_eq!(full[[0, 0]], c(0.0, 0.0));
    }

    #[test]
    fn expand_controlled_x_matches_cnot() {
        let x = array![[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]];
        let cnot = expand_operator(2, &x, &[1], &[0]);

        // Control is qubit 0 (LSB): |01> -> |11>, |11> -> |01>, rest fixed.
        assert_eq!(cnot[[0, 0]], c(1.0, 0.0));
        assert_eq!(cnot[[3, 1]], c(1.0, 0.0));
        assert_eq!(cnot[[2, 2]], c(1.0, 0.0));
        assert_eq!(cnot[[1, 3]], c(1.0, 0.0));
    }

    #[test]
    fn find_duplicate_reports_repeated_index() {
        assert_eq!(find_duplicate(&[0, 1, 2]), None);
        assert_eq!(find_duplicate(&[0, 1, 1]), Some(1));
    }

    #[test]
    fn projectors_satisfy_completeness() {
        let p0 = array![[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(0.0, 0.0)]];
        let p1 = array![[c(0.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(1.0, 0.0)]];
        assert!(check_completeness(&[p0.clone(), p1], 2));
        assert!(!check_completeness(&[p0], 2));
    }
}
