use crate::core::errors::MeasurementError;
use crate::core::utils;
use ndarray::{array, Array1, Array2};
use num_complex::Complex64;

/// A projective measurement, described by its operator set.
#[derive(Clone, Debug)]
pub struct Measurement {
    /// List of measurement operators
    pub operators: Vec<Array2<Complex64>>,
    /// Value associated with each outcome
    pub values: Vec<f64>,
    /// Number of qubits the measurement acts on
    pub num_qubits: usize,
}

impl Measurement {
    pub fn new(
        operators: Vec<Array2<Complex64>>,
        values: Vec<f64>,
    ) -> Result<Self, MeasurementError> {
        if operators.len() != values.len() {
            return Err(MeasurementError::CountMismatch {
                ops: operators.len(),
                vals: values.len(),
            });
        }

        if operators.is_empty() {
            return Err(MeasurementError::InvalidDimensions);
        }

        let (rows, cols) = operators[0].dim();
        if rows != cols || !rows.is_power_of_two() {
            return Err(MeasurementError::InvalidDimensions);
        }
        // log_2 as rows is power of two
        let num_qubits = rows.trailing_zeros() as usize;

        for op in &operators {
            if op.dim() != (rows, cols) {
                return Err(MeasurementError::InvalidDimensions);
            }
        }

        if !utils::check_completeness(&operators, rows) {
            return Err(MeasurementError::NotComplete);
        }

        Ok(Self {
            operators,
            values,
            num_qubits,
        })
    }

    /// Expands the measurement operators to a larger system.
    pub fn get_expanded_operators(
        &self,
        num_total_qubits: usize,
        targets: &[usize],
    ) -> Result<Vec<Array2<Complex64>>, MeasurementError> {
        if targets.len() != self.num_qubits {
            return Err(MeasurementError::InvalidDimensions);
        }

        let mut expanded_ops = Vec::with_capacity(self.operators.len());

        for op in &self.operators {
            let full_op = utils::expand_operator(num_total_qubits, op, targets, &[]);
            expanded_ops.push(full_op);
        }

        Ok(expanded_ops)
    }

    /// Z basis (Computational) -> {|0>, |1>}.
    ///
    /// The rectilinear basis of BB84.
    pub fn z_basis() -> Measurement {
        let v0: Array1<Complex64> = array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
        let v1: Array1<Complex64> = array![Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)];

        let p0 = utils::outer_product(&v0, &v0);
        let p1 = utils::outer_product(&v1, &v1);

        Measurement::new(vec![p0, p1], vec![0.0, 1.0]).expect("Error in basis Z")
    }

    /// X basis (Hadamard) -> {|+>, |->}.
    ///
    /// The diagonal basis of BB84.
    pub fn x_basis() -> Measurement {
        let inv_sqrt2 = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);

        let v_plus: Array1<Complex64> = array![inv_sqrt2, inv_sqrt2];
        let v_minus: Array1<Complex64> = array![inv_sqrt2, -inv_sqrt2];

        let p_plus = utils::outer_product(&v_plus, &v_plus);
        let p_minus = utils::outer_product(&v_minus, &v_minus);

        Measurement::new(vec![p_plus, p_minus], vec![0.0, 1.0]).expect("Error in basis X")
    }
}

/// The outcome of a single measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementResult {
    /// Applied measurement operator index
    pub index: usize,
    /// Measurement value
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_bases_are_valid() {
        let z = Measurement::z_basis();
        let x = Measurement::x_basis();
        assert_eq!(z.num_qubits, 1);
        assert_eq!(x.num_qubits, 1);
        assert_eq!(z.operators.len(), 2);
        assert_eq!(x.operators.len(), 2);
    }

    #[test]
    fn operator_value_count_mismatch_is_rejected() {
        let z = Measurement::z_basis();
        let err = Measurement::new(z.operators, vec![0.0]);
        assert!(matches!(
            err,
            Err(MeasurementError::CountMismatch { ops: 2, vals: 1 })
        ));
    }

    #[test]
    fn incomplete_operator_set_is_rejected() {
        let z = Measurement::z_basis();
        let only_p0 = vec![z.operators[0].clone()];
        let err = Measurement::new(only_p0, vec![0.0]);
        assert!(matches!(err, Err(MeasurementError::NotComplete)));
    }

    #[test]
    fn expansion_requires_matching_target_count() {
        let z = Measurement::z_basis();
        let err = z.get_expanded_operators(2, &[0, 1]);
        assert!(matches!(err, Err(MeasurementError::InvalidDimensions)));
    }
}
