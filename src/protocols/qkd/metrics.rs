//! Key-quality metrics for QKD runs.

use crate::core::errors::ProtocolError;

/// Quantum Bit Error Rate: the fraction (0..1) of positions where the sifted
/// keys disagree.
///
/// Both inputs are the sifted keys, i.e. restricted to positions where Alice
/// and Bob used the same basis. The rate characterizes the integrity of the
/// transmission against noise and eavesdropping, before any error correction.
///
/// # Errors
///
/// `LengthMismatch` if the keys differ in length, `EmptyKey` if they are
/// empty (the rate is undefined).
pub fn qber(alice_key: &[bool], bob_key: &[bool]) -> Result<f64, ProtocolError> {
    if alice_key.len() != bob_key.len() {
        return Err(ProtocolError::LengthMismatch {
            left: alice_key.len(),
            right: bob_key.len(),
        });
    }

    if alice_key.is_empty() {
        return Err(ProtocolError::EmptyKey);
    }

    let erroneous_bits = alice_key
        .iter()
        .zip(bob_key.iter())
        .filter(|(a, b)| a != b)
        .count();

    Ok(erroneous_bits as f64 / alice_key.len() as f64)
}
