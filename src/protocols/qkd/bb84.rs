//! BB84 Quantum Key Distribution Protocol.
//!
//! Alice encodes random bits in randomly chosen conjugate bases, Bob measures
//! in his own random bases, and the sifted positions with matching bases form
//! the shared key. An intercept-resend eavesdropper can be enabled; her
//! measurements disturb the states and show up as an elevated QBER.

use crate::core::errors::{ProtocolError, StateError};
use crate::core::{Gate, QuantumChannel, QuantumState};
use crate::protocols::qkd::metrics::qber;
use crate::protocols::qkd::Basis;
use rand::Rng;
use tracing::{debug, info};

/// The random bit and basis choices drawn before any qubit is sent.
///
/// Basis conventions follow the usual BB84 encoding: rectilinear is the Z
/// basis, diagonal the X (Hadamard) basis.
#[derive(Debug, Clone)]
pub struct Initialization {
    /// Alice's random payload bits.
    pub alice_bits: Vec<bool>,
    /// Alice's random preparation bases.
    pub alice_bases: Vec<Basis>,
    /// Bob's random measurement bases.
    pub bob_bases: Vec<Basis>,
    /// Eve's random measurement bases, when an eavesdropper participates.
    pub eve_bases: Option<Vec<Basis>>,
}

/// Draws the random bits and bases for all parties.
pub fn initialize(num_qubits: usize, with_eve: bool, rng: &mut impl Rng) -> Initialization {
    let alice_bits = (0..num_qubits).map(|_| rng.random_bool(0.5)).collect();
    let alice_bases = (0..num_qubits).map(|_| Basis::random(rng)).collect();
    let bob_bases = (0..num_qubits).map(|_| Basis::random(rng)).collect();

    let eve_bases =
        with_eve.then(|| (0..num_qubits).map(|_| Basis::random(rng)).collect::<Vec<_>>());

    Initialization {
        alice_bits,
        alice_bases,
        bob_bases,
        eve_bases,
    }
}

/// Alice prepares a single qubit for one bit/basis pair.
///
/// Bit 1 applies an X gate, the diagonal basis applies a Hadamard on top, so
/// the four BB84 states |0>, |1>, |+>, |-> are covered.
pub fn prepare_state(bit: bool, basis: Basis) -> Result<QuantumState, StateError> {
    let mut state = QuantumState::new(1);

    if bit {
        state.apply(&Gate::x(), &[0])?;
    }
    if basis == Basis::Diagonal {
        state.apply(&Gate::h(), &[0])?;
    }

    Ok(state)
}

/// Eve's intercept-resend attack on one qubit.
///
/// She measures in her basis and forwards the collapsed state, which is
/// exactly the state her measurement projected onto; no separate
/// re-preparation step is needed. Returns the bit she observed.
pub fn intercept_resend(
    state: &mut QuantumState,
    basis: Basis,
    rng: &mut impl Rng,
) -> Result<bool, StateError> {
    let res = state.measure(&basis.measurement(), &[0], rng)?;
    Ok(res.index == 1)
}

/// Bob measures one received qubit in his basis and reads off a bit.
pub fn measure_state(
    state: &mut QuantumState,
    basis: Basis,
    rng: &mut impl Rng,
) -> Result<bool, StateError> {
    let res = state.measure(&basis.measurement(), &[0], rng)?;
    Ok(res.index == 1)
}

/// The outcome of the sifting stage.
#[derive(Debug, Clone)]
pub struct SiftOutcome {
    /// Alice's key: her sent bits at matching-basis positions.
    pub alice_key: Vec<bool>,
    /// Bob's key: his measured bits at the same positions.
    pub bob_key: Vec<bool>,
    /// The raw-sequence indices where the bases matched.
    pub matching_indices: Vec<usize>,
}

/// Sifts the raw records down to the positions where Alice and Bob used the
/// same basis.
///
/// Both keys are returned: noise or an eavesdropper can make Bob's measured
/// bits differ from Alice's sent bits even under matching bases, and that
/// difference is what QBER estimation consumes.
///
/// # Errors
///
/// `LengthMismatch` if the four records do not all have the same length.
pub fn sift(
    alice_bits: &[bool],
    alice_bases: &[Basis],
    bob_bases: &[Basis],
    bob_results: &[bool],
) -> Result<SiftOutcome, ProtocolError> {
    check_length(alice_bits.len(), alice_bases.len())?;
    check_length(alice_bits.len(), bob_bases.len())?;
    check_length(alice_bits.len(), bob_results.len())?;

    let mut alice_key = Vec::new();
    let mut bob_key = Vec::new();
    let mut matching_indices = Vec::new();

    for i in 0..alice_bits.len() {
        if alice_bases[i] == bob_bases[i] {
            alice_key.push(alice_bits[i]);
            bob_key.push(bob_results[i]);
            matching_indices.push(i);
        }
    }

    Ok(SiftOutcome {
        alice_key,
        bob_key,
        matching_indices,
    })
}

fn check_length(expected: usize, got: usize) -> Result<(), ProtocolError> {
    if expected != got {
        return Err(ProtocolError::LengthMismatch {
            left: expected,
            right: got,
        });
    }
    Ok(())
}

/// BB84 results
#[derive(Debug, Clone)]
pub struct Bb84Result {
    /// Number of qubits sent.
    pub raw_length: usize,
    /// Number of matching-basis positions.
    pub sifted_length: usize,
    /// Number of disagreeing bits among the sifted positions.
    pub errors: usize,
    /// QBER as a fraction (0..1) of the sifted key.
    pub qber: f64,
    /// How many qubits Eve intercepted.
    pub eve_intercept_count: usize,
    /// Alice's sifted key.
    pub alice_key: Vec<bool>,
    /// Bob's sifted key.
    pub bob_key: Vec<bool>,
    /// Raw-sequence indices of the sifted positions.
    pub matching_indices: Vec<usize>,
    /// Full per-qubit records of the run.
    pub alice_bits: Vec<bool>,
    pub alice_bases: Vec<Basis>,
    pub bob_bases: Vec<Basis>,
    pub bob_results: Vec<bool>,
}

/// Runs the BB84 protocol with a thread-local RNG.
///
/// See [`run_with_rng`].
pub fn run(
    num_qubits: usize,
    channel: &QuantumChannel,
    eve_ratio: f64,
) -> Result<Bb84Result, ProtocolError> {
    run_with_rng(num_qubits, channel, eve_ratio, &mut rand::rng())
}

/// Runs the BB84 protocol end to end.
///
/// Each qubit goes through: Alice's preparation, transmission over `channel`,
/// an optional intercept-resend by Eve (independently per qubit with
/// probability `eve_ratio`; 1.0 intercepts everything), and Bob's
/// measurement. The records are then sifted and the QBER estimated.
///
/// # Errors
///
/// `InvalidProbability` if `eve_ratio` is outside [0, 1]; otherwise any
/// `StateError` from the quantum operations.
pub fn run_with_rng(
    num_qubits: usize,
    channel: &QuantumChannel,
    eve_ratio: f64,
    rng: &mut impl Rng,
) -> Result<Bb84Result, ProtocolError> {
    if !(0.0..=1.0).contains(&eve_ratio) {
        return Err(ProtocolError::InvalidProbability(eve_ratio));
    }

    let with_eve = eve_ratio > 0.0;
    let init = initialize(num_qubits, with_eve, rng);

    debug!(num_qubits, eve_ratio, "starting BB84 transmission");

    let mut bob_results = Vec::with_capacity(num_qubits);
    let mut eve_intercept_count = 0;

    for i in 0..num_qubits {
        // Alice prepares and sends
        let mut state = prepare_state(init.alice_bits[i], init.alice_bases[i])?;
        state.apply_channel(channel, &[0])?;

        // Eve intercepts
        if let Some(eve_bases) = &init.eve_bases {
            if rng.random_bool(eve_ratio) {
                eve_intercept_count += 1;
                let _ = intercept_resend(&mut state, eve_bases[i], rng)?;
            }
        }

        // Bob measures
        let bit = measure_state(&mut state, init.bob_bases[i], rng)?;
        bob_results.push(bit);
    }

    // Sifting stage
    let sifted = sift(
        &init.alice_bits,
        &init.alice_bases,
        &init.bob_bases,
        &bob_results,
    )?;

    let sifted_length = sifted.alice_key.len();
    let errors = sifted
        .alice_key
        .iter()
        .zip(sifted.bob_key.iter())
        .filter(|(a, b)| a != b)
        .count();

    let qber = if sifted_length > 0 {
        qber(&sifted.alice_key, &sifted.bob_key)?
    } else {
        0.0
    };

    info!(
        raw_length = num_qubits,
        sifted_length,
        errors,
        qber,
        eve_intercept_count,
        "BB84 run complete"
    );

    Ok(Bb84Result {
        raw_length: num_qubits,
        sifted_length,
        errors,
        qber,
        eve_intercept_count,
        alice_key: sifted.alice_key,
        bob_key: sifted.bob_key,
        matching_indices: sifted.matching_indices,
        alice_bits: init.alice_bits,
        alice_bases: init.alice_bases,
        bob_bases: init.bob_bases,
        bob_results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn initialize_draws_all_records() {
        let mut rng = StdRng::seed_from_u64(3);
        let init = initialize(16, true, &mut rng);

        assert_eq!(init.alice_bits.len(), 16);
        assert_eq!(init.alice_bases.len(), 16);
        assert_eq!(init.bob_bases.len(), 16);
        assert_eq!(init.eve_bases.as_ref().map(Vec::len), Some(16));

        let no_eve = initialize(16, false, &mut rng);
        assert!(no_eve.eve_bases.is_none());
    }

    #[test]
    fn matching_basis_measurement_recovers_the_bit() {
        let mut rng = StdRng::seed_from_u64(11);

        for bit in [false, true] {
            for basis in [Basis::Rectilinear, Basis::Diagonal] {
                let mut state = prepare_state(bit, basis).unwrap();
                let measured = measure_state(&mut state, basis, &mut rng).unwrap();
                assert_eq!(measured, bit, "bit {bit:?} in basis {basis:?}");
            }
        }
    }

    #[test]
    fn sift_keeps_only_matching_bases() {
        use Basis::{Diagonal as D, Rectilinear as R};

        let alice_bits = vec![true, false, true, false];
        let alice_bases = vec![R, D, D, R];
        let bob_bases = vec![R, R, D, D];
        let bob_results = vec![true, true, false, false];

        let sifted = sift(&alice_bits, &alice_bases, &bob_bases, &bob_results).unwrap();

        assert_eq!(sifted.matching_indices, vec![0, 2]);
        assert_eq!(sifted.alice_key, vec![true, true]);
        assert_eq!(sifted.bob_key, vec![true, false]);
    }

    #[test]
    fn sift_rejects_mismatched_records() {
        let err = sift(&[true], &[Basis::Rectilinear], &[], &[true]);
        assert!(matches!(
            err,
            Err(ProtocolError::LengthMismatch { left: 1, right: 0 })
        ));
    }

    #[test]
    fn noiseless_run_without_eve_has_zero_qber() {
        let mut rng = StdRng::seed_from_u64(21);
        let channel = QuantumChannel::identity();

        let result = run_with_rng(256, &channel, 0.0, &mut rng).unwrap();

        assert_eq!(result.raw_length, 256);
        assert_eq!(result.errors, 0);
        assert_eq!(result.qber, 0.0);
        assert_eq!(result.eve_intercept_count, 0);
        assert_eq!(result.alice_key, result.bob_key);
    }

    #[test]
    fn eve_ratio_out_of_range_is_rejected() {
        let channel = QuantumChannel::identity();
        assert!(matches!(
            run_with_rng(8, &channel, 1.5, &mut StdRng::seed_from_u64(0)),
            Err(ProtocolError::InvalidProbability(_))
        ));
    }

    #[test]
    fn full_interception_counts_every_qubit() {
        let mut rng = StdRng::seed_from_u64(5);
        let channel = QuantumChannel::identity();

        let result = run_with_rng(64, &channel, 1.0, &mut rng).unwrap();
        assert_eq!(result.eve_intercept_count, 64);
    }

    #[test]
    fn zero_qubit_run_reports_zero_qber() {
        let mut rng = StdRng::seed_from_u64(1);
        let channel = QuantumChannel::identity();

        let result = run_with_rng(0, &channel, 0.0, &mut rng).unwrap();
        assert_eq!(result.sifted_length, 0);
        assert_eq!(result.qber, 0.0);
    }

    proptest! {
        #[test]
        fn sifted_keys_have_equal_length_and_sorted_indices(
            seed in any::<u64>(),
            num_qubits in 1usize..64,
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let init = initialize(num_qubits, false, &mut rng);
            let bob_results: Vec<bool> = (0..num_qubits).map(|_| rng.random_bool(0.5)).collect();

            let sifted = sift(&init.alice_bits, &init.alice_bases, &init.bob_bases, &bob_results).unwrap();

            prop_assert_eq!(sifted.alice_key.len(), sifted.bob_key.len());
            prop_assert_eq!(sifted.alice_key.len(), sifted.matching_indices.len());
            prop_assert!(sifted.matching_indices.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(sifted.matching_indices.iter().all(|&i| i < num_qubits));
        }
    }
}
