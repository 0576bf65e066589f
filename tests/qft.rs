//! QFT round trips executed through the shot-based simulator.

use qkdsim::algorithms::{iqft, qft};
use qkdsim::{Circuit, NoiseModel, Simulator};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn qft_iqft_round_trip_restores_basis_states() {
    let n = 3;
    let mut rng = StdRng::seed_from_u64(17);
    let sim = Simulator::new();

    for input in 0..(1usize << n) {
        let mut qc = Circuit::new(n);
        for q in 0..n {
            if (input >> q) & 1 == 1 {
                qc.x(q);
            }
        }
        qft(&mut qc, n);
        iqft(&mut qc, n);
        for q in 0..n {
            qc.measure(q);
        }

        let counts = sim.run_with_rng(&qc, 50, &mut rng).unwrap();

        let expected: String = (0..n)
            .map(|q| if (input >> q) & 1 == 1 { '1' } else { '0' })
            .collect();
        assert_eq!(counts.len(), 1, "round trip of {input} is not deterministic");
        assert_eq!(counts[&expected], 50);
    }
}

#[test]
fn qft_of_ground_state_samples_uniformly() {
    let n = 3;
    let shots = 4096;

    let mut qc = Circuit::new(n);
    qft(&mut qc, n);

    let mut rng = StdRng::seed_from_u64(23);
    let counts = Simulator::new().run_with_rng(&qc, shots, &mut rng).unwrap();

    assert_eq!(counts.len(), 1 << n);
    for (outcome, count) in &counts {
        // Expected 512 per outcome; allow a generous statistical band.
        assert!(
            *count > 380 && *count < 660,
            "outcome {outcome} drawn {count} times"
        );
    }
}

#[test]
fn simplification_removes_the_whole_round_trip() {
    let n = 4;
    let mut qc = Circuit::new(n);
    qft(&mut qc, n);
    iqft(&mut qc, n);

    let slim = qc.simplified();
    assert!(slim.is_empty());

    // The simplified circuit still runs and measures the untouched register.
    let mut rng = StdRng::seed_from_u64(3);
    let counts = Simulator::new().run_with_rng(&slim, 20, &mut rng).unwrap();
    assert_eq!(counts["0000"], 20);
}

#[test]
fn noisy_round_trip_degrades_gracefully() {
    let n = 2;
    let mut qc = Circuit::new(n);
    qft(&mut qc, n);
    iqft(&mut qc, n);

    let sim = Simulator::new().with_noise(NoiseModel::depolarizing(0.05).unwrap());
    let mut rng = StdRng::seed_from_u64(41);
    let counts = sim.run_with_rng(&qc, 2000, &mut rng).unwrap();

    // The ideal outcome stays dominant under mild gate noise.
    let ground = counts.get("00").copied().unwrap_or(0);
    assert!(ground > 1400, "ground state only drawn {ground} times");
}
