//! Quantum Key Distribution (QKD) Protocols.
//!
//! - **BB84**: the first quantum key distribution protocol, with an optional
//!   intercept-resend eavesdropper.
//! - QBER and related key metrics live in [`metrics`].

pub mod bb84;
pub mod metrics;

use crate::core::Measurement;
use rand::Rng;

/// A conjugate measurement basis choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    /// The computational (Z) basis: {|0>, |1>}.
    Rectilinear,
    /// The Hadamard (X) basis: {|+>, |->}.
    Diagonal,
}

impl Basis {
    /// Draws a basis uniformly at random.
    pub fn random(rng: &mut impl Rng) -> Basis {
        if rng.random_bool(0.5) {
            Basis::Diagonal
        } else {
            Basis::Rectilinear
        }
    }

    /// The projective measurement for this basis.
    pub fn measurement(&self) -> Measurement {
        match self {
            Basis::Rectilinear => Measurement::z_basis(),
            Basis::Diagonal => Measurement::x_basis(),
        }
    }
}
