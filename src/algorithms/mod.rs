//! Quantum algorithm building blocks.
//!
//! Routines here append gate sequences to an existing [`Circuit`](crate::Circuit)
//! so they can be embedded in larger algorithms (phase estimation, Shor, ...).

mod qft;

pub use qft::{iqft, qft};
