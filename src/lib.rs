//! Density-matrix simulation of BB84 quantum key distribution.
//!
//! The crate bundles a small simulation engine (states, gates, projective
//! measurements, Kraus noise channels), a gate-list [`Circuit`] with QFT
//! helpers in [`algorithms`], a shot-based [`Simulator`] with configurable
//! [`NoiseModel`], and the BB84 protocol itself in [`protocols::qkd`].

pub mod algorithms;
mod circuit;
mod core;
pub mod protocols;
mod simulator;

pub use crate::circuit::{Circuit, Op};
pub use crate::core::{
    errors, utils, Gate, Measurement, MeasurementResult, QuantumChannel, QuantumState,
};
pub use crate::simulator::{NoiseModel, Simulator};
