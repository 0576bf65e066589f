//! Quantum Cryptography Protocols.
//!
//! This module contains implementations of quantum cryptography protocols,
//! currently QKD (Quantum Key Distribution).

pub mod qkd;

pub use qkd::bb84;
