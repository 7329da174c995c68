//! Provable values and witness generation for zero-knowledge circuits.
//!
//! See [`provable_core`] for the library; this crate adds the `provable`
//! command line tool on top of it.

pub use provable_core::*;
