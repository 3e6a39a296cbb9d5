//! Deterministic random number generation
//!
//! Every run owns its own seeded generator; there is no process-wide RNG.
//! All randomness in the simulator MUST go through this module so that a
//! given seed reproduces an identical run.

mod xorshift;

pub use xorshift::RngManager;
