//! Deterministic random number generation
//!
//! Randomized timing profiles draw from this generator only, so a seed fully
//! determines every agent's clock.

mod xorshift;

pub use xorshift::RngManager;
