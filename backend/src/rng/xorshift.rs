//! xorshift64* random number generator
//!
//! 64-bit state, 64-bit output, passes BigCrush. Same seed → same sequence,
//! which makes randomized topologies-with-timings reproducible.

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use flood_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let loop_length = rng.below(100); // [0, 100)
/// assert!(loop_length < 100);
/// ```
#[derive(Debug, Clone)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed (a zero seed is replaced by 1)
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate a value in `[0, max)`
    ///
    /// Returns 0 when `max` is 0, so an all-zero maximum means "always zero".
    pub fn below(&mut self, max: u64) -> u64 {
        if max == 0 {
            return 0;
        }
        self.next() % max
    }

    /// Generate a value in `[min, max)`
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: u64, max: u64) -> u64 {
        assert!(min < max, "min must be less than max");
        min + self.next() % (max - min)
    }
}
