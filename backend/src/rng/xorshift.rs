//! xorshift64* random number generator
//!
//! Fast, deterministic PRNG used for arrival generation and length-of-stay
//! draws. Same seed, same sequence — which is what makes run replay and the
//! determinism tests possible.
//!
//! A run uses two independent streams (see [`RngManager::for_stream`]): one
//! owned by the arrival model, one owned by the engine for length-of-stay
//! sampling at admission time. Splitting the streams keeps the arrival
//! sequence independent of allocation outcomes: admitting more or fewer
//! patients never changes who arrives next.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*.
///
/// # Example
/// ```
/// use hospital_simulator_core_rs::rng::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let severity = rng.range(1, 6); // [1, 6)
/// let arrivals = rng.poisson(1.5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        // xorshift state must be non-zero
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Derive an independent stream from a seed.
    ///
    /// Uses a splitmix64 finalizer over (seed, stream) so streams drawn from
    /// the same run seed do not correlate.
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        let mut z = seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self::new(z ^ (z >> 31))
    }

    /// Generate the next random u64, advancing the state.
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Random value in `[min, max)`.
    ///
    /// # Panics
    /// Panics if `min >= max`.
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");
        let range_size = (max - min) as u64;
        min + (self.next() % range_size) as i64
    }

    /// Random f64 in `[0.0, 1.0)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next() >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Random f64 in `[min, max)`.
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Sample a count from a Poisson distribution with mean `lambda`.
    ///
    /// Knuth's multiplication method; fine for the per-slot arrival rates
    /// used here (lambda well below 30).
    pub fn poisson(&mut self, lambda: f64) -> usize {
        if lambda <= 0.0 {
            return 0;
        }
        let threshold = (-lambda).exp();
        let mut k = 0usize;
        let mut p = 1.0;
        loop {
            p *= self.next_f64();
            if p <= threshold {
                return k;
            }
            k += 1;
        }
    }

    /// Pick an index proportionally to `weights`.
    ///
    /// Non-positive weights are treated as zero.
    ///
    /// # Panics
    /// Panics if `weights` is empty or sums to zero.
    pub fn weighted(&mut self, weights: &[f64]) -> usize {
        assert!(!weights.is_empty(), "weights must not be empty");
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        assert!(total > 0.0, "weights must have positive mass");

        let mut target = self.next_f64() * total;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            target -= w;
            if target <= 0.0 {
                return i;
            }
        }
        // Floating point slack lands on the last positive weight
        weights
            .iter()
            .rposition(|w| *w > 0.0)
            .expect("checked above")
    }

    /// Current internal state, for diagnostics.
    pub fn state(&self) -> u64 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seed_converted_to_nonzero() {
        assert_ne!(RngManager::new(0).state(), 0);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RngManager::new(99999);
        let mut b = RngManager::new(99999);
        for _ in 0..100 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn test_streams_diverge() {
        let mut a = RngManager::for_stream(42, 0);
        let mut b = RngManager::for_stream(42, 1);
        let same = (0..32).filter(|_| a.next() == b.next()).count();
        assert_eq!(same, 0);
    }

    #[test]
    #[should_panic(expected = "min must be less than max")]
    fn test_range_invalid_bounds() {
        RngManager::new(1).range(10, 10);
    }

    #[test]
    fn test_range_bounds_respected() {
        let mut rng = RngManager::new(7);
        for _ in 0..1000 {
            let v = rng.range(1, 6);
            assert!((1..6).contains(&v));
        }
    }

    #[test]
    fn test_next_f64_in_unit_interval() {
        let mut rng = RngManager::new(7);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_poisson_zero_lambda() {
        let mut rng = RngManager::new(7);
        assert_eq!(rng.poisson(0.0), 0);
        assert_eq!(rng.poisson(-1.0), 0);
    }

    #[test]
    fn test_poisson_mean_roughly_lambda() {
        let mut rng = RngManager::new(7);
        let n = 5000;
        let total: usize = (0..n).map(|_| rng.poisson(2.0)).sum();
        let mean = total as f64 / n as f64;
        assert!((1.8..2.2).contains(&mean), "mean was {mean}");
    }

    #[test]
    fn test_weighted_skips_zero_mass() {
        let mut rng = RngManager::new(7);
        for _ in 0..200 {
            let idx = rng.weighted(&[0.0, 1.0, 0.0]);
            assert_eq!(idx, 1);
        }
    }

    #[test]
    fn test_weighted_prefers_heavier_index() {
        let mut rng = RngManager::new(7);
        let mut counts = [0usize; 2];
        for _ in 0..2000 {
            counts[rng.weighted(&[9.0, 1.0])] += 1;
        }
        assert!(counts[0] > counts[1] * 4);
    }
}
