//! Deterministic random number generation for effect rolls.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical crit rolls, jitter and picks
//! - **Serializable**: O(1) state capture and restore
//!
//! ## Usage
//!
//! ```
//! use gameplay_effects::core::EffectRng;
//!
//! let mut a = EffectRng::new(42);
//! let mut b = EffectRng::new(42);
//! assert_eq!(a.gen_unit(), b.gen_unit());
//!
//! // Probabilities outside [0, 1] are clamped instead of panicking
//! assert!(a.roll(2.0));
//! assert!(!a.roll(-1.0));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG used by the engine.
///
/// Uses ChaCha8 for speed while keeping a well-distributed stream.
#[derive(Clone, Debug)]
pub struct EffectRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl EffectRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this stream started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Roll a probability check.
    ///
    /// `chance <= 0` never succeeds and `chance >= 1` always succeeds,
    /// without consuming randomness.
    pub fn roll(&mut self, chance: f64) -> bool {
        if chance <= 0.0 {
            return false;
        }
        if chance >= 1.0 {
            return true;
        }
        self.inner.gen_bool(chance)
    }

    /// Uniform value in `[0, 1)`.
    pub fn gen_unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Uniform value in `[-spread, spread]`.
    pub fn gen_spread(&mut self, spread: f64) -> f64 {
        if spread <= 0.0 {
            return 0.0;
        }
        self.inner.gen_range(-spread..=spread)
    }

    /// Random index in `0..len`, `None` when `len == 0`.
    pub fn gen_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.inner.gen_range(0..len))
        }
    }

    /// Choose an index with weighted probability.
    ///
    /// Weights do not need to sum to 1.0. Negative weights count as zero.
    /// Returns `None` if weights are empty or all zero.
    pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
        if total <= 0.0 {
            return None;
        }

        let mut threshold = self.gen_unit() * total;

        for (i, &weight) in weights.iter().enumerate() {
            let weight = weight.max(0.0);
            if weight == 0.0 {
                continue;
            }
            threshold -= weight;
            if threshold <= 0.0 {
                return Some(i);
            }
        }

        // Floating point edge case - return last non-zero weight
        weights.iter().rposition(|&w| w > 0.0)
    }

    /// Get the current state for checkpointing.
    #[must_use]
    pub fn state(&self) -> EffectRngState {
        EffectRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &EffectRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG state.
///
/// Uses ChaCha8 word position for O(1) capture regardless of
/// how many rolls have been made.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}
