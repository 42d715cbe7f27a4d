/*!
 * Random Draw Generator
 * Linear-congruential source for lottery draws
 *
 * Deterministic and reseedable so scheduling runs can be replayed. Not fit
 * for anything security sensitive.
 */

use serde::{Deserialize, Serialize};

const MULTIPLIER: u32 = 1_664_525;
const INCREMENT: u32 = 1_013_904_223;

/// Bits produced per step
const OUTPUT_BITS: u32 = 15;

/// Linear-congruential generator: `seed' = 1664525 * seed + 1013904223 (mod 2^32)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lcg {
    seed: u32,
}

impl Lcg {
    pub const fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Restart the sequence from `seed`
    pub fn reseed(&mut self, seed: u32) {
        self.seed = seed;
    }

    /// Current internal state
    pub const fn state(&self) -> u32 {
        self.seed
    }

    /// Advance and return the next 15-bit output (bits 16..=30 of the state)
    #[inline]
    pub fn next_u15(&mut self) -> u32 {
        self.seed = self.seed.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        (self.seed >> 16) & 0x7FFF
    }

    /// Draw a value in `[min, max)`
    ///
    /// A span of at most 2^15 takes a single step. Wider spans concatenate
    /// as many 15-bit outputs as needed to cover them, so every value in
    /// the range stays reachable. Returns `min` without advancing when the
    /// range is empty.
    #[inline]
    pub fn range(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        let span = max - min;
        let mut value = 0u64;
        let mut reach = 1u64;
        while reach < span {
            value = (value << OUTPUT_BITS) | u64::from(self.next_u15());
            reach = reach.saturating_mul(1 << OUTPUT_BITS);
        }
        min + value % span
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(crate::core::limits::DEFAULT_LOTTERY_SEED)
    }
}
