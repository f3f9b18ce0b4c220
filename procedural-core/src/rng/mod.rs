//! Random integer sources.
//!
//! Generation only ever asks for a uniform integer in an inclusive range, which
//! keeps the draw sequence easy to script in tests. Seeded sessions use a
//! xoshiro stream whose seed is derived from the root seed and a run index.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use sha3::{Digest, Sha3_256};

/// Uniform integer generator over an inclusive range `[lo, hi]`.
pub trait RandomSource: Send + Sync {
    fn integer_in_range(&mut self, lo: i32, hi: i32) -> i32;
}

/// Derive an independent stream seed from a root seed and a run index
pub fn derive_seed(root: u64, run: u64) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(root.to_le_bytes());
    hasher.update(run.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_le_bytes(bytes)
}

#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: Xoshiro256PlusPlus,
    seed: u64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            seed,
        }
    }

    /// Stream for the `run`-th session started from `root`
    pub fn for_run(root: u64, run: u64) -> Self {
        Self::new(derive_seed(root, run))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn integer_in_range(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }
}

/// Replays a fixed list of draws, clamped into the requested range.
///
/// Once the script is exhausted every draw returns `lo`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    draws: VecDeque<i32>,
    consumed: usize,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = i32>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            consumed: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl RandomSource for ScriptedRandom {
    fn integer_in_range(&mut self, lo: i32, hi: i32) -> i32 {
        self.consumed += 1;
        match self.draws.pop_front() {
            Some(draw) => draw.clamp(lo, hi.max(lo)),
            None => lo,
        }
    }
}
