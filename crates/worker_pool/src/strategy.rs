//! Worker selection strategies
//!
//! A strategy only picks an index into the registered worker list. The pool
//! owns the list and guarantees `len > 0` before asking.

use std::sync::atomic::{AtomicUsize, Ordering};

use contracts::SelectionPolicy;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Pluggable selection policy
///
/// Implementations own whatever state they need and synchronize it
/// internally; `next_index` is called concurrently from every dispatcher task.
pub trait SelectionStrategy: Send + Sync {
    /// Strategy name (used for logging)
    fn name(&self) -> &str;

    /// Pick an index in `0..len`; `len` is never zero
    fn next_index(&self, len: usize) -> usize;
}

/// Deterministic rotation in registration order
#[derive(Debug, Default)]
pub struct RoundRobinStrategy {
    cursor: AtomicUsize,
}

impl RoundRobinStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStrategy for RoundRobinStrategy {
    fn name(&self) -> &str {
        "round_robin"
    }

    fn next_index(&self, len: usize) -> usize {
        self.cursor.fetch_add(1, Ordering::Relaxed) % len
    }
}

/// Uniform random choice over an injected generator
pub struct RandomStrategy {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl RandomStrategy {
    /// Seeded generator, reproducible across runs
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system
    pub fn from_os_rng() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Use a caller-supplied randomness source
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }
}

impl SelectionStrategy for RandomStrategy {
    fn name(&self) -> &str {
        "random"
    }

    fn next_index(&self, len: usize) -> usize {
        self.rng.lock().random_range(0..len)
    }
}

impl std::fmt::Debug for RandomStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomStrategy").finish_non_exhaustive()
    }
}

/// Build the strategy for a configured policy
///
/// `seed` only applies to the random policy.
pub fn strategy_for(policy: SelectionPolicy, seed: Option<u64>) -> Box<dyn SelectionStrategy> {
    match policy {
        SelectionPolicy::RoundRobin => Box::new(RoundRobinStrategy::new()),
        SelectionPolicy::Random => match seed {
            Some(seed) => Box::new(RandomStrategy::seeded(seed)),
            None => Box::new(RandomStrategy::from_os_rng()),
        },
    }
}
