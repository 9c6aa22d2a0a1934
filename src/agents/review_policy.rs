//! Review verdict sources.
//!
//! The reviewer does not call a global RNG. It asks a [`ReviewPolicy`] whether
//! a first draft needs revision, so callers can seed it or pin the outcome.

use std::fmt;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Decides whether an unmarked draft should be sent back for revision.
pub trait ReviewPolicy: Send + Sync + fmt::Debug {
    fn needs_revision(&self) -> bool;
}

pub type SharedReviewPolicy = Arc<dyn ReviewPolicy>;

/// Default probability that a first draft is sent back.
pub const DEFAULT_REVISION_PROBABILITY: f64 = 0.3;

/// Requests revision with probability `p`.
pub struct RandomReview {
    probability: f64,
    rng: Mutex<StdRng>,
}

impl RandomReview {
    /// Entropy-seeded generator. `probability` is clamped to `[0, 1]`.
    pub fn new(probability: f64) -> Self {
        Self::with_rng(probability, StdRng::from_entropy())
    }

    /// Deterministic generator for reproducible runs.
    pub fn seeded(probability: f64, seed: u64) -> Self {
        Self::with_rng(probability, StdRng::seed_from_u64(seed))
    }

    fn with_rng(probability: f64, rng: StdRng) -> Self {
        let probability = if probability.is_nan() {
            DEFAULT_REVISION_PROBABILITY
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self {
            probability,
            rng: Mutex::new(rng),
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl Default for RandomReview {
    fn default() -> Self {
        Self::new(DEFAULT_REVISION_PROBABILITY)
    }
}

impl fmt::Debug for RandomReview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomReview")
            .field("probability", &self.probability)
            .finish_non_exhaustive()
    }
}

impl ReviewPolicy for RandomReview {
    fn needs_revision(&self) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen::<f64>() < self.probability
    }
}

/// Always returns the same verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedReview {
    revise: bool,
}

impl FixedReview {
    pub fn approve() -> Self {
        Self { revise: false }
    }

    pub fn revise() -> Self {
        Self { revise: true }
    }
}

impl ReviewPolicy for FixedReview {
    fn needs_revision(&self) -> bool {
        self.revise
    }
}
