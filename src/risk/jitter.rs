use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Source of the small random offset added to the base risk score.
pub trait Jitter: Send + Sync {
    fn sample(&self) -> i32;
}

/// Uniform integer in `[-span, span]` from the thread RNG.
#[derive(Debug, Clone, Copy)]
pub struct UniformJitter {
    pub span: i32,
}

impl UniformJitter {
    pub fn new(span: i32) -> Self {
        Self {
            span: span.saturating_abs(),
        }
    }
}

impl Jitter for UniformJitter {
    fn sample(&self) -> i32 {
        rand::thread_rng().gen_range(-self.span..=self.span)
    }
}

/// Uniform jitter from a seeded RNG, reproducible across runs.
#[derive(Debug)]
pub struct SeededJitter {
    span: i32,
    rng: Mutex<StdRng>,
}

impl SeededJitter {
    pub fn new(span: i32, seed: u64) -> Self {
        Self {
            span: span.saturating_abs(),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Jitter for SeededJitter {
    fn sample(&self) -> i32 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(-self.span..=self.span)
    }
}

/// Always the same offset.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub i32);

impl Jitter for FixedJitter {
    fn sample(&self) -> i32 {
        self.0
    }
}

/// `base + jitter`, clamped to the 0..=100 score range.
pub fn compose_score(base: i32, jitter: i32) -> u8 {
    base.saturating_add(jitter).clamp(0, 100) as u8
}
