//! Injectable net-KPI jitter sources.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the per-tick fractional net adjustment.
pub trait Jitter: Send {
    /// A delta in `[-0.01, 0.01]` (±1% of the current net).
    fn delta(&mut self) -> f64;
}

/// Real-entropy jitter for production wiring.
#[derive(Debug, Default)]
pub struct RandomJitter;

impl Jitter for RandomJitter {
    fn delta(&mut self) -> f64 {
        (rand::thread_rng().r#gen::<f64>() - 0.5) * 0.02
    }
}

/// Seeded jitter; same seed, same tick sequence.
#[derive(Debug)]
pub struct SeededJitter {
    rng: StdRng,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Jitter for SeededJitter {
    fn delta(&mut self) -> f64 {
        (self.rng.r#gen::<f64>() - 0.5) * 0.02
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_jitter_is_reproducible() {
        let mut a = SeededJitter::new(42);
        let mut b = SeededJitter::new(42);
        for _ in 0..10 {
            assert_eq!(a.delta(), b.delta());
        }
    }

    #[test]
    fn deltas_stay_within_one_percent() {
        let mut j = SeededJitter::new(7);
        for _ in 0..1000 {
            let d = j.delta();
            assert!((-0.01..=0.01).contains(&d), "delta out of range: {d}");
        }
    }
}
