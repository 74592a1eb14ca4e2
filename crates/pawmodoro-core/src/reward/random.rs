//! Injectable randomness for reward rolls.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;

/// Uniform samples in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

/// Unseeded generator backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible generator for simulations and tests.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: Mcg128Xsl64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mcg128Xsl64::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of samples, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    next: usize,
}

impl ScriptedRandom {
    /// Values are clamped into `[0, 1)`; an empty script always yields `0.0`.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            next: 0,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.next % self.values.len()];
        self.next += 1;
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}
