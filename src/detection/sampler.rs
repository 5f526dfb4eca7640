use std::collections::VecDeque;
use std::sync::Mutex;

use rand::Rng;

/// Source of per-tick detection samples.
///
/// Kept behind a trait so tests can feed deterministic sequences instead of
/// real randomness.
pub trait SignalSampler: Send + Sync {
    /// Uniform value in `[0, 1)`, independent per call.
    fn sample(&self) -> f64;
}

/// Production sampler backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSampler;

impl SignalSampler for ThreadRngSampler {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Replays a scripted sequence of samples, then returns a fixed fallback.
///
/// The default fallback of 1.0 is never below any detection probability, so
/// an exhausted sampler stops triggering anything.
pub struct SequenceSampler {
    samples: Mutex<VecDeque<f64>>,
    fallback: f64,
}

impl SequenceSampler {
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        Self {
            samples: Mutex::new(samples.into_iter().collect()),
            fallback: 1.0,
        }
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    /// Sampler that always returns the same value.
    pub fn constant(value: f64) -> Self {
        Self::new([]).with_fallback(value)
    }
}

impl SignalSampler for SequenceSampler {
    fn sample(&self) -> f64 {
        let mut guard = match self.samples.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.pop_front().unwrap_or(self.fallback)
    }
}
