//! Injectable randomness so peer sampling and request-id generation are
//! deterministic in tests.

use rand::{seq::SliceRandom, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Mutex;

/// A source of randomness, injected into the Updater (peer sampling) and the
/// Dispatcher (request ids).
pub trait EntropySource: Send + Sync + 'static {
    /// A fresh 64-bit id, e.g. for a JSON-RPC request id or message id.
    fn next_u64(&self) -> u64;

    /// Choose up to `n` indices out of `0..len`, without replacement, in a
    /// uniformly random order.
    fn sample_indices(&self, len: usize, n: usize) -> Vec<usize>;
}

/// Real randomness, backed by the thread-local CSPRNG.
#[derive(Debug, Default)]
pub struct StdEntropy;

impl EntropySource for StdEntropy {
    fn next_u64(&self) -> u64 {
        rand::thread_rng().next_u64()
    }

    fn sample_indices(&self, len: usize, n: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..len).collect();
        indices.shuffle(&mut rand::thread_rng());
        indices.truncate(n);
        indices
    }
}

/// A seeded, reproducible entropy source for tests.
pub struct DeterministicEntropy {
    rng: Mutex<ChaCha8Rng>,
}

impl DeterministicEntropy {
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)) }
    }
}

impl EntropySource for DeterministicEntropy {
    fn next_u64(&self) -> u64 {
        self.rng.lock().expect("entropy lock poisoned").next_u64()
    }

    fn sample_indices(&self, len: usize, n: usize) -> Vec<usize> {
        let mut rng = self.rng.lock().expect("entropy lock poisoned");
        let mut indices: Vec<usize> = (0..len).collect();
        indices.shuffle(&mut *rng);
        indices.truncate(n);
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_entropy_is_reproducible() {
        let a = DeterministicEntropy::new(7);
        let b = DeterministicEntropy::new(7);
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn sample_indices_caps_at_n() {
        let e = DeterministicEntropy::new(1);
        let sample = e.sample_indices(10, 3);
        assert_eq!(sample.len(), 3);
        let unique: std::collections::HashSet<_> = sample.iter().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn sample_indices_returns_all_when_n_exceeds_len() {
        let e = DeterministicEntropy::new(2);
        let sample = e.sample_indices(4, 10);
        assert_eq!(sample.len(), 4);
    }
}
