//! Participant ordering before round one is seeded.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Mutex;

use crate::players::PlayerId;

/// Reorders the participants of a tournament before its bracket is generated
pub trait Shuffler: Send + Sync {
    fn shuffle(&self, participants: &mut [PlayerId]);
}

/// Uniform random order from the thread RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomShuffler;

impl Shuffler for RandomShuffler {
    fn shuffle(&self, participants: &mut [PlayerId]) {
        participants.shuffle(&mut rand::rng());
    }
}

/// Reproducible order from a seeded RNG
///
/// Successive calls continue the same stream, so two tournaments generated
/// through one shuffler get different (but reproducible) orders.
#[derive(Debug)]
pub struct SeededShuffler {
    rng: Mutex<StdRng>,
}

impl SeededShuffler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Shuffler for SeededShuffler {
    fn shuffle(&self, participants: &mut [PlayerId]) {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        participants.shuffle(&mut *rng);
    }
}

/// Keeps enrollment order
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepOrder;

impl Shuffler for KeepOrder {
    fn shuffle(&self, _participants: &mut [PlayerId]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> Vec<PlayerId> {
        (1..=16).collect()
    }

    #[test]
    fn test_keep_order_is_identity() {
        let mut order = ids();
        KeepOrder.shuffle(&mut order);
        assert_eq!(order, ids());
    }

    #[test]
    fn test_seeded_shuffler_is_reproducible() {
        let mut first = ids();
        let mut second = ids();
        SeededShuffler::new(42).shuffle(&mut first);
        SeededShuffler::new(42).shuffle(&mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn test_shufflers_preserve_membership() {
        let shufflers: Vec<Box<dyn Shuffler>> =
            vec![Box::new(RandomShuffler), Box::new(SeededShuffler::new(7))];
        for shuffler in shufflers {
            let mut order = ids();
            shuffler.shuffle(&mut order);
            order.sort_unstable();
            assert_eq!(order, ids());
        }
    }
}
