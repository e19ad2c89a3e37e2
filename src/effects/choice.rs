//! The external choice channel.
//!
//! Choice-style targeting asks the presentation layer to pick among
//! candidates. The engine calls the handler synchronously; the handler may
//! be a UI bridge, a scripted test stub, or the default random picker.

use crate::core::{EntityId, GameRng};

/// Supplier of player decisions for choice-style targeting.
pub trait ChoiceHandler {
    /// Pick `count` distinct entries from `candidates`, in pick order.
    /// Returning fewer than `count` picks makes the clause fizzle.
    fn choose_targets(&mut self, candidates: &[EntityId], count: usize) -> Vec<EntityId>;
}

/// Default handler: uniform random picks from its own seeded RNG, so games
/// without an interactive chooser stay reproducible.
#[derive(Clone, Debug)]
pub struct RandomChoice {
    rng: GameRng,
}

impl RandomChoice {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
        }
    }
}

impl ChoiceHandler for RandomChoice {
    fn choose_targets(&mut self, candidates: &[EntityId], count: usize) -> Vec<EntityId> {
        if candidates.len() < count {
            return Vec::new();
        }
        let mut pool: Vec<EntityId> = candidates.to_vec();
        self.rng.shuffle(&mut pool);
        pool.truncate(count);
        pool
    }
}

/// Test helper: always picks the first `count` candidates.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstChoice;

impl ChoiceHandler for FirstChoice {
    fn choose_targets(&mut self, candidates: &[EntityId], count: usize) -> Vec<EntityId> {
        if candidates.len() < count {
            return Vec::new();
        }
        candidates[..count].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_choice_is_deterministic() {
        let candidates: Vec<EntityId> = (2..10).map(EntityId).collect();
        let mut a = RandomChoice::new(42);
        let mut b = RandomChoice::new(42);
        assert_eq!(
            a.choose_targets(&candidates, 2),
            b.choose_targets(&candidates, 2)
        );
    }

    #[test]
    fn test_insufficient_candidates_fizzle() {
        let candidates = vec![EntityId(2)];
        let mut handler = RandomChoice::new(1);
        assert!(handler.choose_targets(&candidates, 2).is_empty());
    }

    #[test]
    fn test_first_choice() {
        let candidates = vec![EntityId(2), EntityId(3), EntityId(4)];
        let mut handler = FirstChoice;
        assert_eq!(
            handler.choose_targets(&candidates, 2),
            vec![EntityId(2), EntityId(3)]
        );
    }
}
