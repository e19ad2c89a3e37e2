//! Player identification and per-player records.
//!
//! ## PlayerId / PlayerPair
//!
//! Type-safe player identifier for the two seats, plus `PlayerPair<T>`, a
//! fixed-size per-player container indexable by `PlayerId`.
//!
//! ## Player
//!
//! The mutable per-player record: leader stats and the turn resource pools.
//! Every pool is clamped to `[0, max]` by its gain/spend operations.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Leader starting (and default maximum) defense.
pub const LEADER_STARTING_DEFENSE: i64 = 20;
/// Hard cap on max play points.
pub const MAX_PP_CAP: i64 = 10;
/// Evolution point pool cap.
pub const MAX_EP: i64 = 2;
/// Super-evolution point pool cap.
pub const MAX_SEP: i64 = 2;
/// Extra play point pool cap.
pub const MAX_EXTRA_PP: i64 = 1;

/// One of the two seats. The first player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// The player who takes the first turn.
    pub const FIRST: PlayerId = PlayerId(0);
    /// The player who takes the second turn.
    pub const SECOND: PlayerId = PlayerId(1);

    /// The other seat.
    #[must_use]
    pub const fn opponent(self) -> PlayerId {
        PlayerId(1 - self.0)
    }

    /// Raw 0-based index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over both seats, first player first.
    pub fn both() -> impl Iterator<Item = PlayerId> {
        [PlayerId::FIRST, PlayerId::SECOND].into_iter()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player storage with O(1) access, indexable by `PlayerId`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPair<T> {
    data: [T; 2],
}

impl<T> PlayerPair<T> {
    /// Create a pair from a factory receiving each `PlayerId`.
    pub fn new(factory: impl Fn(PlayerId) -> T) -> Self {
        Self {
            data: [factory(PlayerId::FIRST), factory(PlayerId::SECOND)],
        }
    }

    /// Create a pair with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Reference to one seat's entry.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// Mutable reference to one seat's entry.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over `(PlayerId, &T)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }
}

impl<T> Index<PlayerId> for PlayerPair<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerPair<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

impl<T: Default> Default for PlayerPair<T> {
    fn default() -> Self {
        Self::new(|_| T::default())
    }
}

/// Mutable per-player record: leader stats and resource pools.
///
/// PP gates card play, EP evolution, SEP super-evolution. Extra PP is a
/// one-point reserve that can top up a PP payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub leader_defense: i64,
    pub leader_max_defense: i64,
    pub pp: i64,
    pub max_pp: i64,
    pub ep: i64,
    pub sep: i64,
    pub extra_pp: i64,
    pub spent_ep_this_turn: bool,
    pub spent_sep_this_turn: bool,
    /// Set when a draw found no eligible card. Checked at outcome time.
    pub pending_loss: bool,
}

impl Player {
    /// A fresh player record at game start.
    #[must_use]
    pub fn new() -> Self {
        Self {
            leader_defense: LEADER_STARTING_DEFENSE,
            leader_max_defense: LEADER_STARTING_DEFENSE,
            pp: 0,
            max_pp: 0,
            ep: 0,
            sep: 0,
            extra_pp: 0,
            spent_ep_this_turn: false,
            spent_sep_this_turn: false,
            pending_loss: false,
        }
    }

    /// Raise max PP by one, capped, and refill current PP.
    pub fn ramp_and_refill_pp(&mut self) {
        self.max_pp = (self.max_pp + 1).min(MAX_PP_CAP);
        self.pp = self.max_pp;
    }

    /// Recover current PP, clamped to max.
    pub fn recover_pp(&mut self, amount: i64) {
        self.pp = (self.pp + amount.max(0)).min(self.max_pp);
    }

    /// Gain evolution points, clamped.
    pub fn gain_ep(&mut self, amount: i64) {
        self.ep = (self.ep + amount.max(0)).min(MAX_EP);
    }

    /// Gain super-evolution points, clamped.
    pub fn gain_sep(&mut self, amount: i64) {
        self.sep = (self.sep + amount.max(0)).min(MAX_SEP);
    }

    /// Gain extra PP, clamped.
    pub fn gain_extra_pp(&mut self, amount: i64) {
        self.extra_pp = (self.extra_pp + amount.max(0)).min(MAX_EXTRA_PP);
    }

    /// Whether a cost is payable, optionally counting one extra-PP point.
    #[must_use]
    pub fn can_pay(&self, cost: i64, use_extra_pp: bool) -> bool {
        let extra = if use_extra_pp && self.extra_pp > 0 { 1 } else { 0 };
        self.pp + extra >= cost
    }

    /// Pay a cost. With `use_extra_pp`, one extra-PP point covers one PP.
    /// Callers validate affordability first; pools never go negative.
    pub fn spend_pp(&mut self, cost: i64, use_extra_pp: bool) {
        let mut remaining = cost.max(0);
        if use_extra_pp && self.extra_pp > 0 && remaining > 0 {
            self.extra_pp -= 1;
            remaining -= 1;
        }
        self.pp = (self.pp - remaining).max(0);
    }

    /// Spend one evolution point and mark the turn's evolution as used.
    pub fn spend_ep(&mut self) {
        self.ep = (self.ep - 1).max(0);
        self.spent_ep_this_turn = true;
    }

    /// Spend one super-evolution point and mark the turn's evolution as used.
    pub fn spend_sep(&mut self) {
        self.sep = (self.sep - 1).max(0);
        self.spent_sep_this_turn = true;
    }

    /// Damage the leader. Defense may go below zero; that is the terminal
    /// signal the orchestrator checks for.
    pub fn damage_leader(&mut self, amount: i64) {
        self.leader_defense -= amount.max(0);
    }

    /// Heal the leader, clamped to max defense.
    pub fn heal_leader(&mut self, amount: i64) {
        self.leader_defense = (self.leader_defense + amount.max(0)).min(self.leader_max_defense);
    }

    /// Set the leader's max defense, clamping current defense down if needed.
    pub fn set_leader_max_defense(&mut self, amount: i64) {
        self.leader_max_defense = amount;
        self.leader_defense = self.leader_defense.min(amount);
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}
