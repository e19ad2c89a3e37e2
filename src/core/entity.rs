//! Entity identification.
//!
//! Every game object (the two leaders and every card instance) has a unique
//! `EntityId`.
//!
//! ## ID Layout
//!
//! - `0..2`: reserved for the two players (a player's entity id doubles as
//!   its leader target id)
//! - `2..`: card instances, allocated by the game state
//!
//! ```
//! use duelcore::core::{EntityId, PlayerId};
//!
//! let leader = EntityId::player(PlayerId::FIRST);
//! assert!(leader.is_player());
//!
//! let card = EntityId(7);
//! assert!(!card.is_player());
//! assert_eq!(card.as_player(), None);
//! ```

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Number of players in a game. The simulation is strictly two-player.
pub const PLAYER_COUNT: usize = 2;

/// Unique identifier for any game entity.
///
/// Leaders and card instances share one id space so that combat and effect
/// targets can refer to either uniformly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Entity id of a player's leader.
    #[must_use]
    pub const fn player(id: PlayerId) -> Self {
        Self(id.0 as u32)
    }

    /// First id available for card instances.
    #[must_use]
    pub const fn first_card() -> u32 {
        PLAYER_COUNT as u32
    }

    /// Whether this id refers to a player's leader.
    #[must_use]
    pub const fn is_player(self) -> bool {
        self.0 < PLAYER_COUNT as u32
    }

    /// Convert to a `PlayerId` if this is a leader entity.
    #[must_use]
    pub const fn as_player(self) -> Option<PlayerId> {
        if self.is_player() {
            Some(PlayerId(self.0 as u8))
        } else {
            None
        }
    }

    /// The raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leader_ids() {
        assert!(EntityId::player(PlayerId::FIRST).is_player());
        assert!(EntityId::player(PlayerId::SECOND).is_player());
        assert!(!EntityId(2).is_player());
        assert!(!EntityId(100).is_player());
    }

    #[test]
    fn test_as_player() {
        assert_eq!(EntityId(0).as_player(), Some(PlayerId::FIRST));
        assert_eq!(EntityId(1).as_player(), Some(PlayerId::SECOND));
        assert_eq!(EntityId(2).as_player(), None);
    }

    #[test]
    fn test_first_card() {
        assert_eq!(EntityId::first_card(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", EntityId(42)), "Entity(42)");
    }

    #[test]
    fn test_serialization() {
        let id = EntityId(123);
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
