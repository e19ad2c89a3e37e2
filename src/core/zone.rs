//! Zone containers.
//!
//! Each player owns four ordered zones. Hand and Field are capacity-limited
//! (9 and 5); insertion against a full zone is reported to the caller, which
//! routes the card to the Graveyard instead. A card is in exactly one zone
//! at a time; the owning `CardInstance` records which.

use serde::{Deserialize, Serialize};

use super::EntityId;

/// Maximum number of cards in hand.
pub const MAX_HAND_SIZE: usize = 9;
/// Maximum number of cards on the field.
pub const MAX_FIELD_SIZE: usize = 5;

/// The four per-player zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Deck,
    Hand,
    Field,
    Graveyard,
}

impl ZoneKind {
    /// Capacity limit for this zone kind, if any.
    #[must_use]
    pub const fn capacity(self) -> Option<usize> {
        match self {
            ZoneKind::Hand => Some(MAX_HAND_SIZE),
            ZoneKind::Field => Some(MAX_FIELD_SIZE),
            ZoneKind::Deck | ZoneKind::Graveyard => None,
        }
    }
}

impl std::fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ZoneKind::Deck => "Deck",
            ZoneKind::Hand => "Hand",
            ZoneKind::Field => "Field",
            ZoneKind::Graveyard => "Graveyard",
        };
        write!(f, "{name}")
    }
}

/// One ordered zone. Index 0 is the top of a deck and the leftmost slot of
/// hand and field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    kind: ZoneKind,
    cards: Vec<EntityId>,
}

impl Zone {
    /// Create an empty zone of the given kind.
    #[must_use]
    pub fn new(kind: ZoneKind) -> Self {
        Self {
            kind,
            cards: Vec::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ZoneKind {
        self.kind
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Whether the zone is at its capacity limit.
    #[must_use]
    pub fn is_full(&self) -> bool {
        match self.kind.capacity() {
            Some(cap) => self.cards.len() >= cap,
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, card: EntityId) -> bool {
        self.cards.contains(&card)
    }

    /// The cards in order.
    #[must_use]
    pub fn cards(&self) -> &[EntityId] {
        &self.cards
    }

    /// Append a card at the bottom. Returns `false` (and does not insert)
    /// when the zone is full.
    pub fn push(&mut self, card: EntityId) -> bool {
        if self.is_full() {
            return false;
        }
        self.cards.push(card);
        true
    }

    /// Insert a card on top. Same capacity behavior as `push`.
    pub fn push_top(&mut self, card: EntityId) -> bool {
        if self.is_full() {
            return false;
        }
        self.cards.insert(0, card);
        true
    }

    /// Remove the top card.
    pub fn pop_top(&mut self) -> Option<EntityId> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    /// Remove a specific card. Returns whether it was present.
    pub fn remove(&mut self, card: EntityId) -> bool {
        match self.cards.iter().position(|&c| c == card) {
            Some(idx) => {
                self.cards.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Remove and return every card, emptying the zone.
    pub fn take_all(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.cards)
    }
}

/// A player's four zones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerZones {
    pub deck: Zone,
    pub hand: Zone,
    pub field: Zone,
    pub graveyard: Zone,
}

impl PlayerZones {
    #[must_use]
    pub fn new() -> Self {
        Self {
            deck: Zone::new(ZoneKind::Deck),
            hand: Zone::new(ZoneKind::Hand),
            field: Zone::new(ZoneKind::Field),
            graveyard: Zone::new(ZoneKind::Graveyard),
        }
    }

    #[must_use]
    pub fn zone(&self, kind: ZoneKind) -> &Zone {
        match kind {
            ZoneKind::Deck => &self.deck,
            ZoneKind::Hand => &self.hand,
            ZoneKind::Field => &self.field,
            ZoneKind::Graveyard => &self.graveyard,
        }
    }

    pub fn zone_mut(&mut self, kind: ZoneKind) -> &mut Zone {
        match kind {
            ZoneKind::Deck => &mut self.deck,
            ZoneKind::Hand => &mut self.hand,
            ZoneKind::Field => &mut self.field,
            ZoneKind::Graveyard => &mut self.graveyard,
        }
    }
}

impl Default for PlayerZones {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_limits() {
        assert_eq!(ZoneKind::Hand.capacity(), Some(9));
        assert_eq!(ZoneKind::Field.capacity(), Some(5));
        assert_eq!(ZoneKind::Deck.capacity(), None);
        assert_eq!(ZoneKind::Graveyard.capacity(), None);
    }

    #[test]
    fn test_push_rejects_when_full() {
        let mut field = Zone::new(ZoneKind::Field);
        for i in 0..5 {
            assert!(field.push(EntityId(10 + i)));
        }
        assert!(field.is_full());
        assert!(!field.push(EntityId(99)));
        assert_eq!(field.len(), 5);
    }

    #[test]
    fn test_pop_top_is_fifo_for_decks() {
        let mut deck = Zone::new(ZoneKind::Deck);
        deck.push(EntityId(2));
        deck.push(EntityId(3));
        deck.push_top(EntityId(4));

        assert_eq!(deck.pop_top(), Some(EntityId(4)));
        assert_eq!(deck.pop_top(), Some(EntityId(2)));
        assert_eq!(deck.pop_top(), Some(EntityId(3)));
        assert_eq!(deck.pop_top(), None);
    }

    #[test]
    fn test_remove_specific_card() {
        let mut hand = Zone::new(ZoneKind::Hand);
        hand.push(EntityId(2));
        hand.push(EntityId(3));

        assert!(hand.remove(EntityId(2)));
        assert!(!hand.remove(EntityId(2)));
        assert_eq!(hand.cards(), &[EntityId(3)]);
    }
}
