//! Card definitions.
//!
//! A `CardDefinition` is an immutable catalog record: base stats plus the
//! ordered effect clauses, with a precomputed set of the event kinds the
//! card needs to listen for while it is on the field. Instances reference
//! definitions by id and never copy them.

use serde::{Deserialize, Serialize};

use crate::bus::EventKind;

use super::clause::EffectClause;

/// Identifier of a card definition in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// The three playable card types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Follower,
    Spell,
    Amulet,
}

/// Reference from one clause to another card definition.
///
/// Raw catalog data refers to cards by name; the catalog's resolution pass
/// replaces every `Named` reference with a `Resolved` id. A `Named` value
/// surviving past load marks a misconfigured clause.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardRef {
    Named(String),
    Resolved(CardId),
}

impl CardRef {
    /// The resolved id, if resolution has happened.
    #[must_use]
    pub fn resolved(&self) -> Option<CardId> {
        match self {
            CardRef::Resolved(id) => Some(*id),
            CardRef::Named(_) => None,
        }
    }
}

/// Immutable description of one card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,
    pub name: String,
    pub card_type: CardType,
    pub cost: i64,
    /// Base attack. Zero for spells and amulets.
    pub attack: i64,
    /// Base defense. Zero for spells and amulets.
    pub defense: i64,
    clauses: Vec<EffectClause>,
    /// Event kinds this card subscribes to while on the field. Derived from
    /// the clauses at construction so field entry never has to scan them.
    listen_kinds: Vec<EventKind>,
}

impl CardDefinition {
    /// Create a follower definition.
    #[must_use]
    pub fn follower(
        id: CardId,
        name: impl Into<String>,
        cost: i64,
        attack: i64,
        defense: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            card_type: CardType::Follower,
            cost,
            attack,
            defense,
            clauses: Vec::new(),
            listen_kinds: Vec::new(),
        }
    }

    /// Create a spell definition.
    #[must_use]
    pub fn spell(id: CardId, name: impl Into<String>, cost: i64) -> Self {
        Self {
            id,
            name: name.into(),
            card_type: CardType::Spell,
            cost,
            attack: 0,
            defense: 0,
            clauses: Vec::new(),
            listen_kinds: Vec::new(),
        }
    }

    /// Create an amulet definition.
    #[must_use]
    pub fn amulet(id: CardId, name: impl Into<String>, cost: i64) -> Self {
        Self {
            id,
            name: name.into(),
            card_type: CardType::Amulet,
            cost,
            attack: 0,
            defense: 0,
            clauses: Vec::new(),
            listen_kinds: Vec::new(),
        }
    }

    /// Append an effect clause, updating the listen-kind set.
    #[must_use]
    pub fn with_clause(mut self, clause: EffectClause) -> Self {
        if let Some(kind) = clause.trigger.listen_kind() {
            if !self.listen_kinds.contains(&kind) {
                self.listen_kinds.push(kind);
            }
        }
        self.clauses.push(clause);
        self
    }

    /// The ordered effect clauses.
    #[must_use]
    pub fn clauses(&self) -> &[EffectClause] {
        &self.clauses
    }

    /// Event kinds the card needs while on the field.
    #[must_use]
    pub fn listen_kinds(&self) -> &[EventKind] {
        &self.listen_kinds
    }

    pub(crate) fn clauses_mut(&mut self) -> &mut Vec<EffectClause> {
        &mut self.clauses
    }
}
