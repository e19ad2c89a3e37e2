//! Game events.
//!
//! Events are transient tagged variants carrying correlation ids and a
//! minimal payload. They exist only inside the bus queue; nothing stores
//! them after the drain that consumed them.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

/// Discriminant for [`GameEvent`], used to index the listener registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    TurnStart,
    TurnEnd,
    CardPlayed,
    SpellCast,
    FollowerEnterField,
    FollowerEvolved,
    FollowerSuperEvolved,
    AmuletActivated,
    AttackDeclared,
    CombatInitiated,
    DamageDealtByCombat,
    Destroyed,
}

/// A single game event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    TurnStart {
        player: PlayerId,
        turn: u32,
    },
    TurnEnd {
        player: PlayerId,
        turn: u32,
    },
    /// A card was played from hand. `paid_cost` is what was actually spent,
    /// which exceeds the base cost when the play was enhanced.
    CardPlayed {
        card: EntityId,
        player: PlayerId,
        paid_cost: i64,
    },
    SpellCast {
        card: EntityId,
        player: PlayerId,
    },
    FollowerEnterField {
        card: EntityId,
        player: PlayerId,
    },
    FollowerEvolved {
        card: EntityId,
        player: PlayerId,
        spent_ep: bool,
    },
    FollowerSuperEvolved {
        card: EntityId,
        player: PlayerId,
        spent_sep: bool,
    },
    AmuletActivated {
        card: EntityId,
        player: PlayerId,
    },
    AttackDeclared {
        attacker: EntityId,
        target: EntityId,
        player: PlayerId,
    },
    CombatInitiated {
        attacker: EntityId,
        target: EntityId,
    },
    DamageDealtByCombat {
        source: EntityId,
        target: EntityId,
        amount: i64,
    },
    Destroyed {
        card: EntityId,
        player: PlayerId,
    },
}

impl GameEvent {
    /// The registry key for this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::TurnStart { .. } => EventKind::TurnStart,
            GameEvent::TurnEnd { .. } => EventKind::TurnEnd,
            GameEvent::CardPlayed { .. } => EventKind::CardPlayed,
            GameEvent::SpellCast { .. } => EventKind::SpellCast,
            GameEvent::FollowerEnterField { .. } => EventKind::FollowerEnterField,
            GameEvent::FollowerEvolved { .. } => EventKind::FollowerEvolved,
            GameEvent::FollowerSuperEvolved { .. } => EventKind::FollowerSuperEvolved,
            GameEvent::AmuletActivated { .. } => EventKind::AmuletActivated,
            GameEvent::AttackDeclared { .. } => EventKind::AttackDeclared,
            GameEvent::CombatInitiated { .. } => EventKind::CombatInitiated,
            GameEvent::DamageDealtByCombat { .. } => EventKind::DamageDealtByCombat,
            GameEvent::Destroyed { .. } => EventKind::Destroyed,
        }
    }

    /// The card this event is principally about, if any.
    #[must_use]
    pub fn subject(&self) -> Option<EntityId> {
        match self {
            GameEvent::CardPlayed { card, .. }
            | GameEvent::SpellCast { card, .. }
            | GameEvent::FollowerEnterField { card, .. }
            | GameEvent::FollowerEvolved { card, .. }
            | GameEvent::FollowerSuperEvolved { card, .. }
            | GameEvent::AmuletActivated { card, .. }
            | GameEvent::Destroyed { card, .. } => Some(*card),
            GameEvent::AttackDeclared { attacker, .. }
            | GameEvent::CombatInitiated { attacker, .. }
            | GameEvent::DamageDealtByCombat {
                source: attacker, ..
            } => Some(*attacker),
            GameEvent::TurnStart { .. } | GameEvent::TurnEnd { .. } => None,
        }
    }

    /// The player this event belongs to, if any.
    #[must_use]
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            GameEvent::TurnStart { player, .. }
            | GameEvent::TurnEnd { player, .. }
            | GameEvent::CardPlayed { player, .. }
            | GameEvent::SpellCast { player, .. }
            | GameEvent::FollowerEnterField { player, .. }
            | GameEvent::FollowerEvolved { player, .. }
            | GameEvent::FollowerSuperEvolved { player, .. }
            | GameEvent::AmuletActivated { player, .. }
            | GameEvent::AttackDeclared { player, .. }
            | GameEvent::Destroyed { player, .. } => Some(*player),
            GameEvent::CombatInitiated { .. } | GameEvent::DamageDealtByCombat { .. } => None,
        }
    }
}
