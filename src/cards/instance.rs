//! Card instances.
//!
//! A `CardInstance` is the runtime state of one card: mutable stats, status
//! flags, and its own copy of the definition's clause list so keyword grants
//! and removals affect only this copy. A card occupies exactly one zone at a
//! time, tracked here and mirrored by the zone containers.

use serde::{Deserialize, Serialize};

use crate::bus::EventKind;
use crate::core::{EntityId, PlayerId, ZoneKind};

use super::clause::{EffectClause, TriggerKind};
use super::definition::{CardDefinition, CardId, CardType};

/// Stat bonus granted by evolution.
pub const EVOLVE_BONUS: i64 = 2;
/// Stat bonus granted by super-evolution.
pub const SUPER_EVOLVE_BONUS: i64 = 3;

/// Runtime state of a single card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    pub entity_id: EntityId,
    pub card_id: CardId,
    pub owner: PlayerId,
    pub card_type: CardType,
    pub cost: i64,
    pub attack: i64,
    pub defense: i64,
    pub max_defense: i64,
    /// The zone currently holding this card, if any. `None` only during a
    /// zone transition.
    pub zone: Option<ZoneKind>,
    pub evolved: bool,
    pub super_evolved: bool,
    /// Attacked this turn.
    pub engaged: bool,
    pub summoned_this_turn: bool,
    /// Amulet activated this turn.
    pub activated: bool,
    /// A Destroyed event for this card is already in flight.
    pub doomed: bool,
    /// Remaining countdown turns, for countdown amulets on the field.
    pub countdown: Option<i64>,
    clauses: Vec<EffectClause>,
    /// Event kinds the card subscribes to while on the field. Seeded from
    /// the definition's precomputed set and kept in step with the clause
    /// list as runtime grants and removals mutate it.
    listen_kinds: Vec<EventKind>,
}

fn derive_listen_kinds(clauses: &[EffectClause]) -> Vec<EventKind> {
    let mut kinds = Vec::new();
    for clause in clauses {
        if let Some(kind) = clause.trigger.listen_kind() {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
    }
    kinds
}

impl CardInstance {
    /// Instantiate a card from its definition.
    #[must_use]
    pub fn from_definition(
        entity_id: EntityId,
        definition: &CardDefinition,
        owner: PlayerId,
    ) -> Self {
        Self {
            entity_id,
            card_id: definition.id,
            owner,
            card_type: definition.card_type,
            cost: definition.cost,
            attack: definition.attack,
            defense: definition.defense,
            max_defense: definition.defense,
            zone: None,
            evolved: false,
            super_evolved: false,
            engaged: false,
            summoned_this_turn: false,
            activated: false,
            doomed: false,
            countdown: None,
            clauses: definition.clauses().to_vec(),
            listen_kinds: definition.listen_kinds().to_vec(),
        }
    }

    #[must_use]
    pub fn is_follower(&self) -> bool {
        self.card_type == CardType::Follower
    }

    #[must_use]
    pub fn is_amulet(&self) -> bool {
        self.card_type == CardType::Amulet
    }

    #[must_use]
    pub fn on_field(&self) -> bool {
        self.zone == Some(ZoneKind::Field)
    }

    /// The card's current clause list.
    #[must_use]
    pub fn clauses(&self) -> &[EffectClause] {
        &self.clauses
    }

    /// Clauses with the given trigger kind, in clause order.
    pub fn clauses_with(&self, trigger: TriggerKind) -> impl Iterator<Item = &EffectClause> {
        self.clauses.iter().filter(move |c| c.trigger == trigger)
    }

    /// Whether the card currently carries a passive keyword.
    #[must_use]
    pub fn has_keyword(&self, kind: TriggerKind) -> bool {
        self.clauses.iter().any(|c| c.is_keyword(kind))
    }

    /// Event kinds the card needs subscriptions for while on the field.
    #[must_use]
    pub fn listen_kinds(&self) -> &[EventKind] {
        &self.listen_kinds
    }

    /// Grant an additional clause at runtime.
    pub fn add_clause(&mut self, clause: EffectClause) {
        if let Some(kind) = clause.trigger.listen_kind() {
            if !self.listen_kinds.contains(&kind) {
                self.listen_kinds.push(kind);
            }
        }
        self.clauses.push(clause);
    }

    /// Strip every clause of the given keyword. Returns whether any was
    /// removed.
    pub fn remove_keyword(&mut self, kind: TriggerKind) -> bool {
        let before = self.clauses.len();
        self.clauses.retain(|c| !c.is_keyword(kind));
        let removed = self.clauses.len() != before;
        if removed {
            self.listen_kinds = derive_listen_kinds(&self.clauses);
        }
        removed
    }

    /// Apply the evolution stat bonus and mark the card evolved.
    pub fn evolve(&mut self) {
        self.evolved = true;
        self.attack += EVOLVE_BONUS;
        self.defense += EVOLVE_BONUS;
        self.max_defense += EVOLVE_BONUS;
    }

    /// Apply the super-evolution stat bonus. A super-evolved card also
    /// counts as evolved.
    pub fn super_evolve(&mut self) {
        self.evolved = true;
        self.super_evolved = true;
        self.attack += SUPER_EVOLVE_BONUS;
        self.defense += SUPER_EVOLVE_BONUS;
        self.max_defense += SUPER_EVOLVE_BONUS;
    }

    /// Reset the per-turn combat flags at the owner's turn start.
    pub fn refresh_for_turn(&mut self) {
        self.engaged = false;
        self.summoned_this_turn = false;
        self.activated = false;
    }

    /// Reset stats and status back to the definition's baseline, keeping
    /// identity and ownership. Used when a card returns to hand or deck.
    pub fn reset_to_definition(&mut self, definition: &CardDefinition) {
        self.cost = definition.cost;
        self.attack = definition.attack;
        self.defense = definition.defense;
        self.max_defense = definition.defense;
        self.evolved = false;
        self.super_evolved = false;
        self.engaged = false;
        self.summoned_this_turn = false;
        self.activated = false;
        self.doomed = false;
        self.countdown = None;
        self.clauses = definition.clauses().to_vec();
        self.listen_kinds = definition.listen_kinds().to_vec();
    }
}
