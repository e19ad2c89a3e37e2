//! The event bus: FIFO queue plus listener registry.
//!
//! The bus owns the pending-event queue and the registered listeners, but
//! not the drain loop: listener reactions mutate game state, so the
//! orchestrator pops events and asks the bus for the matching listeners
//! (cloned, in registration order) before running each reaction. Reactions
//! published mid-drain append to the same queue, giving breadth-first
//! ordering.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;

use crate::cards::EffectClause;
use crate::core::{EntityId, PlayerId};

use super::event::{EventKind, GameEvent};

/// Identifier of a registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

/// Per-event predicate deciding whether a listener fires.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListenerCondition {
    /// Fire on every event of the kind.
    Always,
    /// Fire when the event's principal card is this card.
    Subject(EntityId),
    /// Fire when this card is the attacker or the defender.
    Combatant(EntityId),
    /// Fire when this card is the attack or damage source.
    Source(EntityId),
    /// Fire when the event belongs to this player.
    ForPlayer(PlayerId),
    /// Enhance gate: the card was played paying at least this much.
    SubjectPaidAtLeast { card: EntityId, at_least: i64 },
    /// Fire when this card evolved by spending an evolution point.
    SubjectSpentEp(EntityId),
}

impl ListenerCondition {
    /// Evaluate against an event of the listener's kind.
    #[must_use]
    pub fn matches(&self, event: &GameEvent) -> bool {
        match self {
            ListenerCondition::Always => true,
            ListenerCondition::Subject(card) => event.subject() == Some(*card),
            ListenerCondition::Combatant(card) => match event {
                GameEvent::AttackDeclared {
                    attacker, target, ..
                }
                | GameEvent::CombatInitiated { attacker, target } => {
                    attacker == card || target == card
                }
                _ => false,
            },
            ListenerCondition::Source(card) => match event {
                GameEvent::AttackDeclared { attacker, .. } => attacker == card,
                GameEvent::DamageDealtByCombat { source, .. } => source == card,
                _ => false,
            },
            ListenerCondition::ForPlayer(player) => event.player() == Some(*player),
            ListenerCondition::SubjectPaidAtLeast { card, at_least } => match event {
                GameEvent::CardPlayed {
                    card: played,
                    paid_cost,
                    ..
                } => played == card && paid_cost >= at_least,
                _ => false,
            },
            ListenerCondition::SubjectSpentEp(card) => match event {
                GameEvent::FollowerEvolved {
                    card: evolved,
                    spent_ep,
                    ..
                } => evolved == card && *spent_ep,
                _ => false,
            },
        }
    }
}

/// What a listener does when it fires. Interpreted by the orchestrator's
/// drain loop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reaction {
    /// Resolve one of the owning card's clauses.
    ResolveClause {
        clause: EffectClause,
        caster: EntityId,
    },
    /// Tick countdown amulets on this player's field at their turn start.
    TurnStartUpkeep { player: PlayerId },
    /// Run this player's field cards' turn-end clauses, own or opponent's
    /// depending on whose turn is ending.
    TurnEndClauses { player: PlayerId },
    /// Run on-follower-enter-field clauses for this player's field.
    EnterFieldClauses { player: PlayerId },
    /// Resolve the first matching evolution clause after a super-evolve.
    SuperEvolvedCascade { card: EntityId },
    /// Heal the card owner's leader by the combat damage this card dealt.
    Drain { card: EntityId },
}

/// A registered listener.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listener {
    pub id: ListenerId,
    pub kind: EventKind,
    /// Owning card, for lifecycle cleanup when it leaves the field.
    pub card: Option<EntityId>,
    /// Owning player, for the ref-counted player-scoped listeners.
    pub player: Option<PlayerId>,
    pub condition: ListenerCondition,
    pub reaction: Reaction,
}

impl Listener {
    /// Build a listener; the id is assigned by `EventBus::subscribe`.
    #[must_use]
    pub fn new(kind: EventKind, condition: ListenerCondition, reaction: Reaction) -> Self {
        Self {
            id: ListenerId(0),
            kind,
            card: None,
            player: None,
            condition,
            reaction,
        }
    }

    /// Mark the card whose field presence owns this listener.
    #[must_use]
    pub fn owned_by_card(mut self, card: EntityId) -> Self {
        self.card = Some(card);
        self
    }

    /// Mark the player owning this listener.
    #[must_use]
    pub fn owned_by_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }
}

/// FIFO event queue plus listener registry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventBus {
    queue: VecDeque<GameEvent>,
    listeners: FxHashMap<ListenerId, Listener>,
    /// Listener ids per event kind, in registration order.
    by_kind: FxHashMap<EventKind, Vec<ListenerId>>,
    next_id: u64,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to the queue.
    pub fn publish(&mut self, event: GameEvent) {
        self.queue.push_back(event);
    }

    /// Pop the oldest queued event.
    pub fn pop(&mut self) -> Option<GameEvent> {
        self.queue.pop_front()
    }

    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Register a listener, assigning its id.
    pub fn subscribe(&mut self, mut listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        listener.id = id;
        self.by_kind.entry(listener.kind).or_default().push(id);
        self.listeners.insert(id, listener);
        id
    }

    /// Remove a listener. Removing an absent id is a no-op.
    pub fn unsubscribe(&mut self, id: ListenerId) {
        if let Some(listener) = self.listeners.remove(&id) {
            if let Some(ids) = self.by_kind.get_mut(&listener.kind) {
                ids.retain(|&l| l != id);
            }
        }
    }

    /// Remove every listener owned by a card.
    pub fn remove_for_card(&mut self, card: EntityId) {
        let ids: Vec<ListenerId> = self
            .listeners
            .values()
            .filter(|l| l.card == Some(card))
            .map(|l| l.id)
            .collect();
        for id in ids {
            self.unsubscribe(id);
        }
    }

    /// Whether any listener is owned by the given card.
    #[must_use]
    pub fn has_listeners_for_card(&self, card: EntityId) -> bool {
        self.listeners.values().any(|l| l.card == Some(card))
    }

    /// Listeners that fire for this event: kind match plus condition, in
    /// registration order. Cloned out so reactions can mutate game state
    /// (and the registry itself) while iterating.
    #[must_use]
    pub fn matching(&self, event: &GameEvent) -> SmallVec<[Listener; 4]> {
        let Some(ids) = self.by_kind.get(&event.kind()) else {
            return SmallVec::new();
        };
        ids.iter()
            .filter_map(|id| self.listeners.get(id))
            .filter(|l| l.condition.matches(event))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn_start(player: PlayerId) -> GameEvent {
        GameEvent::TurnStart { player, turn: 1 }
    }

    fn upkeep_listener(player: PlayerId) -> Listener {
        Listener::new(
            EventKind::TurnStart,
            ListenerCondition::ForPlayer(player),
            Reaction::TurnStartUpkeep { player },
        )
        .owned_by_player(player)
    }

    #[test]
    fn test_fifo_queue() {
        let mut bus = EventBus::new();
        bus.publish(turn_start(PlayerId::FIRST));
        bus.publish(GameEvent::TurnEnd {
            player: PlayerId::FIRST,
            turn: 1,
        });

        assert_eq!(bus.pop().map(|e| e.kind()), Some(EventKind::TurnStart));
        assert_eq!(bus.pop().map(|e| e.kind()), Some(EventKind::TurnEnd));
        assert_eq!(bus.pop(), None);
    }

    #[test]
    fn test_matching_respects_condition() {
        let mut bus = EventBus::new();
        bus.subscribe(upkeep_listener(PlayerId::FIRST));
        bus.subscribe(upkeep_listener(PlayerId::SECOND));

        let hits = bus.matching(&turn_start(PlayerId::FIRST));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].player, Some(PlayerId::FIRST));
    }

    #[test]
    fn test_matching_preserves_registration_order() {
        let mut bus = EventBus::new();
        let a = bus.subscribe(upkeep_listener(PlayerId::FIRST));
        let b = bus.subscribe(upkeep_listener(PlayerId::FIRST));

        let hits = bus.matching(&turn_start(PlayerId::FIRST));
        assert_eq!(hits.iter().map(|l| l.id).collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_unsubscribe_absent_is_noop() {
        let mut bus = EventBus::new();
        bus.unsubscribe(ListenerId(99));
        let id = bus.subscribe(upkeep_listener(PlayerId::FIRST));
        bus.unsubscribe(id);
        bus.unsubscribe(id);
        assert!(bus.matching(&turn_start(PlayerId::FIRST)).is_empty());
    }

    #[test]
    fn test_remove_for_card() {
        let mut bus = EventBus::new();
        let card = EntityId(5);
        bus.subscribe(
            Listener::new(
                EventKind::CombatInitiated,
                ListenerCondition::Combatant(card),
                Reaction::Drain { card },
            )
            .owned_by_card(card),
        );
        bus.subscribe(upkeep_listener(PlayerId::FIRST));

        assert!(bus.has_listeners_for_card(card));
        bus.remove_for_card(card);
        assert!(!bus.has_listeners_for_card(card));
        // Player-scoped listener untouched.
        assert_eq!(bus.matching(&turn_start(PlayerId::FIRST)).len(), 1);
    }

    #[test]
    fn test_subject_paid_at_least() {
        let cond = ListenerCondition::SubjectPaidAtLeast {
            card: EntityId(7),
            at_least: 5,
        };
        let cheap = GameEvent::CardPlayed {
            card: EntityId(7),
            player: PlayerId::FIRST,
            paid_cost: 3,
        };
        let enhanced = GameEvent::CardPlayed {
            card: EntityId(7),
            player: PlayerId::FIRST,
            paid_cost: 5,
        };
        assert!(!cond.matches(&cheap));
        assert!(cond.matches(&enhanced));
    }
}
