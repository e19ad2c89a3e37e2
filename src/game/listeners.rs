//! Listener lifecycle management.
//!
//! A card's listeners live exactly as long as the card occupies the field.
//! Card-scoped listeners are subscribed on entry and removed on exit.
//! Player-scoped listeners (turn start, turn end, follower-enters-field)
//! are shared across all of a player's field cards needing the same event
//! kind, tracked here with explicit reference counters so a stale
//! subscription can never outlive its last owner.
//!
//! Registration happens before the entry event drains and removal happens
//! before the departure event drains, so a card never reacts to the event
//! announcing its own departure.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::bus::{EventBus, EventKind, Listener, ListenerCondition, ListenerId, Reaction};
use crate::cards::{EffectClause, TriggerKind};
use crate::core::{EntityId, GameState, PlayerId, PlayerPair, ZoneKind};
use crate::error::GameResult;

/// Reference counts for the shared player-scoped listeners.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ListenerCounters {
    counts: PlayerPair<FxHashMap<EventKind, CountedListener>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct CountedListener {
    count: u32,
    id: ListenerId,
}

impl ListenerCounters {
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: PlayerPair::new(|_| FxHashMap::default()),
        }
    }

    /// Current reference count for one player-scoped event kind.
    #[must_use]
    pub fn count(&self, player: PlayerId, kind: EventKind) -> u32 {
        self.counts[player].get(&kind).map_or(0, |c| c.count)
    }

    fn increment(&mut self, bus: &mut EventBus, player: PlayerId, kind: EventKind) {
        if let Some(entry) = self.counts[player].get_mut(&kind) {
            entry.count += 1;
            return;
        }
        let listener = match kind {
            EventKind::TurnStart => Listener::new(
                kind,
                ListenerCondition::ForPlayer(player),
                Reaction::TurnStartUpkeep { player },
            ),
            EventKind::TurnEnd => Listener::new(
                kind,
                // Both players' turn ends matter: own-turn-end and
                // opponents-turn-end clauses are split by the reaction.
                ListenerCondition::Always,
                Reaction::TurnEndClauses { player },
            ),
            EventKind::FollowerEnterField => Listener::new(
                kind,
                ListenerCondition::ForPlayer(player),
                Reaction::EnterFieldClauses { player },
            ),
            _ => return,
        };
        let id = bus.subscribe(listener.owned_by_player(player));
        self.counts[player].insert(kind, CountedListener { count: 1, id });
    }

    fn decrement(&mut self, bus: &mut EventBus, player: PlayerId, kind: EventKind) {
        let Some(entry) = self.counts[player].get_mut(&kind) else {
            return;
        };
        entry.count = entry.count.saturating_sub(1);
        if entry.count == 0 {
            let id = entry.id;
            self.counts[player].remove(&kind);
            bus.unsubscribe(id);
        }
    }
}

/// Event kinds whose listener is shared per player rather than owned by a
/// single card.
const PLAYER_SCOPED: [EventKind; 3] = [
    EventKind::TurnStart,
    EventKind::TurnEnd,
    EventKind::FollowerEnterField,
];

fn player_scoped(kinds: &[EventKind]) -> impl Iterator<Item = EventKind> + '_ {
    kinds.iter().copied().filter(|kind| PLAYER_SCOPED.contains(kind))
}

/// Subscribe every listener a field card needs, in clause order. The event
/// kind of each subscription comes from [`TriggerKind::listen_kind`]; a card
/// whose precomputed kind set is empty needs no wiring at all.
pub fn register_field_card(
    state: &GameState,
    bus: &mut EventBus,
    counters: &mut ListenerCounters,
    card: EntityId,
) -> GameResult<()> {
    let instance = state.card(card)?;
    if instance.listen_kinds().is_empty() {
        return Ok(());
    }
    let owner = instance.owner;
    let clauses: Vec<EffectClause> = instance.clauses().to_vec();
    let kinds: Vec<EventKind> = instance.listen_kinds().to_vec();

    let mut cascade_registered = false;
    let mut drain_registered = false;

    for clause in &clauses {
        let Some(kind) = clause.trigger.listen_kind() else {
            continue;
        };

        let listener = match clause.trigger {
            TriggerKind::Fanfare | TriggerKind::Enhance => {
                let condition = match clause.enhance_cost {
                    Some(at_least) => ListenerCondition::SubjectPaidAtLeast { card, at_least },
                    None => ListenerCondition::Subject(card),
                };
                Some(Listener::new(
                    kind,
                    condition,
                    Reaction::ResolveClause {
                        clause: clause.clone(),
                        caster: card,
                    },
                ))
            }
            TriggerKind::OnEvolve | TriggerKind::Evolved => {
                let condition = if clause.trigger == TriggerKind::OnEvolve {
                    ListenerCondition::SubjectSpentEp(card)
                } else {
                    ListenerCondition::Subject(card)
                };
                Some(Listener::new(
                    kind,
                    condition,
                    Reaction::ResolveClause {
                        clause: clause.clone(),
                        caster: card,
                    },
                ))
            }
            TriggerKind::Activate => Some(Listener::new(
                kind,
                ListenerCondition::Subject(card),
                Reaction::ResolveClause {
                    clause: clause.clone(),
                    caster: card,
                },
            )),
            TriggerKind::Spellboost => Some(Listener::new(
                kind,
                ListenerCondition::ForPlayer(owner),
                Reaction::ResolveClause {
                    clause: clause.clone(),
                    caster: card,
                },
            )),
            TriggerKind::Clash => Some(Listener::new(
                kind,
                ListenerCondition::Combatant(card),
                Reaction::ResolveClause {
                    clause: clause.clone(),
                    caster: card,
                },
            )),
            TriggerKind::Strike => Some(Listener::new(
                kind,
                ListenerCondition::Source(card),
                Reaction::ResolveClause {
                    clause: clause.clone(),
                    caster: card,
                },
            )),
            TriggerKind::Drain if !drain_registered => {
                drain_registered = true;
                Some(Listener::new(
                    kind,
                    ListenerCondition::Source(card),
                    Reaction::Drain { card },
                ))
            }
            // Player-scoped kinds are counted below; evolve-cascade triggers
            // subscribe through the shared cascade listener.
            _ => None,
        };
        if let Some(listener) = listener {
            bus.subscribe(listener.owned_by_card(card).owned_by_player(owner));
        }

        let is_cascade_trigger = matches!(
            clause.trigger,
            TriggerKind::OnSuperEvolve
                | TriggerKind::SuperEvolved
                | TriggerKind::OnEvolve
                | TriggerKind::Evolved
        );
        if is_cascade_trigger && !cascade_registered {
            cascade_registered = true;
            bus.subscribe(
                Listener::new(
                    EventKind::FollowerSuperEvolved,
                    ListenerCondition::Subject(card),
                    Reaction::SuperEvolvedCascade { card },
                )
                .owned_by_card(card)
                .owned_by_player(owner),
            );
        }
    }

    for kind in player_scoped(&kinds) {
        counters.increment(bus, owner, kind);
    }

    Ok(())
}

/// Remove every listener a field card owns and release its share of the
/// player-scoped subscriptions.
pub fn unregister_field_card(
    state: &GameState,
    bus: &mut EventBus,
    counters: &mut ListenerCounters,
    card: EntityId,
) -> GameResult<()> {
    let instance = state.card(card)?;
    let owner = instance.owner;
    let kinds: Vec<EventKind> = player_scoped(instance.listen_kinds()).collect();

    bus.remove_for_card(card);
    for kind in kinds {
        counters.decrement(bus, owner, kind);
    }
    Ok(())
}

/// Refresh a field card's subscriptions after its clause list changed.
/// `previous_kinds` is the card's listen-kind set from before the change.
pub fn refresh_field_card(
    state: &GameState,
    bus: &mut EventBus,
    counters: &mut ListenerCounters,
    card: EntityId,
    previous_kinds: &[EventKind],
) -> GameResult<()> {
    let owner = state.card(card)?.owner;
    bus.remove_for_card(card);
    for kind in player_scoped(previous_kinds) {
        counters.decrement(bus, owner, kind);
    }
    register_field_card(state, bus, counters, card)
}

/// Move a card onto the field, wiring its listeners before any entry event
/// can drain. Returns `false` when the field was full and the card went to
/// the graveyard instead.
pub fn place_on_field(
    state: &mut GameState,
    bus: &mut EventBus,
    counters: &mut ListenerCounters,
    card: EntityId,
) -> GameResult<bool> {
    let landed = state.put_in_zone(card, ZoneKind::Field)?;
    if landed != ZoneKind::Field {
        return Ok(false);
    }

    let instance = state.card_mut(card)?;
    instance.summoned_this_turn = true;
    if instance.countdown.is_none() {
        let starting = instance
            .clauses()
            .iter()
            .find(|c| c.trigger == TriggerKind::Countdown)
            .and_then(|c| c.countdown);
        instance.countdown = starting;
    }

    register_field_card(state, bus, counters, card)?;

    let instance = state.card(card)?;
    if instance.is_follower() {
        bus.publish(crate::bus::GameEvent::FollowerEnterField {
            card,
            player: instance.owner,
        });
    }
    Ok(true)
}

/// Take a card off the field, removing its listeners before the departure
/// is announced anywhere.
pub fn leave_field(
    state: &mut GameState,
    bus: &mut EventBus,
    counters: &mut ListenerCounters,
    card: EntityId,
) -> GameResult<()> {
    unregister_field_card(state, bus, counters, card)?;
    state.remove_from_zone(card)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardCatalog, CardDefinition, CardId, Process};
    use crate::effects::TargetKind;

    fn catalog() -> CardCatalog {
        let mut catalog = CardCatalog::new();
        catalog
            .register(
                CardDefinition::follower(CardId(1), "Watcher", 2, 2, 2).with_clause(
                    EffectClause::triggered(
                        TriggerKind::OnMyTurnEnd,
                        TargetKind::OwnLeader,
                        Process::Heal { amount: 1 },
                    ),
                ),
            )
            .unwrap();
        catalog.resolve_references();
        catalog
    }

    #[test]
    fn test_player_scoped_refcounting() {
        let catalog = catalog();
        let def = catalog.get(CardId(1)).unwrap().clone();
        let mut state = GameState::new(3);
        let mut bus = EventBus::new();
        let mut counters = ListenerCounters::new();

        let a = state.instantiate(&def, PlayerId::FIRST);
        let b = state.instantiate(&def, PlayerId::FIRST);
        place_on_field(&mut state, &mut bus, &mut counters, a).unwrap();
        place_on_field(&mut state, &mut bus, &mut counters, b).unwrap();

        assert_eq!(counters.count(PlayerId::FIRST, EventKind::TurnEnd), 2);

        leave_field(&mut state, &mut bus, &mut counters, a).unwrap();
        assert_eq!(counters.count(PlayerId::FIRST, EventKind::TurnEnd), 1);

        let event = crate::bus::GameEvent::TurnEnd {
            player: PlayerId::FIRST,
            turn: 1,
        };
        assert_eq!(bus.matching(&event).len(), 1);

        leave_field(&mut state, &mut bus, &mut counters, b).unwrap();
        assert_eq!(counters.count(PlayerId::FIRST, EventKind::TurnEnd), 0);
        assert!(bus.matching(&event).is_empty());
    }

    #[test]
    fn test_countdown_initialized_on_entry() {
        let mut catalog = CardCatalog::new();
        catalog
            .register(
                CardDefinition::amulet(CardId(2), "Hourglass", 1)
                    .with_clause(EffectClause::countdown(2)),
            )
            .unwrap();
        catalog.resolve_references();
        let def = catalog.get(CardId(2)).unwrap().clone();

        let mut state = GameState::new(3);
        let mut bus = EventBus::new();
        let mut counters = ListenerCounters::new();

        let amulet = state.instantiate(&def, PlayerId::FIRST);
        place_on_field(&mut state, &mut bus, &mut counters, amulet).unwrap();

        assert_eq!(state.card(amulet).unwrap().countdown, Some(2));
        assert_eq!(counters.count(PlayerId::FIRST, EventKind::TurnStart), 1);
    }
}
