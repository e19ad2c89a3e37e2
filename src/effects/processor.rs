//! The effect processor.
//!
//! `resolve_clause` applies one effect clause: it computes the target list
//! (or takes an explicit target from the triggering context), then invokes
//! the process handler once per target in list order. Targets are not
//! snapshotted: a target removed earlier in the same multi-target
//! application is skipped silently, and several card rulings depend on that
//! order sensitivity.
//!
//! A `Choose` process never mutates state here; it surfaces as
//! [`Resolution::Suspended`] for the orchestrator to park.

use tracing::{debug, warn};

use crate::bus::{EventBus, GameEvent};
use crate::cards::{CardCatalog, CardRef, EffectClause, Process, TriggerKind};
use crate::core::{EntityId, GameState, PlayerId, ZoneKind};
use crate::error::GameResult;
use crate::game::listeners::{self, ListenerCounters};

use super::choice::ChoiceHandler;
use super::targeting::resolve_targets;

/// Everything a clause needs to resolve against.
pub struct EffectContext<'a> {
    pub state: &'a mut GameState,
    pub bus: &'a mut EventBus,
    pub catalog: &'a CardCatalog,
    pub counters: &'a mut ListenerCounters,
    pub chooser: &'a mut dyn ChoiceHandler,
}

/// Outcome of resolving one clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The clause applied to at least one target.
    Applied,
    /// No eligible target, or an inert clause. Nothing happened.
    Fizzled,
    /// A `Choose` process needs player input before resolution continues.
    Suspended(PendingChoice),
}

/// Parked continuation for a suspended `Choose` clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingChoice {
    pub caster: EntityId,
    /// The clauses the player picks between.
    pub options: Vec<EffectClause>,
    /// Applications queued behind the choice; they resolve after it, each
    /// with its own caster.
    pub followup: Vec<PendingClause>,
}

/// One queued clause application inside a suspended continuation. `target`
/// is set when a multi-target application was split by a suspension and the
/// remaining targets were already fixed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingClause {
    pub caster: EntityId,
    pub clause: EffectClause,
    pub target: Option<EntityId>,
}

/// Resolve an ordered clause list for one caster, stopping at the first
/// suspension and carrying the unresolved remainder inside the pending
/// continuation.
pub fn resolve_clause_list(
    ctx: &mut EffectContext<'_>,
    clauses: &[EffectClause],
    caster: EntityId,
    explicit_target: Option<EntityId>,
) -> GameResult<Resolution> {
    let items: Vec<PendingClause> = clauses
        .iter()
        .map(|clause| PendingClause {
            caster,
            clause: clause.clone(),
            target: explicit_target,
        })
        .collect();
    resolve_pending_list(ctx, &items)
}

/// Resolve a list of caster-tagged clause applications in order. This is the
/// form continuations are stored in, so resumption replays exactly the work
/// a suspension interrupted.
pub fn resolve_pending_list(
    ctx: &mut EffectContext<'_>,
    items: &[PendingClause],
) -> GameResult<Resolution> {
    let mut any_applied = false;
    for (index, item) in items.iter().enumerate() {
        match resolve_clause(ctx, &item.clause, item.caster, item.target)? {
            Resolution::Applied => any_applied = true,
            Resolution::Fizzled => {}
            Resolution::Suspended(mut pending) => {
                pending.followup.extend(items[index + 1..].iter().cloned());
                return Ok(Resolution::Suspended(pending));
            }
        }
    }
    Ok(if any_applied {
        Resolution::Applied
    } else {
        Resolution::Fizzled
    })
}

/// Resolve one clause for its caster.
///
/// `explicit_target` bypasses the targeting resolver; it is used when a
/// listener reacts to a specific triggering entity.
pub fn resolve_clause(
    ctx: &mut EffectContext<'_>,
    clause: &EffectClause,
    caster: EntityId,
    explicit_target: Option<EntityId>,
) -> GameResult<Resolution> {
    let Some(process) = &clause.process else {
        // Pure keywords and misconfigured no-op clauses.
        return Ok(Resolution::Fizzled);
    };

    if let Process::Choose { options } = process {
        return Ok(Resolution::Suspended(PendingChoice {
            caster,
            options: options.clone(),
            followup: Vec::new(),
        }));
    }

    let targets: Vec<EntityId> = match explicit_target {
        Some(target) => vec![target],
        None => match clause.target {
            None => vec![caster],
            Some(kind) => {
                // Draw conditions filter the deck, not the target list.
                let filter = match process {
                    Process::Draw { .. } => None,
                    _ => clause.condition.as_ref(),
                };
                resolve_targets(ctx.state, ctx.catalog, kind, caster, filter, ctx.chooser)?
            }
        },
    };

    if targets.is_empty() {
        return Ok(Resolution::Fizzled);
    }

    let mut any_applied = false;
    for (index, &target) in targets.iter().enumerate() {
        if !ctx.state.entity_alive(target) {
            debug!(%target, "skipping stale target");
            continue;
        }
        match apply_process(ctx, clause, process, target)? {
            Resolution::Applied => any_applied = true,
            Resolution::Fizzled => {}
            Resolution::Suspended(mut pending) => {
                // The untouched targets of this application queue up behind
                // the choice, each as its own fixed-target item.
                pending.followup.extend(targets[index + 1..].iter().map(|&later| PendingClause {
                    caster,
                    clause: clause.clone(),
                    target: Some(later),
                }));
                return Ok(Resolution::Suspended(pending));
            }
        }
    }

    Ok(if any_applied {
        Resolution::Applied
    } else {
        Resolution::Fizzled
    })
}

/// The player a target belongs to: the leader's seat, or the card's owner.
fn owner_of(state: &GameState, target: EntityId) -> GameResult<PlayerId> {
    match target.as_player() {
        Some(player) => Ok(player),
        None => Ok(state.card(target)?.owner),
    }
}

fn apply_process(
    ctx: &mut EffectContext<'_>,
    clause: &EffectClause,
    process: &Process,
    target: EntityId,
) -> GameResult<Resolution> {
    match process {
        Process::Choose { .. } => unreachable!("handled before target resolution"),

        Process::StatBuff { attack, defense } => {
            if target.is_player() {
                debug!(%target, "stat buff on a leader does nothing");
                return Ok(Resolution::Fizzled);
            }
            let card = ctx.state.card_mut(target)?;
            if !card.on_field() {
                return Ok(Resolution::Fizzled);
            }
            card.attack += attack;
            card.defense += defense;
            card.max_defense += defense;
            Ok(Resolution::Applied)
        }

        Process::Draw { count } => {
            let who = owner_of(ctx.state, target)?;
            for _ in 0..*count {
                if ctx
                    .state
                    .draw_card(who, clause.condition.as_ref(), ctx.catalog)
                    .is_none()
                {
                    break;
                }
            }
            Ok(Resolution::Applied)
        }

        Process::Heal { amount } => match target.as_player() {
            Some(player) => {
                ctx.state.players[player].heal_leader(*amount);
                Ok(Resolution::Applied)
            }
            None => {
                let card = ctx.state.card_mut(target)?;
                if !card.on_field() {
                    return Ok(Resolution::Fizzled);
                }
                card.defense = (card.defense + amount.max(&0)).min(card.max_defense);
                Ok(Resolution::Applied)
            }
        },

        Process::AddCardToHand { card, count } => {
            let Some(definition) = lookup_ref(ctx.catalog, card) else {
                return Ok(Resolution::Fizzled);
            };
            let who = owner_of(ctx.state, target)?;
            for _ in 0..*count {
                let id = ctx.state.instantiate(&definition, who);
                ctx.state.put_in_zone(id, ZoneKind::Hand)?;
            }
            Ok(Resolution::Applied)
        }

        Process::Summon { card, count } => {
            let Some(definition) = lookup_ref(ctx.catalog, card) else {
                return Ok(Resolution::Fizzled);
            };
            let who = owner_of(ctx.state, target)?;
            for _ in 0..*count {
                let id = ctx.state.instantiate(&definition, who);
                listeners::place_on_field(ctx.state, ctx.bus, ctx.counters, id)?;
            }
            Ok(Resolution::Applied)
        }

        Process::DealDamage { amount } => {
            deal_effect_damage(ctx, target, *amount)?;
            Ok(Resolution::Applied)
        }

        Process::Destroy => {
            if target.is_player() {
                return Ok(Resolution::Fizzled);
            }
            let active = ctx.state.active_player;
            let card = ctx.state.card(target)?;
            if !card.on_field() {
                return Ok(Resolution::Fizzled);
            }
            // Super-evolved followers cannot be destroyed by effects during
            // their owner's turn.
            if card.super_evolved && card.owner == active {
                return Ok(Resolution::Fizzled);
            }
            mark_destroyed(ctx.state, ctx.bus, target)?;
            Ok(Resolution::Applied)
        }

        Process::RecoverPp { amount } => {
            let who = owner_of(ctx.state, target)?;
            ctx.state.players[who].recover_pp(*amount);
            Ok(Resolution::Applied)
        }

        Process::SuperEvolve => {
            if target.is_player() {
                return Ok(Resolution::Fizzled);
            }
            let card = ctx.state.card_mut(target)?;
            if !card.is_follower() || !card.on_field() || card.super_evolved {
                return Ok(Resolution::Fizzled);
            }
            card.super_evolve();
            let player = card.owner;
            ctx.bus.publish(GameEvent::FollowerSuperEvolved {
                card: target,
                player,
                spent_sep: false,
            });
            Ok(Resolution::Applied)
        }

        Process::ReplaceDeck { card } => {
            let Some(definition) = lookup_ref(ctx.catalog, card) else {
                return Ok(Resolution::Fizzled);
            };
            let who = owner_of(ctx.state, target)?;
            let old = ctx.state.zones[who].deck.take_all();
            let size = old.len();
            for id in old {
                ctx.state.cards.remove(&id);
            }
            for _ in 0..size {
                let id = ctx.state.instantiate(&definition, who);
                ctx.state.zones[who].deck.push(id);
                ctx.state.card_mut(id)?.zone = Some(ZoneKind::Deck);
            }
            Ok(Resolution::Applied)
        }

        Process::SetMaxHealth { amount } => {
            match target.as_player() {
                Some(player) => ctx.state.players[player].set_leader_max_defense(*amount),
                None => {
                    let card = ctx.state.card_mut(target)?;
                    card.max_defense = *amount;
                    card.defense = card.defense.min(*amount);
                }
            }
            Ok(Resolution::Applied)
        }

        Process::AddEffect { clause: granted } => {
            if target.is_player() {
                return Ok(Resolution::Fizzled);
            }
            let previous = ctx.state.card(target)?.listen_kinds().to_vec();
            ctx.state.card_mut(target)?.add_clause((**granted).clone());
            if ctx.state.card(target)?.on_field() {
                listeners::refresh_field_card(
                    ctx.state,
                    ctx.bus,
                    ctx.counters,
                    target,
                    &previous,
                )?;
            }
            Ok(Resolution::Applied)
        }

        Process::RemoveKeyword { keyword } => {
            if target.is_player() {
                return Ok(Resolution::Fizzled);
            }
            let previous = ctx.state.card(target)?.listen_kinds().to_vec();
            let removed = ctx.state.card_mut(target)?.remove_keyword(*keyword);
            if removed && ctx.state.card(target)?.on_field() {
                listeners::refresh_field_card(
                    ctx.state,
                    ctx.bus,
                    ctx.counters,
                    target,
                    &previous,
                )?;
            }
            Ok(if removed {
                Resolution::Applied
            } else {
                Resolution::Fizzled
            })
        }

        Process::ReturnToDeck => {
            if target.is_player() {
                return Ok(Resolution::Fizzled);
            }
            if ctx.state.card(target)?.on_field() {
                listeners::unregister_field_card(ctx.state, ctx.bus, ctx.counters, target)?;
            }
            let definition = ctx.catalog.require(ctx.state.card(target)?.card_id)?.clone();
            let who = ctx.state.card(target)?.owner;
            ctx.state.card_mut(target)?.reset_to_definition(&definition);
            ctx.state.put_in_zone(target, ZoneKind::Deck)?;
            ctx.state.shuffle_deck(who);
            Ok(Resolution::Applied)
        }

        Process::ReturnToHand => {
            if target.is_player() {
                return Ok(Resolution::Fizzled);
            }
            if ctx.state.card(target)?.on_field() {
                listeners::unregister_field_card(ctx.state, ctx.bus, ctx.counters, target)?;
            }
            let definition = ctx.catalog.require(ctx.state.card(target)?.card_id)?.clone();
            ctx.state.card_mut(target)?.reset_to_definition(&definition);
            ctx.state.put_in_zone(target, ZoneKind::Hand)?;
            Ok(Resolution::Applied)
        }

        Process::TriggerEffect { trigger } => {
            if target.is_player() {
                return Ok(Resolution::Fizzled);
            }
            let nested: Vec<EffectClause> = ctx
                .state
                .card(target)?
                .clauses_with(*trigger)
                .cloned()
                .collect();
            resolve_clause_list(ctx, &nested, target, None)
        }
    }
}

fn lookup_ref(
    catalog: &CardCatalog,
    card: &CardRef,
) -> Option<crate::cards::CardDefinition> {
    let id = match card.resolved() {
        Some(id) => id,
        None => {
            warn!("unresolved card reference at resolution time; clause is a no-op");
            return None;
        }
    };
    match catalog.get(id) {
        Some(def) => Some(def.clone()),
        None => {
            warn!(%id, "card reference points at a missing definition");
            None
        }
    }
}

/// Effect damage to a leader or a field card.
///
/// Barrier absorbs the hit fully and is stripped instead. A super-evolved
/// follower absorbs effect damage entirely during its owner's own turn,
/// keeping its keywords.
pub fn deal_effect_damage(
    ctx: &mut EffectContext<'_>,
    target: EntityId,
    amount: i64,
) -> GameResult<()> {
    if let Some(player) = target.as_player() {
        ctx.state.players[player].damage_leader(amount);
        return Ok(());
    }

    let active = ctx.state.active_player;
    let card = ctx.state.card(target)?;
    if !card.on_field() {
        return Ok(());
    }
    if card.has_keyword(TriggerKind::Barrier) {
        ctx.state.card_mut(target)?.remove_keyword(TriggerKind::Barrier);
        return Ok(());
    }
    if card.super_evolved && card.owner == active {
        return Ok(());
    }

    let card = ctx.state.card_mut(target)?;
    card.defense -= amount.max(0);
    if card.defense <= 0 {
        mark_destroyed(ctx.state, ctx.bus, target)?;
    }
    Ok(())
}

/// Queue a Destroyed event for a field card, exactly once.
///
/// The orchestrator's drain loop performs the actual last-words resolution,
/// listener removal, and move to the graveyard when it pops the event.
pub fn mark_destroyed(
    state: &mut GameState,
    bus: &mut EventBus,
    card: EntityId,
) -> GameResult<()> {
    let instance = state.card_mut(card)?;
    if instance.doomed || instance.zone != Some(ZoneKind::Field) {
        return Ok(());
    }
    instance.doomed = true;
    let player = instance.owner;
    bus.publish(GameEvent::Destroyed { card, player });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventKind;
    use crate::cards::{CardDefinition, CardId};
    use crate::effects::choice::FirstChoice;
    use crate::effects::TargetKind;

    fn fixture() -> (GameState, EventBus, CardCatalog, ListenerCounters) {
        let mut catalog = CardCatalog::new();
        catalog
            .register(CardDefinition::follower(CardId(1), "Grunt", 2, 2, 2))
            .unwrap();
        catalog
            .register(
                CardDefinition::follower(CardId(2), "Shielded", 3, 2, 3)
                    .with_clause(EffectClause::keyword(TriggerKind::Barrier)),
            )
            .unwrap();
        catalog
            .register(
                CardDefinition::follower(CardId(3), "Echo", 2, 2, 2)
                    .with_clause(EffectClause::on_self(
                        TriggerKind::Fanfare,
                        Process::Choose {
                            options: vec![EffectClause::on_self(
                                TriggerKind::Fanfare,
                                Process::Heal { amount: 1 },
                            )],
                        },
                    ))
                    .with_clause(EffectClause::on_self(
                        TriggerKind::Fanfare,
                        Process::StatBuff {
                            attack: 1,
                            defense: 1,
                        },
                    )),
            )
            .unwrap();
        catalog.resolve_references();
        (
            GameState::new(5),
            EventBus::new(),
            catalog,
            ListenerCounters::new(),
        )
    }

    fn spawn(
        state: &mut GameState,
        bus: &mut EventBus,
        counters: &mut ListenerCounters,
        catalog: &CardCatalog,
        card_id: CardId,
        owner: PlayerId,
    ) -> EntityId {
        let def = catalog.get(card_id).unwrap().clone();
        let id = state.instantiate(&def, owner);
        listeners::place_on_field(state, bus, counters, id).unwrap();
        id
    }

    #[test]
    fn test_stat_buff() {
        let (mut state, mut bus, catalog, mut counters) = fixture();
        let mut chooser = FirstChoice;
        let card = spawn(
            &mut state,
            &mut bus,
            &mut counters,
            &catalog,
            CardId(1),
            PlayerId::FIRST,
        );

        let clause = EffectClause::on_self(
            TriggerKind::Fanfare,
            Process::StatBuff {
                attack: 1,
                defense: 2,
            },
        );
        let mut ctx = EffectContext {
            state: &mut state,
            bus: &mut bus,
            catalog: &catalog,
            counters: &mut counters,
            chooser: &mut chooser,
        };
        let result = resolve_clause(&mut ctx, &clause, card, None).unwrap();
        assert_eq!(result, Resolution::Applied);

        let card = state.card(card).unwrap();
        assert_eq!((card.attack, card.defense, card.max_defense), (3, 4, 4));
    }

    #[test]
    fn test_barrier_absorbs_then_strips() {
        let (mut state, mut bus, catalog, mut counters) = fixture();
        let mut chooser = FirstChoice;
        let shielded = spawn(
            &mut state,
            &mut bus,
            &mut counters,
            &catalog,
            CardId(2),
            PlayerId::SECOND,
        );

        let mut ctx = EffectContext {
            state: &mut state,
            bus: &mut bus,
            catalog: &catalog,
            counters: &mut counters,
            chooser: &mut chooser,
        };
        deal_effect_damage(&mut ctx, shielded, 2).unwrap();
        assert_eq!(state.card(shielded).unwrap().defense, 3);
        assert!(!state
            .card(shielded)
            .unwrap()
            .has_keyword(TriggerKind::Barrier));

        let mut ctx = EffectContext {
            state: &mut state,
            bus: &mut bus,
            catalog: &catalog,
            counters: &mut counters,
            chooser: &mut chooser,
        };
        deal_effect_damage(&mut ctx, shielded, 2).unwrap();
        assert_eq!(state.card(shielded).unwrap().defense, 1);
    }

    #[test]
    fn test_lethal_damage_queues_one_destroyed_event() {
        let (mut state, mut bus, catalog, mut counters) = fixture();
        let mut chooser = FirstChoice;
        let grunt = spawn(
            &mut state,
            &mut bus,
            &mut counters,
            &catalog,
            CardId(1),
            PlayerId::SECOND,
        );

        let mut ctx = EffectContext {
            state: &mut state,
            bus: &mut bus,
            catalog: &catalog,
            counters: &mut counters,
            chooser: &mut chooser,
        };
        deal_effect_damage(&mut ctx, grunt, 5).unwrap();
        deal_effect_damage(&mut ctx, grunt, 5).unwrap();

        let mut destroyed = 0;
        while let Some(event) = bus.pop() {
            if matches!(event, GameEvent::Destroyed { .. }) {
                destroyed += 1;
            }
        }
        assert_eq!(destroyed, 1);
    }

    #[test]
    fn test_super_evolved_immune_to_effect_destruction_on_own_turn() {
        let (mut state, mut bus, catalog, mut counters) = fixture();
        let mut chooser = FirstChoice;
        let grunt = spawn(
            &mut state,
            &mut bus,
            &mut counters,
            &catalog,
            CardId(1),
            PlayerId::FIRST,
        );
        state.cards.get_mut(&grunt).unwrap().super_evolved = true;
        state.active_player = PlayerId::FIRST;

        let clause = EffectClause::on_self(TriggerKind::Spell, Process::Destroy);
        let mut ctx = EffectContext {
            state: &mut state,
            bus: &mut bus,
            catalog: &catalog,
            counters: &mut counters,
            chooser: &mut chooser,
        };
        let result = resolve_clause(&mut ctx, &clause, grunt, None).unwrap();
        assert_eq!(result, Resolution::Fizzled);
        assert!(state.card(grunt).unwrap().on_field());

        // On the opponent's turn the immunity lapses.
        state.active_player = PlayerId::SECOND;
        let mut ctx = EffectContext {
            state: &mut state,
            bus: &mut bus,
            catalog: &catalog,
            counters: &mut counters,
            chooser: &mut chooser,
        };
        let result = resolve_clause(&mut ctx, &clause, grunt, None).unwrap();
        assert_eq!(result, Resolution::Applied);
        assert!(state.card(grunt).unwrap().doomed);
    }

    #[test]
    fn test_choose_suspends_with_followup() {
        let (mut state, mut bus, catalog, mut counters) = fixture();
        let mut chooser = FirstChoice;
        let card = spawn(
            &mut state,
            &mut bus,
            &mut counters,
            &catalog,
            CardId(1),
            PlayerId::FIRST,
        );

        let choice = EffectClause::on_self(
            TriggerKind::Fanfare,
            Process::Choose {
                options: vec![EffectClause::on_self(
                    TriggerKind::Fanfare,
                    Process::Heal { amount: 2 },
                )],
            },
        );
        let after = EffectClause::on_self(TriggerKind::Fanfare, Process::Draw { count: 1 });

        let mut ctx = EffectContext {
            state: &mut state,
            bus: &mut bus,
            catalog: &catalog,
            counters: &mut counters,
            chooser: &mut chooser,
        };
        let result =
            resolve_clause_list(&mut ctx, &[choice, after.clone()], card, None).unwrap();
        match result {
            Resolution::Suspended(pending) => {
                assert_eq!(pending.caster, card);
                assert_eq!(pending.options.len(), 1);
                assert_eq!(
                    pending.followup,
                    vec![PendingClause {
                        caster: card,
                        clause: after,
                        target: None,
                    }]
                );
            }
            other => panic!("expected suspension, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_suspension_keeps_each_caster() {
        let (mut state, mut bus, catalog, mut counters) = fixture();
        let mut chooser = FirstChoice;
        let caster = spawn(
            &mut state,
            &mut bus,
            &mut counters,
            &catalog,
            CardId(1),
            PlayerId::FIRST,
        );
        let echo = spawn(
            &mut state,
            &mut bus,
            &mut counters,
            &catalog,
            CardId(3),
            PlayerId::FIRST,
        );

        let invoke = EffectClause::on_self(
            TriggerKind::Spell,
            Process::TriggerEffect {
                trigger: TriggerKind::Fanfare,
            },
        );
        let after = EffectClause::on_self(TriggerKind::Spell, Process::Draw { count: 1 });

        let mut ctx = EffectContext {
            state: &mut state,
            bus: &mut bus,
            catalog: &catalog,
            counters: &mut counters,
            chooser: &mut chooser,
        };
        let result =
            resolve_clause_list(&mut ctx, &[invoke, after], caster, Some(echo)).unwrap();
        let Resolution::Suspended(pending) = result else {
            panic!("expected suspension");
        };

        // Echo's own Choose suspended; its second clause resumes as echo,
        // and the outer caster's remaining clause resumes as the caster.
        assert_eq!(pending.caster, echo);
        assert_eq!(pending.followup.len(), 2);
        assert_eq!(pending.followup[0].caster, echo);
        assert_eq!(pending.followup[1].caster, caster);

        let mut items = vec![PendingClause {
            caster: pending.caster,
            clause: pending.options[0].clone(),
            target: None,
        }];
        items.extend(pending.followup);
        let mut ctx = EffectContext {
            state: &mut state,
            bus: &mut bus,
            catalog: &catalog,
            counters: &mut counters,
            chooser: &mut chooser,
        };
        resolve_pending_list(&mut ctx, &items).unwrap();
        assert_eq!(state.card(echo).unwrap().attack, 3);
    }

    #[test]
    fn test_suspension_requeues_remaining_targets() {
        let (mut state, mut bus, catalog, mut counters) = fixture();
        let mut chooser = FirstChoice;
        let first = spawn(
            &mut state,
            &mut bus,
            &mut counters,
            &catalog,
            CardId(3),
            PlayerId::FIRST,
        );
        let second = spawn(
            &mut state,
            &mut bus,
            &mut counters,
            &catalog,
            CardId(3),
            PlayerId::FIRST,
        );

        let sweep = EffectClause::triggered(
            TriggerKind::Spell,
            TargetKind::AllAllyFollowers,
            Process::TriggerEffect {
                trigger: TriggerKind::Fanfare,
            },
        );
        let mut ctx = EffectContext {
            state: &mut state,
            bus: &mut bus,
            catalog: &catalog,
            counters: &mut counters,
            chooser: &mut chooser,
        };
        let result = resolve_clause(&mut ctx, &sweep, first, None).unwrap();
        let Resolution::Suspended(pending) = result else {
            panic!("expected suspension");
        };

        assert_eq!(pending.caster, first);
        assert_eq!(pending.followup.len(), 2);
        // The untouched second target is requeued as a fixed-target item.
        assert_eq!(
            pending.followup[1],
            PendingClause {
                caster: first,
                clause: sweep,
                target: Some(second),
            }
        );

        let mut items = vec![PendingClause {
            caster: pending.caster,
            clause: pending.options[0].clone(),
            target: None,
        }];
        items.extend(pending.followup);
        let mut ctx = EffectContext {
            state: &mut state,
            bus: &mut bus,
            catalog: &catalog,
            counters: &mut counters,
            chooser: &mut chooser,
        };
        let result = resolve_pending_list(&mut ctx, &items).unwrap();
        // Resumption reached the second target, whose own choice now sits
        // at the front.
        let Resolution::Suspended(next) = result else {
            panic!("expected the second target's suspension");
        };
        assert_eq!(next.caster, second);
        assert_eq!(state.card(first).unwrap().attack, 3);
    }

    #[test]
    fn test_granted_clause_wires_player_listener() {
        let (mut state, mut bus, catalog, mut counters) = fixture();
        let mut chooser = FirstChoice;
        let grunt = spawn(
            &mut state,
            &mut bus,
            &mut counters,
            &catalog,
            CardId(1),
            PlayerId::FIRST,
        );
        assert_eq!(counters.count(PlayerId::FIRST, EventKind::TurnEnd), 0);

        let grant = EffectClause::on_self(
            TriggerKind::Spell,
            Process::AddEffect {
                clause: Box::new(EffectClause::on_self(
                    TriggerKind::OnMyTurnEnd,
                    Process::Heal { amount: 1 },
                )),
            },
        );
        let mut ctx = EffectContext {
            state: &mut state,
            bus: &mut bus,
            catalog: &catalog,
            counters: &mut counters,
            chooser: &mut chooser,
        };
        let result = resolve_clause(&mut ctx, &grant, grunt, None).unwrap();
        assert_eq!(result, Resolution::Applied);
        assert_eq!(counters.count(PlayerId::FIRST, EventKind::TurnEnd), 1);
    }

    #[test]
    fn test_buff_and_heal_skip_cards_off_the_field() {
        let (mut state, mut bus, catalog, mut counters) = fixture();
        let mut chooser = FirstChoice;
        let grunt = spawn(
            &mut state,
            &mut bus,
            &mut counters,
            &catalog,
            CardId(1),
            PlayerId::SECOND,
        );
        state.put_in_zone(grunt, ZoneKind::Graveyard).unwrap();

        let buff = EffectClause::on_self(
            TriggerKind::Fanfare,
            Process::StatBuff {
                attack: 2,
                defense: 2,
            },
        );
        let heal = EffectClause::on_self(TriggerKind::Fanfare, Process::Heal { amount: 2 });
        let mut ctx = EffectContext {
            state: &mut state,
            bus: &mut bus,
            catalog: &catalog,
            counters: &mut counters,
            chooser: &mut chooser,
        };
        assert_eq!(
            resolve_clause(&mut ctx, &buff, grunt, None).unwrap(),
            Resolution::Fizzled
        );
        assert_eq!(
            resolve_clause(&mut ctx, &heal, grunt, None).unwrap(),
            Resolution::Fizzled
        );
        assert_eq!(state.card(grunt).unwrap().attack, 2);
        assert_eq!(state.card(grunt).unwrap().defense, 2);
    }

    #[test]
    fn test_stale_target_skipped_silently() {
        let (mut state, mut bus, catalog, mut counters) = fixture();
        let mut chooser = FirstChoice;
        let grunt = spawn(
            &mut state,
            &mut bus,
            &mut counters,
            &catalog,
            CardId(1),
            PlayerId::FIRST,
        );
        // Simulate removal earlier in the same application.
        state.remove_from_zone(grunt).unwrap();

        let clause = EffectClause::on_self(
            TriggerKind::Fanfare,
            Process::StatBuff {
                attack: 1,
                defense: 1,
            },
        );
        let mut ctx = EffectContext {
            state: &mut state,
            bus: &mut bus,
            catalog: &catalog,
            counters: &mut counters,
            chooser: &mut chooser,
        };
        let result = resolve_clause(&mut ctx, &clause, grunt, None).unwrap();
        assert_eq!(result, Resolution::Fizzled);
        assert_eq!(state.card(grunt).unwrap().attack, 2);
    }
}
