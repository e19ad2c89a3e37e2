//! The game orchestrator.
//!
//! `Game` owns the state, the event bus, the listener counters, and the
//! choice channel, and drives everything through a small state machine:
//! `AwaitingAction` accepts player actions, `Resolving` covers the drain
//! loop, and `AwaitingChoice` parks a suspended `Choose` clause until
//! [`Game::resolve_player_choice`] resumes it.
//!
//! Multi-drain sequences (combat, the turn handover) are expressed as an
//! explicit continuation so a suspension inside any drain picks the
//! sequence back up exactly where it stopped.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::bus::{EventBus, GameEvent, Listener, Reaction};
use crate::cards::{CardCatalog, CardId, EffectClause, TriggerKind};
use crate::core::{EntityId, GameState, PlayerId, PlayerPair, ZoneKind};
use crate::effects::{
    deal_effect_damage, mark_destroyed, resolve_clause_list, resolve_pending_list,
    ChoiceHandler, EffectContext, PendingChoice, PendingClause, RandomChoice, Resolution,
};
use crate::error::{ActionDenied, GameError, GameResult};
use crate::game::listeners::{self, ListenerCounters};
use crate::rules;

/// Cards drawn before the first turn.
pub const INITIAL_HAND_SIZE: usize = 4;
/// Global turn numbers granting two evolution points.
pub const EP_GRANT_TURNS: [u32; 2] = [8, 9];
/// Global turn numbers granting two super-evolution points.
pub const SEP_GRANT_TURNS: [u32; 2] = [12, 13];
/// Global turn numbers granting one extra play point.
pub const EXTRA_PP_GRANT_TURNS: [u32; 2] = [2, 12];
/// Leader damage dealt when a super-evolved attacker destroys its defender.
const SUPER_EVOLVE_STRIKE_THROUGH: i64 = 1;

/// Turn phase, exposed for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Start,
    Main,
    End,
}

/// Where the orchestrator's state machine currently sits.
#[derive(Clone, Debug, PartialEq)]
pub enum FlowState {
    /// The active player may act.
    AwaitingAction,
    /// A `Choose` clause suspended; only `resolve_player_choice` proceeds.
    AwaitingChoice(PendingChoice),
    /// Mid-drain. Never observable between public calls.
    Resolving,
}

/// Result of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(PlayerId),
    Draw,
}

/// A multi-drain sequence in flight.
#[derive(Clone, Debug, PartialEq)]
enum Continuation {
    None,
    /// Hand the turn to `next` once the turn-end drain settles.
    FinishTurn { next: PlayerId },
    Combat(CombatContinuation),
}

#[derive(Clone, Debug, PartialEq)]
struct CombatContinuation {
    attacker: EntityId,
    /// A leader entity id for direct attacks.
    defender: EntityId,
    stage: CombatStage,
    attacker_dead: bool,
    defender_dead: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CombatStage {
    /// AttackDeclared has drained.
    Declared,
    /// CombatInitiated has drained.
    Initiated,
    /// Damage events have drained.
    Damaged,
}

/// Listeners of an already-popped event that a suspension interrupted.
/// They are dispatched ahead of the bus queue once the choice resolves.
struct DeferredDispatch {
    event: GameEvent,
    listeners: VecDeque<Listener>,
}

/// A two-player game in progress.
pub struct Game {
    state: GameState,
    bus: EventBus,
    catalog: CardCatalog,
    counters: ListenerCounters,
    chooser: Box<dyn ChoiceHandler>,
    phase: Phase,
    flow: FlowState,
    continuation: Continuation,
    deferred: Option<DeferredDispatch>,
    outcome: Option<GameOutcome>,
}

impl Game {
    // ---- read-only snapshot surface ----

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.state.active_player
    }

    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.state.turn_number
    }

    #[must_use]
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// The suspended choice waiting on the player, if any.
    #[must_use]
    pub fn pending_choice(&self) -> Option<&PendingChoice> {
        match &self.flow {
            FlowState::AwaitingChoice(pending) => Some(pending),
            _ => None,
        }
    }

    #[must_use]
    pub fn leader_defense(&self, player: PlayerId) -> i64 {
        self.state.players[player].leader_defense
    }

    #[must_use]
    pub fn hand(&self, player: PlayerId) -> &[EntityId] {
        self.state.zones[player].hand.cards()
    }

    #[must_use]
    pub fn field(&self, player: PlayerId) -> &[EntityId] {
        self.state.zones[player].field.cards()
    }

    // ---- action surface ----

    /// Play a card from hand. `enhanced_cost` selects an enhanced firing
    /// and must match one of the card's enhance-gated clauses.
    pub fn play_card(
        &mut self,
        player: PlayerId,
        card: EntityId,
        use_extra_pp: bool,
        enhanced_cost: Option<i64>,
    ) -> GameResult<()> {
        self.ensure_active(player)?;
        rules::can_play_card(&self.state, player, card, use_extra_pp, enhanced_cost)?;

        let instance = self.state.card(card)?;
        let is_spell = matches!(instance.card_type, crate::cards::CardType::Spell);
        let paid = enhanced_cost.unwrap_or(instance.cost);
        self.state.players[player].spend_pp(paid, use_extra_pp);
        debug!(%card, %player, paid, "card played");

        if is_spell {
            // Spells never occupy the field: cast clauses resolve directly
            // and the card goes straight to the graveyard.
            self.state.put_in_zone(card, ZoneKind::Graveyard)?;
            self.bus.publish(GameEvent::CardPlayed {
                card,
                player,
                paid_cost: paid,
            });
            self.bus.publish(GameEvent::SpellCast { card, player });

            let clauses: Vec<EffectClause> = self
                .state
                .card(card)?
                .clauses()
                .iter()
                .filter(|c| match c.trigger {
                    TriggerKind::Spell => true,
                    TriggerKind::Enhance => c.enhance_cost == enhanced_cost,
                    _ => false,
                })
                .cloned()
                .collect();
            if let Resolution::Suspended(pending) = self.resolve_list(&clauses, card, None)? {
                self.flow = FlowState::AwaitingChoice(pending);
                return Ok(());
            }
        } else {
            listeners::place_on_field(&mut self.state, &mut self.bus, &mut self.counters, card)?;
            self.bus.publish(GameEvent::CardPlayed {
                card,
                player,
                paid_cost: paid,
            });
        }
        self.pump()
    }

    /// Declare an attack against an opposing follower.
    pub fn attack_follower(
        &mut self,
        player: PlayerId,
        attacker: EntityId,
        target: EntityId,
    ) -> GameResult<()> {
        self.ensure_active(player)?;
        rules::can_attack(&self.state, player, attacker, false)?;
        rules::can_target_follower(&self.state, attacker, target)?;

        self.continuation = Continuation::Combat(CombatContinuation {
            attacker,
            defender: target,
            stage: CombatStage::Declared,
            attacker_dead: false,
            defender_dead: false,
        });
        self.bus.publish(GameEvent::AttackDeclared {
            attacker,
            target,
            player,
        });
        self.pump()
    }

    /// Declare an attack against the opposing leader.
    pub fn attack_leader(&mut self, player: PlayerId, attacker: EntityId) -> GameResult<()> {
        self.ensure_active(player)?;
        rules::can_attack(&self.state, player, attacker, true)?;
        let defender = player.opponent();
        rules::can_attack_leader(&self.state, defender)?;

        let target = EntityId::player(defender);
        self.continuation = Continuation::Combat(CombatContinuation {
            attacker,
            defender: target,
            stage: CombatStage::Declared,
            attacker_dead: false,
            defender_dead: false,
        });
        self.bus.publish(GameEvent::AttackDeclared {
            attacker,
            target,
            player,
        });
        self.pump()
    }

    /// Spend an evolution point to evolve a follower.
    pub fn evolve_follower(&mut self, player: PlayerId, card: EntityId) -> GameResult<()> {
        self.ensure_active(player)?;
        rules::can_evolve(&self.state, player, card)?;

        self.state.players[player].spend_ep();
        self.state.card_mut(card)?.evolve();
        self.bus.publish(GameEvent::FollowerEvolved {
            card,
            player,
            spent_ep: true,
        });
        self.pump()
    }

    /// Spend a super-evolution point to super-evolve a follower.
    pub fn super_evolve_follower(&mut self, player: PlayerId, card: EntityId) -> GameResult<()> {
        self.ensure_active(player)?;
        rules::can_super_evolve(&self.state, player, card)?;

        self.state.players[player].spend_sep();
        self.state.card_mut(card)?.super_evolve();
        self.bus.publish(GameEvent::FollowerSuperEvolved {
            card,
            player,
            spent_sep: true,
        });
        self.pump()
    }

    /// Activate an amulet's Activate ability, paying its cost.
    pub fn activate_amulet(&mut self, player: PlayerId, card: EntityId) -> GameResult<()> {
        self.ensure_active(player)?;
        rules::can_activate_amulet(&self.state, player, card)?;

        let cost = self
            .state
            .card(card)?
            .clauses_with(TriggerKind::Activate)
            .next()
            .and_then(|c| c.cost)
            .unwrap_or(0);
        self.state.players[player].spend_pp(cost, false);
        self.state.card_mut(card)?.activated = true;
        self.bus.publish(GameEvent::AmuletActivated { card, player });
        self.pump()
    }

    /// End the active player's turn and hand over to the opponent.
    pub fn end_turn(&mut self, player: PlayerId) -> GameResult<()> {
        self.ensure_active(player)?;

        self.phase = Phase::End;
        self.bus.publish(GameEvent::TurnEnd {
            player,
            turn: self.state.turn_number,
        });
        self.continuation = Continuation::FinishTurn {
            next: player.opponent(),
        };
        self.pump()
    }

    /// Resume a suspended `Choose` clause with the selected option index.
    ///
    /// Valid only while a choice is pending; calling it twice for the same
    /// choice is an error.
    pub fn resolve_player_choice(&mut self, player: PlayerId, selection: usize) -> GameResult<()> {
        if self.outcome.is_some() {
            return Err(ActionDenied::GameFinished.into());
        }
        if player != self.state.active_player {
            return Err(ActionDenied::NotYourTurn.into());
        }
        let FlowState::AwaitingChoice(pending) = &self.flow else {
            return Err(ActionDenied::NoPendingChoice.into());
        };
        if selection >= pending.options.len() {
            return Err(ActionDenied::InvalidSelection.into());
        }

        let FlowState::AwaitingChoice(pending) =
            std::mem::replace(&mut self.flow, FlowState::Resolving)
        else {
            return Err(ActionDenied::NoPendingChoice.into());
        };
        let mut items = vec![PendingClause {
            caster: pending.caster,
            clause: pending.options[selection].clone(),
            target: None,
        }];
        items.extend(pending.followup);

        match self.resolve_pending(&items) {
            Ok(Resolution::Suspended(next)) => {
                self.flow = FlowState::AwaitingChoice(next);
                return Ok(());
            }
            Ok(_) => {}
            // The continuation itself must survive a failing clause.
            Err(error) => debug!(%error, "choice resolution failed, draining continues"),
        }
        self.pump()
    }

    // ---- internals ----

    fn ensure_active(&self, player: PlayerId) -> GameResult<()> {
        if self.outcome.is_some() {
            return Err(ActionDenied::GameFinished.into());
        }
        if matches!(self.flow, FlowState::AwaitingChoice(_)) {
            return Err(ActionDenied::ChoicePending.into());
        }
        if player != self.state.active_player {
            return Err(ActionDenied::NotYourTurn.into());
        }
        Ok(())
    }

    /// Drain the bus and advance any in-flight continuation until both are
    /// settled or a choice suspends.
    fn pump(&mut self) -> GameResult<()> {
        self.flow = FlowState::Resolving;
        loop {
            if let Some(pending) = self.drain()? {
                self.flow = FlowState::AwaitingChoice(pending);
                return Ok(());
            }
            match std::mem::replace(&mut self.continuation, Continuation::None) {
                Continuation::None => break,
                Continuation::FinishTurn { next } => self.begin_turn(next)?,
                Continuation::Combat(combat) => self.advance_combat(combat)?,
            }
        }
        self.flow = FlowState::AwaitingAction;
        self.check_outcome();
        Ok(())
    }

    fn begin_turn(&mut self, player: PlayerId) -> GameResult<()> {
        self.phase = Phase::Start;
        self.state.active_player = player;
        self.state.turn_number += 1;
        let turn = self.state.turn_number;

        let record = &mut self.state.players[player];
        record.spent_ep_this_turn = false;
        record.spent_sep_this_turn = false;
        record.ramp_and_refill_pp();
        if EP_GRANT_TURNS.contains(&turn) {
            record.gain_ep(2);
        }
        if SEP_GRANT_TURNS.contains(&turn) {
            record.gain_sep(2);
        }
        if EXTRA_PP_GRANT_TURNS.contains(&turn) {
            record.gain_extra_pp(1);
        }

        for card in self.state.field_cards(player) {
            self.state.card_mut(card)?.refresh_for_turn();
        }
        let _ = self.state.draw_card(player, None, &self.catalog);

        self.bus.publish(GameEvent::TurnStart { player, turn });
        self.phase = Phase::Main;
        Ok(())
    }

    fn advance_combat(&mut self, mut combat: CombatContinuation) -> GameResult<()> {
        // Triggers during earlier drains may have removed a combatant.
        let attacker_gone = !self
            .state
            .cards
            .get(&combat.attacker)
            .is_some_and(|c| c.on_field());
        let defender_gone = !combat.defender.is_player()
            && !self
                .state
                .cards
                .get(&combat.defender)
                .is_some_and(|c| c.on_field());
        if combat.stage != CombatStage::Damaged && (attacker_gone || defender_gone) {
            debug!(attacker = %combat.attacker, "combat aborted, a combatant left the field");
            return Ok(());
        }

        match combat.stage {
            CombatStage::Declared => {
                if let Some(leader) = combat.defender.as_player() {
                    let amount = self.state.card(combat.attacker)?.attack;
                    self.state.players[leader].damage_leader(amount);
                    self.bus.publish(GameEvent::DamageDealtByCombat {
                        source: combat.attacker,
                        target: combat.defender,
                        amount,
                    });
                    combat.stage = CombatStage::Damaged;
                } else {
                    self.bus.publish(GameEvent::CombatInitiated {
                        attacker: combat.attacker,
                        target: combat.defender,
                    });
                    combat.stage = CombatStage::Initiated;
                }
                self.continuation = Continuation::Combat(combat);
            }

            CombatStage::Initiated => {
                let attacker_power = self.state.card(combat.attacker)?.attack;
                let defender_power = self.state.card(combat.defender)?.attack;

                let to_defender = self.apply_combat_damage(combat.defender, attacker_power)?;
                let to_attacker = self.apply_combat_damage(combat.attacker, defender_power)?;

                let attacker_bane = self.state.card(combat.attacker)?.has_keyword(TriggerKind::Bane);
                let defender_bane = self.state.card(combat.defender)?.has_keyword(TriggerKind::Bane);

                combat.defender_dead = self.state.card(combat.defender)?.defense <= 0
                    || (attacker_bane && to_defender.is_some());
                combat.attacker_dead = self.state.card(combat.attacker)?.defense <= 0
                    || (defender_bane && to_attacker.is_some());

                // A super-evolved attacker that destroys its defender also
                // strikes the defending leader for one.
                if combat.defender_dead && self.state.card(combat.attacker)?.super_evolved {
                    let leader = self.state.card(combat.defender)?.owner;
                    self.state.players[leader].damage_leader(SUPER_EVOLVE_STRIKE_THROUGH);
                }

                self.bus.publish(GameEvent::DamageDealtByCombat {
                    source: combat.attacker,
                    target: combat.defender,
                    amount: to_defender.unwrap_or(0),
                });
                self.bus.publish(GameEvent::DamageDealtByCombat {
                    source: combat.defender,
                    target: combat.attacker,
                    amount: to_attacker.unwrap_or(0),
                });
                combat.stage = CombatStage::Damaged;
                self.continuation = Continuation::Combat(combat);
            }

            CombatStage::Damaged => {
                if !attacker_gone {
                    self.state.card_mut(combat.attacker)?.engaged = true;
                }
                // Attacker's side is evaluated before the defender's.
                if combat.attacker_dead {
                    mark_destroyed(&mut self.state, &mut self.bus, combat.attacker)?;
                }
                if combat.defender_dead {
                    mark_destroyed(&mut self.state, &mut self.bus, combat.defender)?;
                }
            }
        }
        Ok(())
    }

    /// Combat damage with the per-side absorptions. Returns the applied
    /// amount, or `None` when the hit was fully absorbed.
    fn apply_combat_damage(
        &mut self,
        target: EntityId,
        amount: i64,
    ) -> GameResult<Option<i64>> {
        let active = self.state.active_player;
        let card = self.state.card(target)?;
        if card.has_keyword(TriggerKind::Barrier) {
            self.state
                .card_mut(target)?
                .remove_keyword(TriggerKind::Barrier);
            return Ok(None);
        }
        if card.super_evolved && card.owner == active {
            return Ok(None);
        }
        let amount = amount.max(0);
        self.state.card_mut(target)?.defense -= amount;
        Ok(Some(amount))
    }

    /// Pop and process queued events until the queue is empty or a choice
    /// suspends resolution.
    ///
    /// On suspension the listeners still owed their reactions for the
    /// current event are parked in `deferred`; the next drain dispatches
    /// them ahead of the bus queue. Listener reactions are isolated: one
    /// failing reaction is logged and skipped, never aborting the drain.
    fn drain(&mut self) -> GameResult<Option<PendingChoice>> {
        loop {
            let (event, mut queue) = match self.deferred.take() {
                Some(deferred) => (deferred.event, deferred.listeners),
                None => {
                    let Some(event) = self.bus.pop() else {
                        return Ok(None);
                    };
                    trace!(?event, "processing event");

                    if let GameEvent::Destroyed { card, .. } = event {
                        if let Some(pending) = self.handle_destroyed(card)? {
                            self.deferred = Some(DeferredDispatch {
                                listeners: self.bus.matching(&event).into_iter().collect(),
                                event,
                            });
                            return Ok(Some(pending));
                        }
                    }
                    let listeners = self.bus.matching(&event).into_iter().collect();
                    (event, listeners)
                }
            };

            while let Some(listener) = queue.pop_front() {
                if !self.listener_still_valid(&listener) {
                    continue;
                }
                match self.run_reaction(listener.reaction, &event) {
                    Ok(None) => {}
                    Ok(Some(pending)) => {
                        self.deferred = Some(DeferredDispatch {
                            event,
                            listeners: queue,
                        });
                        return Ok(Some(pending));
                    }
                    Err(error) => debug!(%error, "listener reaction failed, skipping it"),
                }
            }
        }
    }

    /// A card-owned listener is dropped once its card has left the field or
    /// is already marked for destruction.
    fn listener_still_valid(&self, listener: &Listener) -> bool {
        match listener.card {
            Some(card) => self
                .state
                .cards
                .get(&card)
                .is_some_and(|c| c.on_field() && !c.doomed),
            None => true,
        }
    }

    /// Resolve a destroyed field card: last-words first, then listener
    /// removal and the move to the graveyard, all before any other listener
    /// sees the Destroyed event.
    fn handle_destroyed(&mut self, card: EntityId) -> GameResult<Option<PendingChoice>> {
        if !self.state.cards.get(&card).is_some_and(|c| c.on_field()) {
            return Ok(None);
        }
        let last_words: Vec<EffectClause> = self
            .state
            .card(card)?
            .clauses_with(TriggerKind::LastWords)
            .cloned()
            .collect();
        let resolution = self.resolve_list(&last_words, card, None)?;

        listeners::unregister_field_card(&self.state, &mut self.bus, &mut self.counters, card)?;
        self.state.put_in_zone(card, ZoneKind::Graveyard)?;
        debug!(%card, "destroyed");

        match resolution {
            Resolution::Suspended(pending) => Ok(Some(pending)),
            _ => Ok(None),
        }
    }

    fn run_reaction(
        &mut self,
        reaction: Reaction,
        event: &GameEvent,
    ) -> GameResult<Option<PendingChoice>> {
        match reaction {
            Reaction::ResolveClause { clause, caster } => {
                match self.resolve_list(std::slice::from_ref(&clause), caster, None)? {
                    Resolution::Suspended(pending) => Ok(Some(pending)),
                    _ => Ok(None),
                }
            }

            Reaction::TurnStartUpkeep { player } => {
                for card in self.state.field_cards(player) {
                    let Some(remaining) = self.state.card(card)?.countdown else {
                        continue;
                    };
                    let remaining = remaining - 1;
                    self.state.card_mut(card)?.countdown = Some(remaining);
                    if remaining <= 0 {
                        mark_destroyed(&mut self.state, &mut self.bus, card)?;
                    }
                }
                Ok(None)
            }

            Reaction::TurnEndClauses { player } => {
                let GameEvent::TurnEnd { player: ending, .. } = event else {
                    return Ok(None);
                };
                let wanted = if *ending == player {
                    TriggerKind::OnMyTurnEnd
                } else {
                    TriggerKind::OnOpponentsTurnEnd
                };
                // One flat list across all field cards, so a suspension
                // carries every later clause in its continuation.
                let mut items = Vec::new();
                for card in self.state.field_cards(player) {
                    items.extend(self.state.card(card)?.clauses_with(wanted).cloned().map(
                        |clause| PendingClause {
                            caster: card,
                            clause,
                            target: None,
                        },
                    ));
                }
                match self.resolve_pending(&items)? {
                    Resolution::Suspended(pending) => Ok(Some(pending)),
                    _ => Ok(None),
                }
            }

            Reaction::EnterFieldClauses { player } => {
                let GameEvent::FollowerEnterField { card: entering, .. } = event else {
                    return Ok(None);
                };
                let mut items = Vec::new();
                for card in self.state.field_cards(player) {
                    // The entering card does not react to its own arrival.
                    if card == *entering {
                        continue;
                    }
                    items.extend(
                        self.state
                            .card(card)?
                            .clauses_with(TriggerKind::OnFollowerEnterField)
                            .cloned()
                            .map(|clause| PendingClause {
                                caster: card,
                                clause,
                                target: None,
                            }),
                    );
                }
                match self.resolve_pending(&items)? {
                    Resolution::Suspended(pending) => Ok(Some(pending)),
                    _ => Ok(None),
                }
            }

            Reaction::SuperEvolvedCascade { card } => {
                // Only the first trigger kind with any clause fires.
                const PRECEDENCE: [TriggerKind; 4] = [
                    TriggerKind::OnSuperEvolve,
                    TriggerKind::SuperEvolved,
                    TriggerKind::OnEvolve,
                    TriggerKind::Evolved,
                ];
                for kind in PRECEDENCE {
                    let clauses: Vec<EffectClause> = self
                        .state
                        .card(card)?
                        .clauses_with(kind)
                        .cloned()
                        .collect();
                    if clauses.is_empty() {
                        continue;
                    }
                    return match self.resolve_list(&clauses, card, None)? {
                        Resolution::Suspended(pending) => Ok(Some(pending)),
                        _ => Ok(None),
                    };
                }
                Ok(None)
            }

            Reaction::Drain { card } => {
                let GameEvent::DamageDealtByCombat { source, amount, .. } = event else {
                    return Ok(None);
                };
                if *source == card && *amount > 0 {
                    let owner = self.state.card(card)?.owner;
                    self.state.players[owner].heal_leader(*amount);
                }
                Ok(None)
            }
        }
    }

    fn resolve_list(
        &mut self,
        clauses: &[EffectClause],
        caster: EntityId,
        explicit_target: Option<EntityId>,
    ) -> GameResult<Resolution> {
        let mut ctx = EffectContext {
            state: &mut self.state,
            bus: &mut self.bus,
            catalog: &self.catalog,
            counters: &mut self.counters,
            chooser: self.chooser.as_mut(),
        };
        resolve_clause_list(&mut ctx, clauses, caster, explicit_target)
    }

    fn resolve_pending(&mut self, items: &[PendingClause]) -> GameResult<Resolution> {
        let mut ctx = EffectContext {
            state: &mut self.state,
            bus: &mut self.bus,
            catalog: &self.catalog,
            counters: &mut self.counters,
            chooser: self.chooser.as_mut(),
        };
        resolve_pending_list(&mut ctx, items)
    }

    fn check_outcome(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        let lost = |p: &crate::core::Player| p.leader_defense <= 0 || p.pending_loss;
        let first = lost(&self.state.players[PlayerId::FIRST]);
        let second = lost(&self.state.players[PlayerId::SECOND]);
        self.outcome = match (first, second) {
            (true, true) => Some(GameOutcome::Draw),
            (true, false) => Some(GameOutcome::Winner(PlayerId::SECOND)),
            (false, true) => Some(GameOutcome::Winner(PlayerId::FIRST)),
            (false, false) => None,
        };
    }

    /// Direct effect damage entry point for scripted sequences and tests.
    pub fn deal_damage(&mut self, target: EntityId, amount: i64) -> GameResult<()> {
        let mut ctx = EffectContext {
            state: &mut self.state,
            bus: &mut self.bus,
            catalog: &self.catalog,
            counters: &mut self.counters,
            chooser: self.chooser.as_mut(),
        };
        deal_effect_damage(&mut ctx, target, amount)?;
        self.pump()
    }
}

/// Builder for a seeded game: deck lists, rng seed, and the choice channel.
pub struct GameBuilder {
    seed: u64,
    decks: PlayerPair<Vec<CardId>>,
    chooser: Option<Box<dyn ChoiceHandler>>,
}

impl GameBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            seed: 0,
            decks: PlayerPair::new(|_| Vec::new()),
            chooser: None,
        }
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set one player's deck list, in pre-shuffle order.
    #[must_use]
    pub fn deck(mut self, player: PlayerId, cards: Vec<CardId>) -> Self {
        self.decks[player] = cards;
        self
    }

    /// Replace the choice channel. Defaults to a seeded random chooser.
    #[must_use]
    pub fn chooser(mut self, chooser: Box<dyn ChoiceHandler>) -> Self {
        self.chooser = Some(chooser);
        self
    }

    /// Build the game: instantiate and shuffle both decks, draw the opening
    /// hands, and start the first player's turn.
    pub fn build(self, catalog: CardCatalog) -> GameResult<Game> {
        if !catalog.is_resolved() {
            return Err(GameError::Misconfiguration(
                "catalog references must be resolved before building a game".into(),
            ));
        }

        let mut state = GameState::new(self.seed);
        for player in PlayerId::both() {
            for card_id in &self.decks[player] {
                let definition = catalog.require(*card_id)?.clone();
                let id = state.instantiate(&definition, player);
                state.put_in_zone(id, ZoneKind::Deck)?;
            }
            state.shuffle_deck(player);
        }
        for player in PlayerId::both() {
            for _ in 0..INITIAL_HAND_SIZE {
                let _ = state.draw_card(player, None, &catalog);
            }
        }

        let chooser = self
            .chooser
            .unwrap_or_else(|| Box::new(RandomChoice::new(self.seed.wrapping_add(1))));
        let mut game = Game {
            state,
            bus: EventBus::new(),
            catalog,
            counters: ListenerCounters::new(),
            chooser,
            phase: Phase::Start,
            flow: FlowState::Resolving,
            continuation: Continuation::None,
            deferred: None,
            outcome: None,
        };
        game.begin_turn(PlayerId::FIRST)?;
        game.pump()?;
        Ok(game)
    }
}

impl Default for GameBuilder {
    fn default() -> Self {
        Self::new()
    }
}
