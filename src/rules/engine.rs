//! Action legality predicates.
//!
//! Every public function here is a pure check: it reads state, returns
//! `Ok(())` or a typed [`ActionDenied`] reason, and never mutates anything.
//! The orchestrator runs the relevant predicate before applying an action's
//! mutation, so a rejection always leaves state untouched.

use crate::cards::{CardInstance, TriggerKind};
use crate::core::{EntityId, GameState, PlayerId};
use crate::error::ActionDenied;

/// Whether a player may play a card from hand.
///
/// `enhanced_cost` selects an enhanced firing: it must match the
/// `enhance_cost` of at least one of the card's clauses, and the player
/// pays that amount instead of the printed cost.
pub fn can_play_card(
    state: &GameState,
    player: PlayerId,
    card: EntityId,
    use_extra_pp: bool,
    enhanced_cost: Option<i64>,
) -> Result<(), ActionDenied> {
    let instance = card_of(state, card)?;
    if instance.owner != player || !state.zones[player].hand.contains(card) {
        return Err(ActionDenied::NotInHand);
    }

    let cost = match enhanced_cost {
        Some(cost) => {
            let gated = instance
                .clauses()
                .iter()
                .any(|c| c.enhance_cost == Some(cost));
            if !gated {
                return Err(ActionDenied::InvalidEnhanceCost);
            }
            cost
        }
        None => instance.cost,
    };
    if !state.players[player].can_pay(cost, use_extra_pp) {
        return Err(ActionDenied::InsufficientPp);
    }

    // Followers and amulets need a field slot. Spells never occupy one.
    if !matches!(instance.card_type, crate::cards::CardType::Spell)
        && state.zones[player].field.is_full()
    {
        return Err(ActionDenied::FieldFull);
    }
    Ok(())
}

/// Whether a follower is ready to attack at all, independent of its target.
///
/// A follower summoned this turn may attack the leader only with Storm, and
/// may attack followers with Storm, Rush, or once evolved. Past that turn
/// readiness is gated only by having already attacked.
pub fn can_attack(
    state: &GameState,
    player: PlayerId,
    attacker: EntityId,
    targets_leader: bool,
) -> Result<(), ActionDenied> {
    let instance = card_of(state, attacker)?;
    if instance.owner != player || !instance.on_field() {
        return Err(ActionDenied::NotOnField);
    }
    if !instance.is_follower() {
        return Err(ActionDenied::NotAFollower);
    }
    if instance.engaged {
        return Err(ActionDenied::AlreadyAttacked);
    }
    if instance.summoned_this_turn {
        let ready = if targets_leader {
            instance.has_keyword(TriggerKind::Storm)
        } else {
            instance.has_keyword(TriggerKind::Storm)
                || instance.has_keyword(TriggerKind::Rush)
                || instance.evolved
        };
        if !ready {
            return Err(ActionDenied::SummoningSickness);
        }
    }
    Ok(())
}

/// Whether a follower may be chosen as the defender of an attack.
///
/// Rejects allied targets and Intimidate/Ambush holders. While any Ward
/// follower stands on the defending field, only Ward holders are legal.
pub fn can_target_follower(
    state: &GameState,
    attacker: EntityId,
    target: EntityId,
) -> Result<(), ActionDenied> {
    let attacking = card_of(state, attacker)?;
    let defending = card_of(state, target)?;
    if !defending.is_follower() || !defending.on_field() {
        return Err(ActionDenied::NotOnField);
    }
    if defending.owner == attacking.owner {
        return Err(ActionDenied::OwnFollower);
    }
    if defending.has_keyword(TriggerKind::Intimidate)
        || defending.has_keyword(TriggerKind::Ambush)
    {
        return Err(ActionDenied::Untargetable);
    }
    if state.has_ward(defending.owner) && !defending.has_keyword(TriggerKind::Ward) {
        return Err(ActionDenied::WardInTheWay);
    }
    Ok(())
}

/// Whether the defending leader may be attacked directly. Any Ward follower
/// on the defending field forbids it.
pub fn can_attack_leader(state: &GameState, defender: PlayerId) -> Result<(), ActionDenied> {
    if state.has_ward(defender) {
        return Err(ActionDenied::WardInTheWay);
    }
    Ok(())
}

/// Whether a player may activate an amulet's Activate ability this turn.
pub fn can_activate_amulet(
    state: &GameState,
    player: PlayerId,
    card: EntityId,
) -> Result<(), ActionDenied> {
    let instance = card_of(state, card)?;
    if instance.owner != player || !instance.on_field() {
        return Err(ActionDenied::NotOnField);
    }
    if !instance.is_amulet() {
        return Err(ActionDenied::NotAnAmulet);
    }
    if instance.activated {
        return Err(ActionDenied::AlreadyActivated);
    }
    let Some(clause) = instance.clauses_with(TriggerKind::Activate).next() else {
        return Err(ActionDenied::NoActivateClause);
    };
    if let Some(cost) = clause.cost {
        if !state.players[player].can_pay(cost, false) {
            return Err(ActionDenied::InsufficientPp);
        }
    }
    Ok(())
}

/// Whether a player may evolve a follower.
pub fn can_evolve(
    state: &GameState,
    player: PlayerId,
    card: EntityId,
) -> Result<(), ActionDenied> {
    let record = &state.players[player];
    if record.ep <= 0 {
        return Err(ActionDenied::NoEvolutionPoints);
    }
    if record.spent_ep_this_turn {
        return Err(ActionDenied::EvolvedThisTurn);
    }
    evolvable_follower(state, player, card)?;
    if card_of(state, card)?.evolved {
        return Err(ActionDenied::AlreadyEvolved);
    }
    Ok(())
}

/// Whether a player may super-evolve a follower.
pub fn can_super_evolve(
    state: &GameState,
    player: PlayerId,
    card: EntityId,
) -> Result<(), ActionDenied> {
    let record = &state.players[player];
    if record.sep <= 0 {
        return Err(ActionDenied::NoSuperEvolutionPoints);
    }
    if record.spent_sep_this_turn {
        return Err(ActionDenied::EvolvedThisTurn);
    }
    evolvable_follower(state, player, card)?;
    if card_of(state, card)?.super_evolved {
        return Err(ActionDenied::AlreadyEvolved);
    }
    Ok(())
}

fn evolvable_follower(
    state: &GameState,
    player: PlayerId,
    card: EntityId,
) -> Result<(), ActionDenied> {
    let instance = card_of(state, card)?;
    if instance.owner != player || !instance.on_field() {
        return Err(ActionDenied::NotOnField);
    }
    if !instance.is_follower() {
        return Err(ActionDenied::NotAFollower);
    }
    Ok(())
}

fn card_of(state: &GameState, id: EntityId) -> Result<&CardInstance, ActionDenied> {
    state.cards.get(&id).ok_or(ActionDenied::NotOnField)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{
        CardCatalog, CardDefinition, CardId, CardType, EffectClause, Process, TriggerKind,
    };
    use crate::core::ZoneKind;
    use crate::effects::TargetKind;

    fn follower(id: u32, name: &str, cost: i64) -> CardDefinition {
        CardDefinition::follower(CardId(id), name, cost, 2, 2)
    }

    fn place(
        state: &mut GameState,
        def: &CardDefinition,
        owner: PlayerId,
        zone: ZoneKind,
    ) -> EntityId {
        let id = state.instantiate(def, owner);
        state.put_in_zone(id, zone).unwrap();
        id
    }

    fn ready(state: &mut GameState, id: EntityId) {
        state.cards.get_mut(&id).unwrap().summoned_this_turn = false;
    }

    #[test]
    fn test_play_card_requires_hand_and_pp() {
        let def = follower(1, "Knight", 3);
        let mut state = GameState::new(1);
        let in_hand = place(&mut state, &def, PlayerId::FIRST, ZoneKind::Hand);

        assert_eq!(
            can_play_card(&state, PlayerId::FIRST, in_hand, false, None),
            Err(ActionDenied::InsufficientPp)
        );

        state.players[PlayerId::FIRST].max_pp = 3;
        state.players[PlayerId::FIRST].pp = 3;
        assert_eq!(
            can_play_card(&state, PlayerId::FIRST, in_hand, false, None),
            Ok(())
        );
        assert_eq!(
            can_play_card(&state, PlayerId::SECOND, in_hand, false, None),
            Err(ActionDenied::NotInHand)
        );
    }

    #[test]
    fn test_play_card_extra_pp_covers_one_point() {
        let def = follower(1, "Knight", 4);
        let mut state = GameState::new(1);
        let card = place(&mut state, &def, PlayerId::FIRST, ZoneKind::Hand);
        state.players[PlayerId::FIRST].max_pp = 3;
        state.players[PlayerId::FIRST].pp = 3;
        state.players[PlayerId::FIRST].gain_extra_pp(1);

        assert_eq!(
            can_play_card(&state, PlayerId::FIRST, card, false, None),
            Err(ActionDenied::InsufficientPp)
        );
        assert_eq!(
            can_play_card(&state, PlayerId::FIRST, card, true, None),
            Ok(())
        );
    }

    #[test]
    fn test_play_follower_needs_field_slot() {
        let def = follower(1, "Knight", 0);
        let mut state = GameState::new(1);
        let card = place(&mut state, &def, PlayerId::FIRST, ZoneKind::Hand);
        for _ in 0..5 {
            place(&mut state, &def, PlayerId::FIRST, ZoneKind::Field);
        }

        assert_eq!(
            can_play_card(&state, PlayerId::FIRST, card, false, None),
            Err(ActionDenied::FieldFull)
        );
    }

    #[test]
    fn test_enhanced_cost_must_match_a_clause() {
        let def = follower(1, "Mage", 1).with_clause(
            EffectClause::triggered(
                TriggerKind::Enhance,
                TargetKind::OpponentLeader,
                Process::DealDamage { amount: 3 },
            )
            .with_enhance_cost(5),
        );
        let mut state = GameState::new(1);
        let card = place(&mut state, &def, PlayerId::FIRST, ZoneKind::Hand);
        state.players[PlayerId::FIRST].max_pp = 6;
        state.players[PlayerId::FIRST].pp = 6;

        assert_eq!(
            can_play_card(&state, PlayerId::FIRST, card, false, Some(5)),
            Ok(())
        );
        assert_eq!(
            can_play_card(&state, PlayerId::FIRST, card, false, Some(4)),
            Err(ActionDenied::InvalidEnhanceCost)
        );
    }

    #[test]
    fn test_summoning_sickness_matrix() {
        let plain = follower(1, "Plain", 1);
        let mut state = GameState::new(1);
        let attacker = place(&mut state, &plain, PlayerId::FIRST, ZoneKind::Field);
        state.cards.get_mut(&attacker).unwrap().summoned_this_turn = true;

        assert_eq!(
            can_attack(&state, PlayerId::FIRST, attacker, true),
            Err(ActionDenied::SummoningSickness)
        );
        assert_eq!(
            can_attack(&state, PlayerId::FIRST, attacker, false),
            Err(ActionDenied::SummoningSickness)
        );

        // Rush unlocks follower targets only.
        state
            .cards
            .get_mut(&attacker)
            .unwrap()
            .add_clause(EffectClause::keyword(TriggerKind::Rush));
        assert_eq!(
            can_attack(&state, PlayerId::FIRST, attacker, true),
            Err(ActionDenied::SummoningSickness)
        );
        assert_eq!(can_attack(&state, PlayerId::FIRST, attacker, false), Ok(()));

        // Storm unlocks everything.
        state
            .cards
            .get_mut(&attacker)
            .unwrap()
            .add_clause(EffectClause::keyword(TriggerKind::Storm));
        assert_eq!(can_attack(&state, PlayerId::FIRST, attacker, true), Ok(()));
    }

    #[test]
    fn test_engaged_follower_cannot_attack_again() {
        let def = follower(1, "Knight", 1);
        let mut state = GameState::new(1);
        let attacker = place(&mut state, &def, PlayerId::FIRST, ZoneKind::Field);
        ready(&mut state, attacker);
        state.cards.get_mut(&attacker).unwrap().engaged = true;

        assert_eq!(
            can_attack(&state, PlayerId::FIRST, attacker, true),
            Err(ActionDenied::AlreadyAttacked)
        );
    }

    #[test]
    fn test_ward_gates_follower_and_leader_targets() {
        let plain = follower(1, "Plain", 1);
        let warder =
            follower(2, "Warder", 1).with_clause(EffectClause::keyword(TriggerKind::Ward));
        let mut state = GameState::new(1);
        let attacker = place(&mut state, &plain, PlayerId::FIRST, ZoneKind::Field);
        let big = place(&mut state, &plain, PlayerId::SECOND, ZoneKind::Field);
        let guard = place(&mut state, &warder, PlayerId::SECOND, ZoneKind::Field);
        ready(&mut state, attacker);

        assert_eq!(
            can_target_follower(&state, attacker, big),
            Err(ActionDenied::WardInTheWay)
        );
        assert_eq!(can_target_follower(&state, attacker, guard), Ok(()));
        assert_eq!(
            can_attack_leader(&state, PlayerId::SECOND),
            Err(ActionDenied::WardInTheWay)
        );

        // Once the Ward follower is gone, both open up.
        state.put_in_zone(guard, ZoneKind::Graveyard).unwrap();
        assert_eq!(can_target_follower(&state, attacker, big), Ok(()));
        assert_eq!(can_attack_leader(&state, PlayerId::SECOND), Ok(()));
    }

    #[test]
    fn test_cannot_target_own_or_concealed_followers() {
        let plain = follower(1, "Plain", 1);
        let sneak =
            follower(2, "Sneak", 1).with_clause(EffectClause::keyword(TriggerKind::Ambush));
        let mut state = GameState::new(1);
        let attacker = place(&mut state, &plain, PlayerId::FIRST, ZoneKind::Field);
        let ally = place(&mut state, &plain, PlayerId::FIRST, ZoneKind::Field);
        let hidden = place(&mut state, &sneak, PlayerId::SECOND, ZoneKind::Field);

        assert_eq!(
            can_target_follower(&state, attacker, ally),
            Err(ActionDenied::OwnFollower)
        );
        assert_eq!(
            can_target_follower(&state, attacker, hidden),
            Err(ActionDenied::Untargetable)
        );
    }

    #[test]
    fn test_activate_amulet_checks() {
        let amulet = CardDefinition::amulet(CardId(1), "Altar", 2).with_clause(
            EffectClause::triggered(
                TriggerKind::Activate,
                TargetKind::OwnLeader,
                Process::Heal { amount: 2 },
            )
            .with_cost(1),
        );
        let bare = CardDefinition::amulet(CardId(2), "Idol", 1);
        let mut state = GameState::new(1);
        let altar = place(&mut state, &amulet, PlayerId::FIRST, ZoneKind::Field);
        let idol = place(&mut state, &bare, PlayerId::FIRST, ZoneKind::Field);

        assert_eq!(
            can_activate_amulet(&state, PlayerId::FIRST, altar),
            Err(ActionDenied::InsufficientPp)
        );

        state.players[PlayerId::FIRST].max_pp = 1;
        state.players[PlayerId::FIRST].pp = 1;
        assert_eq!(can_activate_amulet(&state, PlayerId::FIRST, altar), Ok(()));
        assert_eq!(
            can_activate_amulet(&state, PlayerId::FIRST, idol),
            Err(ActionDenied::NoActivateClause)
        );

        state.cards.get_mut(&altar).unwrap().activated = true;
        assert_eq!(
            can_activate_amulet(&state, PlayerId::FIRST, altar),
            Err(ActionDenied::AlreadyActivated)
        );
    }

    #[test]
    fn test_evolution_gating() {
        let def = follower(1, "Knight", 1);
        let mut state = GameState::new(1);
        let card = place(&mut state, &def, PlayerId::FIRST, ZoneKind::Field);

        assert_eq!(
            can_evolve(&state, PlayerId::FIRST, card),
            Err(ActionDenied::NoEvolutionPoints)
        );

        state.players[PlayerId::FIRST].gain_ep(2);
        assert_eq!(can_evolve(&state, PlayerId::FIRST, card), Ok(()));

        state.players[PlayerId::FIRST].spent_ep_this_turn = true;
        assert_eq!(
            can_evolve(&state, PlayerId::FIRST, card),
            Err(ActionDenied::EvolvedThisTurn)
        );

        state.players[PlayerId::FIRST].spent_ep_this_turn = false;
        state.cards.get_mut(&card).unwrap().evolve();
        assert_eq!(
            can_evolve(&state, PlayerId::FIRST, card),
            Err(ActionDenied::AlreadyEvolved)
        );
    }

    #[test]
    fn test_super_evolution_gating() {
        let def = follower(1, "Knight", 1);
        let mut state = GameState::new(1);
        let card = place(&mut state, &def, PlayerId::FIRST, ZoneKind::Field);
        state.players[PlayerId::FIRST].gain_sep(2);

        assert_eq!(can_super_evolve(&state, PlayerId::FIRST, card), Ok(()));

        // An already-evolved follower can still super-evolve.
        state.cards.get_mut(&card).unwrap().evolve();
        assert_eq!(can_super_evolve(&state, PlayerId::FIRST, card), Ok(()));

        state.cards.get_mut(&card).unwrap().super_evolve();
        assert_eq!(
            can_super_evolve(&state, PlayerId::FIRST, card),
            Err(ActionDenied::AlreadyEvolved)
        );
    }

    #[test]
    fn test_spell_never_needs_a_field_slot() {
        let spell = CardDefinition::spell(CardId(3), "Bolt", 1).with_clause(
            EffectClause::triggered(
                TriggerKind::Spell,
                TargetKind::OpponentLeader,
                Process::DealDamage { amount: 2 },
            ),
        );
        let mut catalog = CardCatalog::new();
        catalog.register(spell.clone()).unwrap();
        catalog.resolve_references();

        let filler = follower(1, "Plain", 0);
        let mut state = GameState::new(1);
        let card = place(&mut state, &spell, PlayerId::FIRST, ZoneKind::Hand);
        for _ in 0..5 {
            place(&mut state, &filler, PlayerId::FIRST, ZoneKind::Field);
        }
        state.players[PlayerId::FIRST].max_pp = 1;
        state.players[PlayerId::FIRST].pp = 1;

        assert_eq!(spell.card_type, CardType::Spell);
        assert_eq!(
            can_play_card(&state, PlayerId::FIRST, card, false, None),
            Ok(())
        );
    }
}
