//! The targeting resolver.
//!
//! `resolve_targets` turns a clause's target kind into an ordered list of
//! entity ids. Veil and Ambush exclude a follower from single, choice, and
//! random targeting but never from the mass "all X" kinds; that asymmetry
//! is deliberate and relied upon by card rulings.

use serde::{Deserialize, Serialize};

use crate::cards::{CardCatalog, CardInstance, ClauseCondition, TriggerKind};
use crate::core::{EntityId, GameState, PlayerId};
use crate::error::GameResult;

use super::choice::ChoiceHandler;

/// Where a clause's process applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// The card carrying the clause.
    Itself,
    OwnLeader,
    OpponentLeader,
    /// One allied follower, player-chosen.
    AllyFollower,
    /// One opposing follower, player-chosen.
    OpponentFollower,
    RandomAllyFollower,
    RandomOpponentFollower,
    /// Two distinct opposing followers, player-chosen. Fewer than two
    /// eligible candidates fizzles the clause entirely.
    TwoOpponentFollowers,
    AllAllyFollowers,
    AllOtherAllyFollowers,
    AllOpponentFollowers,
    /// The opposing follower with the highest attack; ties break randomly.
    HighestAttackOpponentFollower,
    /// A card in the owner's hand, player-chosen.
    HandCard,
    /// An allied follower that has not evolved, player-chosen.
    UnevolvedAllyFollower,
}

/// Whether an ability may single out this follower.
fn targetable_by_ability(card: &CardInstance) -> bool {
    !card.has_keyword(TriggerKind::Veil) && !card.has_keyword(TriggerKind::Ambush)
}

fn admitted(
    state: &GameState,
    catalog: &CardCatalog,
    filter: Option<&ClauseCondition>,
    id: EntityId,
) -> bool {
    let Some(cond) = filter else {
        return true;
    };
    let Ok(card) = state.card(id) else {
        return false;
    };
    let name = catalog
        .get(card.card_id)
        .map(|d| d.name.as_str())
        .unwrap_or("");
    cond.admits(card.card_type, card.cost, name)
}

/// Followers on `player`'s field, optionally restricted to ability targets.
fn followers(
    state: &GameState,
    catalog: &CardCatalog,
    player: PlayerId,
    filter: Option<&ClauseCondition>,
    single_target: bool,
) -> Vec<EntityId> {
    state
        .followers_on_field(player)
        .into_iter()
        .filter(|&id| {
            let Ok(card) = state.card(id) else {
                return false;
            };
            (!single_target || targetable_by_ability(card))
                && admitted(state, catalog, filter, id)
        })
        .collect()
}

/// Compute the ordered target list for a clause.
///
/// Choice-style kinds consult the external choice handler; random kinds use
/// the game RNG. An empty return means the clause fizzles.
pub fn resolve_targets(
    state: &mut GameState,
    catalog: &CardCatalog,
    kind: TargetKind,
    caster: EntityId,
    filter: Option<&ClauseCondition>,
    chooser: &mut dyn ChoiceHandler,
) -> GameResult<Vec<EntityId>> {
    let owner = match state.card(caster) {
        Ok(card) => card.owner,
        // A leader never casts; fall back to the active player.
        Err(_) => state.active_player,
    };
    let opponent = owner.opponent();

    let targets = match kind {
        TargetKind::Itself => vec![caster],
        TargetKind::OwnLeader => vec![EntityId::player(owner)],
        TargetKind::OpponentLeader => vec![EntityId::player(opponent)],
        TargetKind::AllyFollower => {
            let candidates = followers(state, catalog, owner, filter, true);
            chooser.choose_targets(&candidates, 1)
        }
        TargetKind::OpponentFollower => {
            let candidates = followers(state, catalog, opponent, filter, true);
            chooser.choose_targets(&candidates, 1)
        }
        TargetKind::RandomAllyFollower => {
            let candidates = followers(state, catalog, owner, filter, true);
            state.rng.choose(&candidates).map(|&id| vec![id]).unwrap_or_default()
        }
        TargetKind::RandomOpponentFollower => {
            let candidates = followers(state, catalog, opponent, filter, true);
            state.rng.choose(&candidates).map(|&id| vec![id]).unwrap_or_default()
        }
        TargetKind::TwoOpponentFollowers => {
            let candidates = followers(state, catalog, opponent, filter, true);
            if candidates.len() < 2 {
                Vec::new()
            } else {
                chooser.choose_targets(&candidates, 2)
            }
        }
        TargetKind::AllAllyFollowers => followers(state, catalog, owner, filter, false),
        TargetKind::AllOtherAllyFollowers => followers(state, catalog, owner, filter, false)
            .into_iter()
            .filter(|&id| id != caster)
            .collect(),
        TargetKind::AllOpponentFollowers => followers(state, catalog, opponent, filter, false),
        TargetKind::HighestAttackOpponentFollower => {
            let candidates = followers(state, catalog, opponent, filter, true);
            let best = candidates
                .iter()
                .filter_map(|&id| state.card(id).ok().map(|c| c.attack))
                .max();
            match best {
                None => Vec::new(),
                Some(top) => {
                    let tied: Vec<EntityId> = candidates
                        .into_iter()
                        .filter(|&id| state.card(id).is_ok_and(|c| c.attack == top))
                        .collect();
                    state.rng.choose(&tied).map(|&id| vec![id]).unwrap_or_default()
                }
            }
        }
        TargetKind::HandCard => {
            let candidates: Vec<EntityId> = state.zones[owner]
                .hand
                .cards()
                .iter()
                .copied()
                .filter(|&id| admitted(state, catalog, filter, id))
                .collect();
            chooser.choose_targets(&candidates, 1)
        }
        TargetKind::UnevolvedAllyFollower => {
            let candidates: Vec<EntityId> = followers(state, catalog, owner, filter, true)
                .into_iter()
                .filter(|&id| state.card(id).is_ok_and(|c| !c.evolved))
                .collect();
            chooser.choose_targets(&candidates, 1)
        }
    };

    Ok(targets)
}
