//! Aggregate game state.
//!
//! `GameState` owns everything that defines a position: both player records,
//! both players' zones, every live card instance, the turn counter, and the
//! deterministic RNG. It exposes the primitive mutations (entity allocation,
//! zone movement, drawing); rule checks and event publication live in the
//! layers above.

use rustc_hash::FxHashMap;

use crate::cards::{CardCatalog, CardDefinition, CardInstance, ClauseCondition};
use crate::error::{GameError, GameResult};

use super::entity::EntityId;
use super::player::{Player, PlayerId, PlayerPair};
use super::rng::GameRng;
use super::zone::{PlayerZones, ZoneKind};

/// The complete mutable state of a game in progress.
#[derive(Clone, Debug)]
pub struct GameState {
    pub players: PlayerPair<Player>,
    pub zones: PlayerPair<PlayerZones>,
    pub cards: FxHashMap<EntityId, CardInstance>,
    pub rng: GameRng,
    pub active_player: PlayerId,
    /// Global turn counter, starting at 1 and incremented every turn start.
    pub turn_number: u32,
    next_entity_id: u32,
}

impl GameState {
    /// A fresh state with empty zones and the given RNG seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            players: PlayerPair::new(|_| Player::new()),
            zones: PlayerPair::new(|_| PlayerZones::new()),
            cards: FxHashMap::default(),
            rng: GameRng::new(seed),
            active_player: PlayerId::FIRST,
            turn_number: 0,
            next_entity_id: EntityId::first_card(),
        }
    }

    /// Allocate a fresh entity id.
    pub fn alloc_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    /// Create a card instance from a definition. The card starts in no
    /// zone; callers place it immediately.
    pub fn instantiate(&mut self, definition: &CardDefinition, owner: PlayerId) -> EntityId {
        let id = self.alloc_entity();
        let instance = CardInstance::from_definition(id, definition, owner);
        self.cards.insert(id, instance);
        id
    }

    /// Look up a card instance.
    pub fn card(&self, id: EntityId) -> GameResult<&CardInstance> {
        self.cards.get(&id).ok_or(GameError::MissingEntity(id))
    }

    /// Look up a card instance mutably.
    pub fn card_mut(&mut self, id: EntityId) -> GameResult<&mut CardInstance> {
        self.cards.get_mut(&id).ok_or(GameError::MissingEntity(id))
    }

    /// Whether an id still refers to a live entity. Leaders always do.
    #[must_use]
    pub fn entity_alive(&self, id: EntityId) -> bool {
        id.is_player() || self.cards.get(&id).is_some_and(|c| c.zone.is_some())
    }

    /// Detach a card from whatever zone holds it.
    pub fn remove_from_zone(&mut self, id: EntityId) -> GameResult<()> {
        let card = self.card(id)?;
        let owner = card.owner;
        if let Some(kind) = card.zone {
            self.zones[owner].zone_mut(kind).remove(id);
            self.card_mut(id)?.zone = None;
        }
        Ok(())
    }

    /// Place a card into one of its owner's zones, detaching it from its
    /// current zone first. A full Hand or Field routes the card to the
    /// Graveyard instead. Returns the zone the card actually landed in.
    pub fn put_in_zone(&mut self, id: EntityId, kind: ZoneKind) -> GameResult<ZoneKind> {
        self.remove_from_zone(id)?;
        let owner = self.card(id)?.owner;

        let landed = if self.zones[owner].zone_mut(kind).push(id) {
            kind
        } else {
            // Graveyards are unbounded so this cannot fail.
            self.zones[owner].zone_mut(ZoneKind::Graveyard).push(id);
            ZoneKind::Graveyard
        };
        self.card_mut(id)?.zone = Some(landed);
        Ok(landed)
    }

    /// Place a card on top of its owner's deck.
    pub fn put_on_deck_top(&mut self, id: EntityId) -> GameResult<()> {
        self.remove_from_zone(id)?;
        let owner = self.card(id)?.owner;
        self.zones[owner].deck.push_top(id);
        self.card_mut(id)?.zone = Some(ZoneKind::Deck);
        Ok(())
    }

    /// Shuffle a player's deck.
    pub fn shuffle_deck(&mut self, player: PlayerId) {
        let mut cards = self.zones[player].deck.take_all();
        self.rng.shuffle(&mut cards);
        for card in cards {
            self.zones[player].deck.push(card);
        }
    }

    /// Draw the topmost eligible card into the player's hand.
    ///
    /// With a filter, the topmost card admitted by it is taken and cards
    /// above it stay in place. No eligible card sets the pending-loss flag
    /// and draws nothing; it never errors. A full hand routes the drawn
    /// card to the graveyard.
    pub fn draw_card(
        &mut self,
        player: PlayerId,
        filter: Option<&ClauseCondition>,
        catalog: &CardCatalog,
    ) -> Option<EntityId> {
        let drawn = self.zones[player].deck.cards().iter().copied().find(|&id| {
            let Some(card) = self.cards.get(&id) else {
                return false;
            };
            match filter {
                None => true,
                Some(cond) => {
                    let name = catalog
                        .get(card.card_id)
                        .map(|d| d.name.as_str())
                        .unwrap_or("");
                    cond.admits(card.card_type, card.cost, name)
                }
            }
        });

        match drawn {
            Some(id) => {
                // put_in_zone only fails for missing entities, checked above.
                let _ = self.put_in_zone(id, ZoneKind::Hand);
                Some(id)
            }
            None => {
                self.players[player].pending_loss = true;
                None
            }
        }
    }

    /// Entity ids of a player's field, in field order.
    #[must_use]
    pub fn field_cards(&self, player: PlayerId) -> Vec<EntityId> {
        self.zones[player].field.cards().to_vec()
    }

    /// Entity ids of a player's followers on the field, in field order.
    #[must_use]
    pub fn followers_on_field(&self, player: PlayerId) -> Vec<EntityId> {
        self.zones[player]
            .field
            .cards()
            .iter()
            .copied()
            .filter(|id| self.cards.get(id).is_some_and(CardInstance::is_follower))
            .collect()
    }

    /// Whether a player has a Ward follower on the field.
    #[must_use]
    pub fn has_ward(&self, player: PlayerId) -> bool {
        use crate::cards::TriggerKind;
        self.followers_on_field(player)
            .iter()
            .any(|&id| self.cards.get(&id).is_some_and(|c| c.has_keyword(TriggerKind::Ward)))
    }
}
