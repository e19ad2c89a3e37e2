//! # duelcore
//!
//! Deterministic simulation core for a two-player card duel: followers,
//! spells, and amulets contest a board of bounded zones while a FIFO event
//! bus carries every trigger.
//!
//! ## Architecture
//!
//! - **Event bus**: all consequences flow through queued events drained
//!   breadth-first; listeners live exactly as long as their card holds the
//!   field.
//! - **Typed effect clauses**: card abilities are closed tagged variants of
//!   {trigger, target, process}, dispatched by exhaustive match.
//! - **Suspend/resume choices**: a `Choose` process parks the game in
//!   `AwaitingChoice` until the presentation layer answers; nothing inside
//!   the engine blocks.
//! - **Determinism**: one seeded RNG drives shuffles, random targeting, and
//!   tie-breaks, so a seed plus an action log replays a whole game.
//!
//! ## Modules
//!
//! - `core`: entity ids, players, zones, RNG, aggregate state
//! - `cards`: the catalog, definitions, clauses, and runtime instances
//! - `bus`: events, listeners, and the FIFO queue
//! - `effects`: targeting, the choice channel, and the effect processor
//! - `rules`: pure action-legality predicates
//! - `game`: the orchestrator state machine and listener lifecycle

pub mod bus;
pub mod cards;
pub mod core;
pub mod effects;
pub mod error;
pub mod game;
pub mod rules;

pub use crate::core::{
    EntityId, GameRng, GameRngState, GameState, Player, PlayerId, PlayerPair, ZoneKind,
    MAX_FIELD_SIZE, MAX_HAND_SIZE,
};

pub use crate::cards::{
    CardCatalog, CardDefinition, CardId, CardInstance, CardRef, CardType, ClauseCondition,
    EffectClause, Process, TriggerKind,
};

pub use crate::bus::{EventBus, EventKind, GameEvent, Listener, ListenerCondition, ListenerId};

pub use crate::effects::{
    ChoiceHandler, FirstChoice, PendingChoice, RandomChoice, Resolution, TargetKind,
};

pub use crate::error::{ActionDenied, GameError, GameResult};

pub use crate::game::{Game, GameBuilder, GameOutcome, Phase};
