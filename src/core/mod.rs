//! Core engine types: entities, players, zones, state, and RNG.
//!
//! These are the pure data holders of the simulation. Rule checks, effect
//! resolution, and event flow are layered on top of them.

pub mod entity;
pub mod player;
pub mod rng;
pub mod state;
pub mod zone;

pub use entity::{EntityId, PLAYER_COUNT};
pub use player::{
    Player, PlayerId, PlayerPair, LEADER_STARTING_DEFENSE, MAX_EP, MAX_EXTRA_PP, MAX_PP_CAP,
    MAX_SEP,
};
pub use rng::{GameRng, GameRngState};
pub use state::GameState;
pub use zone::{PlayerZones, Zone, ZoneKind, MAX_FIELD_SIZE, MAX_HAND_SIZE};
