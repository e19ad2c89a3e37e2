//! Legality checks for player actions.
//!
//! Pure predicates over [`crate::core::GameState`]; nothing here mutates.
//! The orchestrator consults these before every action so that rejected
//! actions leave no trace.

pub mod engine;

pub use engine::{
    can_activate_amulet, can_attack, can_attack_leader, can_evolve, can_play_card,
    can_super_evolve, can_target_follower,
};
