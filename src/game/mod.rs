//! Game orchestration: the turn state machine and listener lifecycle.

pub mod listeners;
pub mod orchestrator;

pub use listeners::ListenerCounters;
pub use orchestrator::{
    FlowState, Game, GameBuilder, GameOutcome, Phase, EP_GRANT_TURNS, EXTRA_PP_GRANT_TURNS,
    INITIAL_HAND_SIZE, SEP_GRANT_TURNS,
};
