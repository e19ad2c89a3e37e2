//! Effect resolution: targeting, the choice channel, and the processor.
//!
//! - `TargetKind` / `resolve_targets`: turn a clause's target specifier
//!   into an ordered entity list
//! - `ChoiceHandler`: external supplier of player picks for choice-style
//!   targeting
//! - `resolve_clause` / `resolve_clause_list`: apply clauses to targets,
//!   surfacing `Choose` processes as suspended continuations

pub mod choice;
pub mod processor;
pub mod targeting;

pub use choice::{ChoiceHandler, FirstChoice, RandomChoice};
pub use processor::{
    deal_effect_damage, mark_destroyed, resolve_clause, resolve_clause_list,
    resolve_pending_list, EffectContext, PendingChoice, PendingClause, Resolution,
};
pub use targeting::{resolve_targets, TargetKind};
