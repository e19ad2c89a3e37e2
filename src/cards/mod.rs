//! Card system: effect clauses, definitions, the catalog, and instances.
//!
//! ## Key Types
//!
//! - `EffectClause`: one ability clause (trigger, target, process, payload)
//! - `CardDefinition`: immutable catalog record
//! - `CardCatalog`: definition lookup with two-phase reference resolution
//! - `CardInstance`: runtime card state (stats, flags, live clause list)

pub mod catalog;
pub mod clause;
pub mod definition;
pub mod instance;

pub use catalog::CardCatalog;
pub use clause::{ClauseCondition, EffectClause, Process, TriggerKind};
pub use definition::{CardDefinition, CardId, CardRef, CardType};
pub use instance::CardInstance;
