//! The card catalog.
//!
//! Definitions are loaded in two phases: register everything first, then a
//! resolution pass rewrites every name-based card reference into a resolved
//! id. A reference that cannot be resolved is logged and its clause becomes
//! a permanent no-op; the simulation never crashes over bad catalog data.

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::error::{GameError, GameResult};

use super::clause::{EffectClause, Process};
use super::definition::{CardDefinition, CardId, CardRef};

/// Immutable store of card definitions, keyed by id with a name index.
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    definitions: FxHashMap<CardId, CardDefinition>,
    by_name: FxHashMap<String, CardId>,
    resolved: bool,
}

impl CardCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. Duplicate ids or names are misconfigurations.
    pub fn register(&mut self, definition: CardDefinition) -> GameResult<()> {
        if self.definitions.contains_key(&definition.id) {
            return Err(GameError::Misconfiguration(format!(
                "duplicate card id {}",
                definition.id
            )));
        }
        if self.by_name.contains_key(&definition.name) {
            return Err(GameError::Misconfiguration(format!(
                "duplicate card name '{}'",
                definition.name
            )));
        }
        self.by_name
            .insert(definition.name.clone(), definition.id);
        self.definitions.insert(definition.id, definition);
        self.resolved = false;
        Ok(())
    }

    /// Second load phase: rewrite every `CardRef::Named` into a resolved id.
    ///
    /// Clauses holding a name with no matching definition are demoted to
    /// inert no-ops with a warning, once, at load time.
    pub fn resolve_references(&mut self) {
        let by_name = self.by_name.clone();
        for definition in self.definitions.values_mut() {
            let card_name = definition.name.clone();
            for clause in definition.clauses_mut() {
                if !resolve_clause(clause, &by_name) {
                    warn!(
                        card = %card_name,
                        "clause references an unknown card; treating it as a no-op"
                    );
                    clause.process = None;
                }
            }
        }
        self.resolved = true;
    }

    /// Whether the resolution pass has run since the last registration.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Look up a definition by id.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.definitions.get(&id)
    }

    /// Look up a definition by id, as a `GameResult`.
    pub fn require(&self, id: CardId) -> GameResult<&CardDefinition> {
        self.get(id)
            .ok_or_else(|| GameError::Misconfiguration(format!("unknown card id {id}")))
    }

    /// Look up a definition id by name.
    #[must_use]
    pub fn id_by_name(&self, name: &str) -> Option<CardId> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Resolve every card reference inside a clause, recursing into nested
/// clauses. Returns `false` if any reference failed to resolve.
fn resolve_clause(clause: &mut EffectClause, by_name: &FxHashMap<String, CardId>) -> bool {
    match &mut clause.process {
        Some(Process::AddCardToHand { card, .. })
        | Some(Process::Summon { card, .. })
        | Some(Process::ReplaceDeck { card }) => resolve_ref(card, by_name),
        Some(Process::AddEffect { clause: nested }) => resolve_clause(nested, by_name),
        Some(Process::Choose { options }) => {
            let mut ok = true;
            for option in options {
                ok &= resolve_clause(option, by_name);
            }
            ok
        }
        _ => true,
    }
}

fn resolve_ref(card: &mut CardRef, by_name: &FxHashMap<String, CardId>) -> bool {
    match card {
        CardRef::Resolved(_) => true,
        CardRef::Named(name) => match by_name.get(name.as_str()) {
            Some(id) => {
                *card = CardRef::Resolved(*id);
                true
            }
            None => false,
        },
    }
}
