//! Effect clauses.
//!
//! A card's abilities are an ordered list of `EffectClause` values: closed
//! tagged variants of trigger-kind, target-kind, and process-kind with a
//! typed payload per process. Clauses are immutable once loaded from the
//! catalog; only the countdown payload mutates, and it does so on the card
//! instance rather than here.

use serde::{Deserialize, Serialize};

use crate::bus::EventKind;
use crate::effects::TargetKind;

use super::definition::{CardRef, CardType};

/// Keyword and trigger kinds a clause can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKind {
    // Keywords: passive while the card is in play.
    Ward,
    Rush,
    Storm,
    Barrier,
    Bane,
    Drain,
    Intimidate,
    Ambush,
    Veil,
    Countdown,
    // Triggered abilities.
    Fanfare,
    Enhance,
    LastWords,
    OnEvolve,
    Evolved,
    OnSuperEvolve,
    SuperEvolved,
    Activate,
    Spell,
    Spellboost,
    OnMyTurnEnd,
    OnOpponentsTurnEnd,
    OnFollowerEnterField,
    Clash,
    Strike,
}

impl TriggerKind {
    /// Whether this kind is a passive keyword rather than a triggered
    /// ability.
    #[must_use]
    pub const fn is_keyword(self) -> bool {
        matches!(
            self,
            TriggerKind::Ward
                | TriggerKind::Rush
                | TriggerKind::Storm
                | TriggerKind::Barrier
                | TriggerKind::Bane
                | TriggerKind::Drain
                | TriggerKind::Intimidate
                | TriggerKind::Ambush
                | TriggerKind::Veil
                | TriggerKind::Countdown
        )
    }

    /// The event kind a card on the field must listen for so this clause
    /// can fire, if it is event-driven at all.
    ///
    /// Spell clauses resolve directly at cast time and `LastWords` fires
    /// inside destruction handling, so those need no subscription.
    #[must_use]
    pub const fn listen_kind(self) -> Option<EventKind> {
        match self {
            TriggerKind::Countdown => Some(EventKind::TurnStart),
            TriggerKind::OnMyTurnEnd | TriggerKind::OnOpponentsTurnEnd => Some(EventKind::TurnEnd),
            TriggerKind::OnFollowerEnterField => Some(EventKind::FollowerEnterField),
            TriggerKind::OnEvolve | TriggerKind::Evolved => Some(EventKind::FollowerEvolved),
            TriggerKind::OnSuperEvolve | TriggerKind::SuperEvolved => {
                Some(EventKind::FollowerSuperEvolved)
            }
            TriggerKind::Activate => Some(EventKind::AmuletActivated),
            TriggerKind::Spellboost => Some(EventKind::SpellCast),
            TriggerKind::Clash => Some(EventKind::CombatInitiated),
            TriggerKind::Strike => Some(EventKind::AttackDeclared),
            TriggerKind::Drain => Some(EventKind::DamageDealtByCombat),
            TriggerKind::Fanfare | TriggerKind::Enhance => Some(EventKind::CardPlayed),
            _ => None,
        }
    }
}

/// What a clause does to each of its targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Process {
    /// Add to attack, and to current and max defense.
    StatBuff { attack: i64, defense: i64 },
    Draw { count: u32 },
    Heal { amount: i64 },
    AddCardToHand { card: CardRef, count: u32 },
    Summon { card: CardRef, count: u32 },
    DealDamage { amount: i64 },
    Destroy,
    RecoverPp { amount: i64 },
    SuperEvolve,
    /// Replace the target owner's deck with copies of one card.
    ReplaceDeck { card: CardRef },
    SetMaxHealth { amount: i64 },
    AddEffect { clause: Box<EffectClause> },
    RemoveKeyword { keyword: TriggerKind },
    ReturnToDeck,
    ReturnToHand,
    /// Re-invoke all of the target's clauses with the nested trigger kind.
    TriggerEffect { trigger: TriggerKind },
    /// Present the options to the player; resolution suspends until chosen.
    Choose { options: Vec<EffectClause> },
}

/// Predicate restricting which cards a clause may act on, evaluated against
/// the card's definition. Used by draw filters and hand-card targeting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClauseCondition {
    CostAtMost(i64),
    CostAtLeast(i64),
    CardTypeIs(CardType),
    NameIs(String),
}

impl ClauseCondition {
    /// Whether a card with the given type, cost, and name passes.
    #[must_use]
    pub fn admits(&self, card_type: CardType, cost: i64, name: &str) -> bool {
        match self {
            ClauseCondition::CostAtMost(max) => cost <= *max,
            ClauseCondition::CostAtLeast(min) => cost >= *min,
            ClauseCondition::CardTypeIs(wanted) => card_type == *wanted,
            ClauseCondition::NameIs(wanted) => name == wanted,
        }
    }
}

/// One ability clause of a card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectClause {
    pub trigger: TriggerKind,
    /// Where the process applies. `None` means the owning card itself.
    pub target: Option<TargetKind>,
    /// What happens. `None` marks a pure keyword or an inert clause.
    pub process: Option<Process>,
    /// PP cost, for Activate clauses.
    pub cost: Option<i64>,
    /// Alternate cost gating an enhanced firing of this clause.
    pub enhance_cost: Option<i64>,
    pub condition: Option<ClauseCondition>,
    /// Starting countdown, for Countdown keyword clauses.
    pub countdown: Option<i64>,
}

impl EffectClause {
    /// A pure keyword clause (Ward, Storm, Barrier, ...).
    #[must_use]
    pub fn keyword(kind: TriggerKind) -> Self {
        Self {
            trigger: kind,
            target: None,
            process: None,
            cost: None,
            enhance_cost: None,
            condition: None,
            countdown: None,
        }
    }

    /// A Countdown keyword with its starting value.
    #[must_use]
    pub fn countdown(turns: i64) -> Self {
        Self {
            countdown: Some(turns),
            ..Self::keyword(TriggerKind::Countdown)
        }
    }

    /// A triggered ability with a target and a process.
    #[must_use]
    pub fn triggered(trigger: TriggerKind, target: TargetKind, process: Process) -> Self {
        Self {
            trigger,
            target: Some(target),
            process: Some(process),
            cost: None,
            enhance_cost: None,
            condition: None,
            countdown: None,
        }
    }

    /// A triggered ability that acts on the owning card itself.
    #[must_use]
    pub fn on_self(trigger: TriggerKind, process: Process) -> Self {
        Self {
            trigger,
            target: None,
            process: Some(process),
            cost: None,
            enhance_cost: None,
            condition: None,
            countdown: None,
        }
    }

    /// Attach a PP cost (Activate clauses).
    #[must_use]
    pub fn with_cost(mut self, cost: i64) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Gate this clause behind an enhanced play cost.
    #[must_use]
    pub fn with_enhance_cost(mut self, cost: i64) -> Self {
        self.enhance_cost = Some(cost);
        self
    }

    /// Attach an eligibility condition.
    #[must_use]
    pub fn with_condition(mut self, condition: ClauseCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Whether this clause is the given passive keyword.
    #[must_use]
    pub fn is_keyword(&self, kind: TriggerKind) -> bool {
        self.trigger == kind && kind.is_keyword()
    }
}
