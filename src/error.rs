//! Error taxonomy for the simulation core.
//!
//! Rule Engine rejections surface as [`GameError::InvalidAction`] with a
//! typed [`ActionDenied`] reason and never mutate state. The remaining
//! variants cover the recoverable runtime failures: entities that vanished
//! mid-resolution, exhausted decks, and malformed catalog entries.

use crate::core::EntityId;
use thiserror::Error;

/// Result alias used across the crate.
pub type GameResult<T> = Result<T, GameError>;

/// Top-level error type for all fallible engine operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// A player-initiated action failed rule validation. No state changed.
    #[error("action rejected: {0}")]
    InvalidAction(ActionDenied),

    /// An entity id does not resolve to a live entity.
    #[error("no such entity: {0}")]
    MissingEntity(EntityId),

    /// A resource pool or zone could not supply what was asked of it.
    #[error("resource exhausted: {0}")]
    ResourceExhaustion(String),

    /// A catalog entry is malformed. Detected at load time.
    #[error("catalog misconfiguration: {0}")]
    Misconfiguration(String),
}

/// Reasons the Rule Engine or Orchestrator can reject an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ActionDenied {
    #[error("it is not this player's turn")]
    NotYourTurn,
    #[error("the game has already ended")]
    GameFinished,
    #[error("a choice is pending and must be resolved first")]
    ChoicePending,
    #[error("no choice is pending")]
    NoPendingChoice,
    #[error("selection index out of range")]
    InvalidSelection,
    #[error("card is not in hand")]
    NotInHand,
    #[error("card is not on the field")]
    NotOnField,
    #[error("card is not a follower")]
    NotAFollower,
    #[error("card is not an amulet")]
    NotAnAmulet,
    #[error("not enough play points")]
    InsufficientPp,
    #[error("the field is full")]
    FieldFull,
    #[error("follower has already attacked this turn")]
    AlreadyAttacked,
    #[error("follower was summoned this turn")]
    SummoningSickness,
    #[error("cannot attack an allied follower")]
    OwnFollower,
    #[error("follower cannot be targeted")]
    Untargetable,
    #[error("a ward follower must be attacked first")]
    WardInTheWay,
    #[error("amulet was already activated this turn")]
    AlreadyActivated,
    #[error("card has no activate ability")]
    NoActivateClause,
    #[error("follower is already evolved")]
    AlreadyEvolved,
    #[error("no evolution points remaining")]
    NoEvolutionPoints,
    #[error("no super-evolution points remaining")]
    NoSuperEvolutionPoints,
    #[error("already evolved a follower this turn")]
    EvolvedThisTurn,
    #[error("enhance cost does not match any clause or cannot be paid")]
    InvalidEnhanceCost,
}

impl From<ActionDenied> for GameError {
    fn from(reason: ActionDenied) -> Self {
        GameError::InvalidAction(reason)
    }
}
