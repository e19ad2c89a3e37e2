//! Event bus: game events, listeners, and the FIFO dispatch queue.

pub mod bus;
pub mod event;

pub use bus::{EventBus, Listener, ListenerCondition, ListenerId, Reaction};
pub use event::{EventKind, GameEvent};
