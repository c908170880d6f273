//! Conversation state
//!
//! The ordered, append-only message log and the reducer applied as stream
//! events arrive. State transitions are pure (`transition::reduce`); the
//! store wraps them with the one-in-flight invariant and synchronous
//! subscriber notification.

mod message;
mod store;
mod transition;

pub use message::{AssistantPhase, Message, Role};
pub use store::{ConversationStore, StoreError, TranscriptUpdate};
pub use transition::reduce;
