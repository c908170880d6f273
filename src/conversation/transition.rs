//! Pure message reducer
//!
//! `(message, event) -> message` with no I/O, so the per-message state
//! machine is unit-testable without a network or rendering environment.

use super::message::{AssistantPhase, Message};
use crate::protocol::StreamEvent;

/// Apply one stream event to a message.
///
/// A `Complete` message is immutable: every event against it returns the
/// message unchanged, which guards against stray delayed events from an
/// aborted earlier exchange. `status` replaces the progress label, `chunk`
/// appends text, `final` replaces accumulated content wholesale.
pub fn reduce(message: &Message, event: &StreamEvent) -> Message {
    if message.is_complete() {
        tracing::debug!(message_id = %message.id, "dropping event for completed message");
        return message.clone();
    }

    let mut next = message.clone();
    match event {
        StreamEvent::Status { label } => {
            next.status = Some(label.clone());
            next.phase = AssistantPhase::Streaming;
        }
        StreamEvent::Chunk { text } => {
            next.text.push_str(text);
            next.phase = AssistantPhase::Streaming;
        }
        StreamEvent::Final(payload) => {
            next.text = payload.response.clone();
            next.images = payload.images.clone();
            next.suggested_outfits = payload.suggested_outfits.clone();
            next.status = None;
            next.phase = AssistantPhase::Complete;
        }
    }
    next
}
