//! Conversation state store
//!
//! Owns the append-only message log behind a mutex, enforces the
//! one-in-flight invariant, and notifies subscribers synchronously after
//! every mutation so transcript views re-render in event order.

use super::message::{Message, Role};
use super::transition::reduce;
use crate::protocol::StreamEvent;
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors surfaced to callers of the store's public operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The last message is still streaming; only one exchange may be in
    /// flight. Callers reject the send rather than queueing.
    #[error("assistant is still responding")]
    StillResponding,
    /// Empty text with nothing staged.
    #[error("message is empty")]
    EmptyMessage,
}

/// Notification sent to subscribers after each mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptUpdate {
    Appended { index: usize },
    Mutated { index: usize },
    Reset,
}

pub struct ConversationStore {
    messages: Mutex<Vec<Message>>,
    updates: broadcast::Sender<TranscriptUpdate>,
    greeting: String,
}

impl ConversationStore {
    pub fn new(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        let (updates, _) = broadcast::channel(64);
        Self {
            messages: Mutex::new(vec![Message::assistant_complete(greeting.clone())]),
            updates,
            greeting,
        }
    }

    /// Subscribe to transcript updates. `broadcast::Sender::send` is
    /// synchronous, so updates arrive in event-application order.
    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptUpdate> {
        self.updates.subscribe()
    }

    /// Snapshot of the transcript.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn last(&self) -> Option<Message> {
        self.lock().last().cloned()
    }

    /// Completed turns as `(role, text)` pairs for the outgoing request's
    /// history, in transcript order. In-flight messages are excluded.
    pub fn completed_turns(&self) -> Vec<(Role, String)> {
        self.lock()
            .iter()
            .filter(|m| m.is_complete())
            .map(|m| (m.role, m.text.clone()))
            .collect()
    }

    /// Append an immutable user message.
    pub fn append_user_message(
        &self,
        text: &str,
        attachment_preview: Option<String>,
    ) -> Result<usize, StoreError> {
        if text.trim().is_empty() && attachment_preview.is_none() {
            return Err(StoreError::EmptyMessage);
        }
        let index = {
            let mut messages = self.lock();
            messages.push(Message::user(text, attachment_preview));
            messages.len() - 1
        };
        self.notify(TranscriptUpdate::Appended { index });
        Ok(index)
    }

    /// Append a placeholder assistant message, returning its id.
    ///
    /// Errors if the previous last message is not complete: at most one
    /// message may be in flight, and it is always the last element.
    pub fn begin_assistant_message(&self) -> Result<String, StoreError> {
        let (id, index) = {
            let mut messages = self.lock();
            if messages.last().is_some_and(Message::is_in_flight) {
                return Err(StoreError::StillResponding);
            }
            let message = Message::assistant_pending();
            let id = message.id.clone();
            messages.push(message);
            (id, messages.len() - 1)
        };
        self.notify(TranscriptUpdate::Appended { index });
        Ok(id)
    }

    /// Route one stream event to the in-flight message.
    ///
    /// A no-op when the last message is already complete (stray delayed
    /// events from an aborted exchange). Subscribers are notified after
    /// every application, synchronously and in order.
    pub fn apply_event(&self, event: &StreamEvent) {
        let index = {
            let mut messages = self.lock();
            let Some(last) = messages.last_mut() else {
                return;
            };
            *last = reduce(last, event);
            messages.len() - 1
        };
        self.notify(TranscriptUpdate::Mutated { index });
    }

    /// Append a completed assistant message with fixed text (wallet debit
    /// acknowledgement). Skipped if an exchange is in flight, keeping the
    /// in-flight message the last element.
    pub fn append_assistant_note(&self, text: &str) -> Option<usize> {
        let index = {
            let mut messages = self.lock();
            if messages.last().is_some_and(Message::is_in_flight) {
                tracing::warn!("dropping assistant note: an exchange is in flight");
                return None;
            }
            messages.push(Message::assistant_complete(text));
            messages.len() - 1
        };
        self.notify(TranscriptUpdate::Appended { index });
        Some(index)
    }

    /// Finalize the in-flight message with static text.
    ///
    /// Transport-failure path: the message becomes complete with the given
    /// text and no status, images, or suggestions. A no-op when nothing is
    /// in flight.
    pub fn fail_in_flight(&self, text: &str) {
        let index = {
            let mut messages = self.lock();
            let Some(last) = messages.last_mut().filter(|m| m.is_in_flight()) else {
                return;
            };
            last.text = text.to_string();
            last.status = None;
            last.phase = super::message::AssistantPhase::Complete;
            messages.len() - 1
        };
        self.notify(TranscriptUpdate::Mutated { index });
    }

    /// Set a progress label on a message by id.
    ///
    /// Returns false when the message no longer exists, so callers that
    /// outlive the conversation view (the try-on flow) degrade quietly.
    pub fn set_status(&self, message_id: &str, label: &str) -> bool {
        let index = {
            let mut messages = self.lock();
            let Some(index) = messages.iter().position(|m| m.id == message_id) else {
                return false;
            };
            messages[index].status = Some(label.to_string());
            index
        };
        self.notify(TranscriptUpdate::Mutated { index });
        true
    }

    /// Clear the progress label on a message by id, if it still exists.
    pub fn clear_status(&self, message_id: &str) {
        let index = {
            let mut messages = self.lock();
            let Some(index) = messages.iter().position(|m| m.id == message_id) else {
                return;
            };
            messages[index].status = None;
            index
        };
        self.notify(TranscriptUpdate::Mutated { index });
    }

    /// Clear history back to the initial greeting.
    pub fn reset(&self) {
        {
            let mut messages = self.lock();
            messages.clear();
            messages.push(Message::assistant_complete(self.greeting.clone()));
        }
        self.notify(TranscriptUpdate::Reset);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Message>> {
        // Mutations are panic-free, so poisoning only follows a caller bug.
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn notify(&self, update: TranscriptUpdate) {
        // No subscribers is fine (headless tests, torn-down views).
        let _ = self.updates.send(update);
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(crate::GREETING)
    }
}
