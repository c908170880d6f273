//! Message types

use crate::protocol::SuggestedOutfit;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Lifecycle phase of an assistant message.
///
/// `Pending` -> `Streaming` (status/chunk applications) -> `Complete`
/// (exactly one final application). There is no path out of `Complete`.
/// User messages are created `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssistantPhase {
    #[default]
    Pending,
    Streaming,
    Complete,
}

/// One turn in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    /// Accumulated content. Grows by append for a streaming assistant
    /// message, set once for a user message.
    pub text: String,
    /// Preview reference for a locally staged image; user messages only.
    pub attachment_preview: Option<String>,
    /// Progress label, present only mid-stream. Cleared on completion.
    pub status: Option<String>,
    /// Image references attached by the terminal payload.
    pub images: Vec<String>,
    /// Actionable suggestions attached by the terminal payload.
    pub suggested_outfits: Vec<SuggestedOutfit>,
    pub phase: AssistantPhase,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>, attachment_preview: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            text: text.into(),
            attachment_preview,
            status: None,
            images: Vec::new(),
            suggested_outfits: Vec::new(),
            phase: AssistantPhase::Complete,
            created_at: Utc::now(),
        }
    }

    /// A placeholder assistant message awaiting its first stream event.
    pub fn assistant_pending() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            text: String::new(),
            attachment_preview: None,
            status: None,
            images: Vec::new(),
            suggested_outfits: Vec::new(),
            phase: AssistantPhase::Pending,
            created_at: Utc::now(),
        }
    }

    /// A completed assistant message with fixed text (greeting, wallet
    /// acknowledgement, connectivity apology).
    pub fn assistant_complete(text: impl Into<String>) -> Self {
        Self {
            phase: AssistantPhase::Complete,
            ..Self::assistant_pending().with_text(text)
        }
    }

    fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn is_complete(&self) -> bool {
        self.phase == AssistantPhase::Complete
    }

    /// An assistant message still owned by the stream consumer.
    pub fn is_in_flight(&self) -> bool {
        self.role == Role::Assistant && !self.is_complete()
    }
}
