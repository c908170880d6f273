//! Streaming assistant-chat client core for the wardrobe app
//!
//! One consolidated implementation of the chat-stream consumer that was
//! previously duplicated across the closet, analysis, and try-on surfaces:
//! frame decoding, event interpretation, conversation state, and the
//! follow-on purchase-confirmation / try-on flows.

mod attachment;
mod client;
mod conversation;
mod dispatch;
mod error;
mod markdown;
mod protocol;

pub use attachment::{AttachmentManager, PreviewRef, StagedAttachment};
pub use client::{
    AssistantClient, AssistantConfig, Garment, HttpVisualizationApi, HttpWalletApi,
    OutgoingMessage, VisualizationApi, WalletApi,
};
pub use conversation::{
    reduce, AssistantPhase, ConversationStore, Message, Role, StoreError, TranscriptUpdate,
};
pub use dispatch::{SideEffectDispatcher, TryOnOutcome, WalletConfirmationRequest};
pub use error::{ClientError, ClientErrorKind};
pub use markdown::{parse_inline, InlineNode};
pub use protocol::{
    parse_frame, FinalPayload, FrameDecoder, OutfitItem, StreamEvent, SuggestedOutfit,
    WalletConfirmation,
};

/// Text shown in place of an assistant reply when the stream cannot be
/// opened or read. Never retried automatically.
pub const CONNECTIVITY_APOLOGY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again in a moment.";

/// Opening assistant message after a new conversation or a reset.
pub const GREETING: &str =
    "Hi! I'm your wardrobe assistant. Ask me about your closet, or upload a photo to get started.";
