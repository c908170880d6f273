//! Protocol event interpretation
//!
//! A frame carries `data: ` followed by a JSON payload with a `kind`
//! discriminator and a `content` field. Frames without the prefix and frames
//! whose payload does not parse are skipped, never fatal: one corrupt event
//! must not lose text already applied to the in-flight message.

use serde::{Deserialize, Serialize};

/// Literal tag each event frame starts with.
const DATA_PREFIX: &str = "data: ";

/// Closed set of events a chat response stream can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Replace the in-flight message's progress label.
    Status { label: String },
    /// Append a text fragment to the in-flight message.
    Chunk { text: String },
    /// Replace the in-flight message wholesale and mark it complete.
    Final(FinalPayload),
}

impl StreamEvent {
    pub fn is_final(&self) -> bool {
        matches!(self, StreamEvent::Final(_))
    }
}

/// Terminal payload of an exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalPayload {
    pub response: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub suggested_outfits: Vec<SuggestedOutfit>,
    #[serde(default)]
    pub wallet_confirmation: Option<WalletConfirmation>,
}

/// An actionable outfit suggestion attached to a completed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedOutfit {
    pub name: String,
    pub score: f64,
    #[serde(default)]
    pub item_details: Vec<OutfitItem>,
}

/// One garment reference inside a suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitItem {
    pub id: String,
    pub image_reference: String,
    pub body_region: String,
    /// Not yet owned; the currently analyzed photo stands in for a closet
    /// image when building a try-on request.
    #[serde(default)]
    pub prospective: bool,
}

/// Purchase-confirmation detail on a terminal payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletConfirmation {
    pub required: bool,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub current_balance: f64,
}

/// Wire shape: `{"kind": "...", "content": ...}`.
#[derive(Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
enum RawEvent {
    Status(String),
    Chunk(String),
    Final(FinalPayload),
}

/// Interpret one decoded frame.
///
/// Returns `None` for frames without the `data: ` prefix (unknown framing is
/// tolerated for forward compatibility) and for payloads that fail to parse.
pub fn parse_frame(frame: &str) -> Option<StreamEvent> {
    let payload = frame.strip_prefix(DATA_PREFIX)?;

    match serde_json::from_str::<RawEvent>(payload.trim()) {
        Ok(RawEvent::Status(label)) => Some(StreamEvent::Status { label }),
        Ok(RawEvent::Chunk(text)) => Some(StreamEvent::Chunk { text }),
        Ok(RawEvent::Final(payload)) => Some(StreamEvent::Final(payload)),
        Err(e) => {
            tracing::debug!(error = %e, "skipping malformed event frame");
            None
        }
    }
}
