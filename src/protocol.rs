//! Chat-stream wire protocol
//!
//! The backend answers a chat request with a chunked text stream of frames.
//! `frame` turns raw bytes into blank-line delimited frames; `event` turns a
//! frame into one of the closed set of protocol events.

mod event;
mod frame;

#[cfg(test)]
mod proptests;

pub use event::{
    parse_frame, FinalPayload, OutfitItem, StreamEvent, SuggestedOutfit, WalletConfirmation,
};
pub use frame::FrameDecoder;
