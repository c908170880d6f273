//! Backend collaborators
//!
//! HTTP clients for the chat stream, the try-on visualization endpoint, and
//! the wallet-spend endpoint. Every request carries the bearer credential
//! from [`AssistantConfig`]; obtaining or refreshing that credential is
//! handled outside this crate.

mod chat;
mod config;
mod tryon;
mod wallet;

pub use chat::{AssistantClient, OutgoingMessage};
pub use config::AssistantConfig;
pub use tryon::{Garment, HttpVisualizationApi, VisualizationApi};
pub use wallet::{HttpWalletApi, WalletApi};

use crate::error::ClientError;

/// Map a non-2xx collaborator response to a recoverable error carrying the
/// server-provided text.
pub(crate) fn classify_status(status: reqwest::StatusCode, body: &str) -> ClientError {
    match status.as_u16() {
        401 | 403 => ClientError::auth(format!("authentication failed: {body}")),
        _ => ClientError::http(format!("HTTP {status}: {body}")),
    }
}

/// Map a reqwest send/read failure to a transport error.
pub(crate) fn transport_error(context: &str, e: &reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::transport(format!("{context}: request timed out: {e}"))
    } else if e.is_connect() {
        ClientError::transport(format!("{context}: connection failed: {e}"))
    } else {
        ClientError::transport(format!("{context}: {e}"))
    }
}
