//! Client error types

use thiserror::Error;

/// Classified error for network and protocol failures.
///
/// Nothing in this crate treats these as fatal: transport failures finalize
/// the in-flight message with apology text, collaborator failures degrade to
/// data on the request object.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ClientError {
    pub kind: ClientErrorKind,
    pub message: String,
}

impl ClientError {
    pub fn new(kind: ClientErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Transport, message)
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Http, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Auth, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Decode, message)
    }

    pub fn busy(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Busy, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::InvalidInput, message)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    /// Stream open/read failed or stalled past the inactivity window
    Transport,
    /// Non-2xx response from a collaborator endpoint
    Http,
    /// Missing or rejected bearer credential (401, 403)
    Auth,
    /// Response bytes could not be decoded as text
    Decode,
    /// An exchange is already in flight ("still responding")
    Busy,
    /// Caller-level validation failure (empty message, nothing staged)
    InvalidInput,
}

impl ClientErrorKind {
    /// Whether the failure should finalize the in-flight message rather
    /// than surface as a prompt-level error.
    pub fn finalizes_stream(self) -> bool {
        matches!(self, Self::Transport | Self::Decode)
    }
}
