//! Chat exchange driver
//!
//! Sends one chat request and consumes its chunked response stream:
//! append user message, append placeholder assistant message, then apply
//! decoded events to the store in arrival order. The consumer is a single
//! cooperatively-suspending task; all state mutation between reads is
//! synchronous. Cancellation is a cooperative check before each event
//! application, never a forced interruption.

use super::config::AssistantConfig;
use crate::attachment::{AttachmentManager, StagedAttachment};
use crate::conversation::{ConversationStore, Role, StoreError};
use crate::error::ClientError;
use crate::protocol::{parse_frame, FinalPayload, FrameDecoder, StreamEvent};
use crate::CONNECTIVITY_APOLOGY;
use base64::Engine;
use futures::StreamExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Text plus the staged attachment moved out of the manager.
///
/// Composing reads and clears the staged file in one step, so the preview
/// is released exactly once whether the send succeeds or fails.
#[derive(Debug)]
pub struct OutgoingMessage {
    pub text: String,
    pub attachment: Option<StagedAttachment>,
}

impl OutgoingMessage {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn compose(text: impl Into<String>, attachments: &mut AttachmentManager) -> Self {
        Self {
            text: text.into(),
            attachment: attachments.take(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachment: Option<AttachmentUpload>,
    history: Vec<HistoryTurn>,
}

#[derive(Serialize)]
struct AttachmentUpload {
    media_type: String,
    data: String,
}

#[derive(Serialize)]
struct HistoryTurn {
    role: &'static str,
    content: String,
}

/// Streaming chat client for the assistant backend.
pub struct AssistantClient {
    client: reqwest::Client,
    config: AssistantConfig,
}

impl AssistantClient {
    pub fn new(config: AssistantConfig) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { client, config }
    }

    /// Run one chat exchange against the store.
    ///
    /// Returns the terminal payload for the side-effect dispatcher, or
    /// `Ok(None)` when the exchange was cancelled or the stream ended
    /// without a `final` event (the stuck message is left streaming; the
    /// calling layer decides how to surface that).
    ///
    /// Rejects with a `Busy` error while another exchange is in flight.
    /// Transport, decode, and inactivity failures finalize the in-flight
    /// message with the connectivity apology and are not retried.
    pub async fn run_exchange(
        &self,
        store: &ConversationStore,
        outgoing: OutgoingMessage,
        cancel: &CancellationToken,
    ) -> Result<Option<FinalPayload>, ClientError> {
        let OutgoingMessage { text, attachment } = outgoing;

        if store.last().is_some_and(|m| m.is_in_flight()) {
            return Err(ClientError::busy("assistant is still responding"));
        }

        // Prior turns only; the outgoing message travels in `message`.
        let history = build_history(&store.completed_turns());

        let preview_url = attachment.as_ref().map(|a| a.preview.url().to_string());
        store
            .append_user_message(&text, preview_url)
            .map_err(map_store_error)?;
        let message_id = store.begin_assistant_message().map_err(map_store_error)?;

        let body = ChatRequest {
            message: &text,
            attachment: attachment.as_ref().map(encode_upload),
            history,
        };

        tracing::info!(message_id = %message_id, has_attachment = attachment.is_some(), "opening chat stream");

        let response = self
            .client
            .post(self.config.chat_url())
            .bearer_auth(&self.config.bearer_token)
            .json(&body)
            .send()
            .await;
        // The staged file has been read into the request; release its preview.
        drop(attachment);

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                let err = super::transport_error("chat stream open failed", &e);
                return Err(self.finalize(store, err));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let err = super::classify_status(status, &body);
            return Err(self.finalize(store, err));
        }

        self.consume_stream(store, response, cancel).await
    }

    async fn consume_stream(
        &self,
        store: &ConversationStore,
        response: reqwest::Response,
        cancel: &CancellationToken,
    ) -> Result<Option<FinalPayload>, ClientError> {
        let mut stream = response.bytes_stream();
        let mut decoder = FrameDecoder::new();
        let mut final_payload = None;

        loop {
            let read = tokio::time::timeout(self.config.idle_timeout, stream.next()).await;
            let bytes = match read {
                Err(_) => {
                    let err = ClientError::transport(format!(
                        "assistant stream stalled for {}s",
                        self.config.idle_timeout.as_secs()
                    ));
                    return Err(self.finalize(store, err));
                }
                Ok(None) => break,
                Ok(Some(Err(e))) => {
                    let err = super::transport_error("chat stream read failed", &e);
                    return Err(self.finalize(store, err));
                }
                Ok(Some(Ok(bytes))) => bytes,
            };

            let frames = match decoder.push(&bytes) {
                Ok(frames) => frames,
                Err(err) => return Err(self.finalize(store, err)),
            };

            for frame in frames {
                // The view may have been torn down mid-stream; stop before
                // applying anything further.
                if cancel.is_cancelled() {
                    tracing::debug!("exchange cancelled, stopping event application");
                    return Ok(None);
                }
                if let Some(event) = parse_frame(&frame) {
                    if let StreamEvent::Final(payload) = &event {
                        final_payload = Some(payload.clone());
                    }
                    store.apply_event(&event);
                }
            }

            // The exchange is over once the terminal event has been
            // applied. Some senders hold the connection open afterwards;
            // waiting on them would turn a completed exchange into an
            // inactivity failure.
            if final_payload.is_some() {
                break;
            }
        }

        decoder.finish();

        if final_payload.is_none() {
            // Stream ended cleanly but never delivered a final event. The
            // message stays streaming; the calling layer treats this as a
            // timeout and may append a new error message, never mutate it.
            tracing::warn!("chat stream ended without a final event");
        }
        Ok(final_payload)
    }

    /// Finalize the in-flight message with apology text and pass the
    /// error through. No automatic retry.
    fn finalize(&self, store: &ConversationStore, err: ClientError) -> ClientError {
        tracing::error!(error = %err, "chat stream failed, finalizing in-flight message");
        store.fail_in_flight(CONNECTIVITY_APOLOGY);
        err
    }
}

fn build_history(turns: &[(Role, String)]) -> Vec<HistoryTurn> {
    turns
        .iter()
        .map(|(role, content)| HistoryTurn {
            role: match role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: content.clone(),
        })
        .collect()
}

fn encode_upload(attachment: &StagedAttachment) -> AttachmentUpload {
    AttachmentUpload {
        media_type: attachment.media_type.clone(),
        data: base64::engine::general_purpose::STANDARD.encode(&attachment.bytes),
    }
}

fn map_store_error(e: StoreError) -> ClientError {
    match e {
        StoreError::StillResponding => ClientError::busy("assistant is still responding"),
        StoreError::EmptyMessage => ClientError::invalid_input("message is empty"),
    }
}
