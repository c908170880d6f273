//! Incremental stream frame decoding
//!
//! Network chunks do not respect frame boundaries: a read may end in the
//! middle of a frame, or in the middle of a multi-byte character. The decoder
//! buffers bytes across reads and only decodes a frame once its terminating
//! blank line has arrived, so UTF-8 state never resets per chunk.

use crate::error::ClientError;

const SEPARATOR: &[u8] = b"\n\n";

/// Splits a byte stream into complete textual frames.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of bytes, returning every frame completed by it.
    ///
    /// Frames are returned in arrival order. A trailing partial frame stays
    /// buffered until a later chunk completes it. A completed frame that is
    /// not valid UTF-8 is a stream error; the caller finalizes the in-flight
    /// message rather than retrying.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, ClientError> {
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = find_separator(&self.buf) {
            let rest = self.buf.split_off(pos + SEPARATOR.len());
            let raw = std::mem::replace(&mut self.buf, rest);

            let text = std::str::from_utf8(&raw[..pos]).map_err(|e| {
                ClientError::decode(format!("stream frame is not valid UTF-8: {e}"))
            })?;

            // Consecutive separators produce empty frames; drop them.
            if !text.trim().is_empty() {
                frames.push(text.to_string());
            }
        }
        Ok(frames)
    }

    /// Consume the decoder at end-of-stream.
    ///
    /// A conforming sender terminates every frame, so a non-empty buffer here
    /// means the stream was cut short; the remainder is discarded.
    pub fn finish(self) {
        if !self.buf.is_empty() {
            tracing::warn!(
                buffered_bytes = self.buf.len(),
                "stream ended with an unterminated partial frame, discarding"
            );
        }
    }
}

fn find_separator(buf: &[u8]) -> Option<usize> {
    buf.windows(SEPARATOR.len()).position(|w| w == SEPARATOR)
}
