//! Staged attachment management
//!
//! At most one pending local file per outgoing message. The preview
//! reference owns a release hook (revoking the local object URL in the
//! embedding surface) that must run exactly once on every exit path:
//! replace, clear, or send. RAII makes that discipline structural.

/// A derived preview reference for a staged file.
///
/// Dropping the reference runs the release hook. The URL string itself may
/// be cloned onto the user message; only the handle is scoped.
pub struct PreviewRef {
    url: String,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl PreviewRef {
    pub fn new(url: impl Into<String>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            url: url.into(),
            release: Some(Box::new(release)),
        }
    }

    /// A preview with no underlying local object to release.
    pub fn unmanaged(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            release: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewRef {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for PreviewRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewRef")
            .field("url", &self.url)
            .field("managed", &self.release.is_some())
            .finish()
    }
}

/// An owned local file plus its preview, awaiting the next outgoing message.
#[derive(Debug)]
pub struct StagedAttachment {
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub preview: PreviewRef,
}

/// Tracks the single staged attachment for a chat surface.
#[derive(Debug, Default)]
pub struct AttachmentManager {
    current: Option<StagedAttachment>,
}

impl AttachmentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a file, replacing and releasing any existing one.
    pub fn stage(&mut self, bytes: Vec<u8>, media_type: impl Into<String>, preview: PreviewRef) {
        if self.current.is_some() {
            tracing::debug!("replacing previously staged attachment");
        }
        // Dropping the old value releases its preview.
        self.current = Some(StagedAttachment {
            bytes,
            media_type: media_type.into(),
            preview,
        });
    }

    /// Release the current preview and forget the staged file.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Move the staged attachment out for sending.
    ///
    /// The send path calls this exactly once; the preview is released when
    /// the returned value drops, whether the send succeeds or fails.
    pub fn take(&mut self) -> Option<StagedAttachment> {
        self.current.take()
    }

    pub fn staged(&self) -> Option<&StagedAttachment> {
        self.current.as_ref()
    }
}
