//! Client configuration

use std::time::Duration;

/// Configuration for the assistant backend.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Base URL of the wardrobe backend, no trailing slash.
    pub base_url: String,
    /// Bearer credential attached to every request. Supplied by the
    /// surrounding auth layer; an empty token means the backend will 401
    /// and the surface redirects to sign-in.
    pub bearer_token: String,
    /// Connect timeout for opening a request.
    pub connect_timeout: Duration,
    /// Inactivity window for the chat stream. The protocol has no
    /// heartbeat, so a sender that stalls past this window finalizes the
    /// message with the connectivity apology.
    pub idle_timeout: Duration,
}

impl AssistantConfig {
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: bearer_token.into(),
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(60),
        }
    }

    pub fn from_env() -> Self {
        let base_url = std::env::var("WARDROBE_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let bearer_token = std::env::var("WARDROBE_API_TOKEN").unwrap_or_default();

        let mut config = Self::new(base_url, bearer_token);
        if let Some(secs) = env_secs("WARDROBE_STREAM_IDLE_TIMEOUT_SECS") {
            config.idle_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_secs("WARDROBE_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout = Duration::from_secs(secs);
        }
        config
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/assistant/chat", self.base_url)
    }

    pub fn tryon_url(&self) -> String {
        format!("{}/api/tryon/visualize", self.base_url)
    }

    pub fn wallet_url(&self) -> String {
        format!("{}/api/wallet/spend", self.base_url)
    }
}

fn env_secs(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
