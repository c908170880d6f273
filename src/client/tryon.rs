//! Try-on visualization collaborator

use super::config::AssistantConfig;
use crate::error::ClientError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One garment reference in a visualization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Garment {
    pub id: String,
    pub image_reference: String,
    pub body_region: String,
}

/// Visualization endpoint seam.
///
/// Failure is recoverable: the dispatcher falls back to a non-rendered
/// layout, it never aborts the conversation.
#[async_trait]
pub trait VisualizationApi: Send + Sync {
    /// Render the garments onto the user, returning a rendered-image
    /// reference.
    async fn render(&self, garments: &[Garment]) -> Result<String, ClientError>;
}

#[derive(Deserialize)]
struct RenderResponse {
    rendered_image: String,
}

pub struct HttpVisualizationApi {
    client: reqwest::Client,
    config: AssistantConfig,
}

impl HttpVisualizationApi {
    pub fn new(config: AssistantConfig) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { client, config }
    }
}

#[async_trait]
impl VisualizationApi for HttpVisualizationApi {
    async fn render(&self, garments: &[Garment]) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.config.tryon_url())
            .bearer_auth(&self.config.bearer_token)
            .json(&garments)
            .send()
            .await
            .map_err(|e| super::transport_error("visualization request failed", &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| super::transport_error("visualization response read failed", &e))?;

        if !status.is_success() {
            return Err(super::classify_status(status, &body));
        }

        let parsed: RenderResponse = serde_json::from_str(&body)
            .map_err(|e| ClientError::decode(format!("unexpected visualization response: {e}")))?;
        Ok(parsed.rendered_image)
    }
}
