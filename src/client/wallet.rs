//! Wallet-spend collaborator

use super::config::AssistantConfig;
use crate::error::ClientError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Wallet endpoint seam.
///
/// A non-2xx response surfaces the server-provided error text to the
/// confirmation prompt; it never throws past the dispatcher.
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// Debit the wallet, returning the new balance as reported by the
    /// server.
    async fn spend(&self, amount: f64, item_name: &str) -> Result<f64, ClientError>;
}

#[derive(Serialize)]
struct SpendRequest<'a> {
    amount: f64,
    item_name: &'a str,
}

#[derive(Deserialize)]
struct SpendResponse {
    balance: f64,
}

pub struct HttpWalletApi {
    client: reqwest::Client,
    config: AssistantConfig,
}

impl HttpWalletApi {
    pub fn new(config: AssistantConfig) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { client, config }
    }
}

#[async_trait]
impl WalletApi for HttpWalletApi {
    async fn spend(&self, amount: f64, item_name: &str) -> Result<f64, ClientError> {
        let response = self
            .client
            .post(self.config.wallet_url())
            .bearer_auth(&self.config.bearer_token)
            .json(&SpendRequest { amount, item_name })
            .send()
            .await
            .map_err(|e| super::transport_error("wallet request failed", &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| super::transport_error("wallet response read failed", &e))?;

        if !status.is_success() {
            return Err(super::classify_status(status, &body));
        }

        let parsed: SpendResponse = serde_json::from_str(&body)
            .map_err(|e| ClientError::decode(format!("unexpected wallet response: {e}")))?;
        Ok(parsed.balance)
    }
}
