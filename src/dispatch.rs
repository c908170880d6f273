//! Side-effect dispatch
//!
//! Inspects terminal payloads and raises the follow-on flows: wallet
//! purchase confirmation and virtual try-on. Collaborator failures are
//! recoverable data, never conversation-fatal. The dispatcher is
//! parameterized by the collaborator seams so each UI surface injects
//! what it needs (confirmation vs. none, try-on vs. none).

mod tryon;
mod wallet;

pub use tryon::TryOnOutcome;
pub use wallet::WalletConfirmationRequest;

use crate::client::{Garment, VisualizationApi, WalletApi};
use crate::conversation::ConversationStore;
use crate::error::ClientError;
use crate::protocol::{FinalPayload, SuggestedOutfit};
use std::sync::{Arc, Mutex};

/// Label shown on the originating message while a try-on render is
/// outstanding.
const TRY_ON_STATUS: &str = "putting the look together...";

pub struct SideEffectDispatcher {
    store: Arc<ConversationStore>,
    wallet: Arc<dyn WalletApi>,
    visualizer: Arc<dyn VisualizationApi>,
    /// Last known wallet balance, refreshed from server responses.
    balance: Mutex<f64>,
    /// The currently analyzed photo, substituted for prospective items.
    analyzed_image: Mutex<Option<String>>,
}

impl SideEffectDispatcher {
    pub fn new(
        store: Arc<ConversationStore>,
        wallet: Arc<dyn WalletApi>,
        visualizer: Arc<dyn VisualizationApi>,
        initial_balance: f64,
    ) -> Self {
        Self {
            store,
            wallet,
            visualizer,
            balance: Mutex::new(initial_balance),
            analyzed_image: Mutex::new(None),
        }
    }

    pub fn cached_balance(&self) -> f64 {
        *lock(&self.balance)
    }

    /// Record the image the surrounding analysis session is looking at.
    pub fn set_analyzed_image(&self, reference: impl Into<String>) {
        *lock(&self.analyzed_image) = Some(reference.into());
    }

    pub fn clear_analyzed_image(&self) {
        *lock(&self.analyzed_image) = None;
    }

    /// Inspect a terminal payload for a purchase-confirmation flag.
    ///
    /// The payload's reported balance becomes the request's
    /// balance-at-time-of-request and refreshes the cached balance.
    pub fn on_final(&self, payload: &FinalPayload) -> Option<WalletConfirmationRequest> {
        let conf = payload.wallet_confirmation.as_ref()?;
        if !conf.required {
            return None;
        }
        *lock(&self.balance) = conf.current_balance;
        Some(WalletConfirmationRequest {
            item_name: conf.item_name.clone(),
            price: conf.price,
            currency: conf.currency.clone(),
            balance_at_request: conf.current_balance,
        })
    }

    /// Resolve a confirmation prompt affirmatively.
    ///
    /// Calls the spend endpoint with the request's price; on success the
    /// cached balance takes the server-returned value (not the locally
    /// computed remainder) and an acknowledgement message is appended.
    /// On failure the server's error text reaches the prompt and nothing
    /// is appended.
    pub async fn confirm_purchase(
        &self,
        request: &WalletConfirmationRequest,
    ) -> Result<f64, ClientError> {
        let new_balance = self.wallet.spend(request.price, &request.item_name).await?;
        *lock(&self.balance) = new_balance;

        tracing::info!(
            item = %request.item_name,
            amount = request.price,
            balance = new_balance,
            "wallet debit confirmed"
        );
        self.store.append_assistant_note(&format!(
            "Done! I've purchased {} for {:.2} {}. Your balance is now {:.2} {}.",
            request.item_name, request.price, request.currency, new_balance, request.currency
        ));
        Ok(new_balance)
    }

    /// Resolve a confirmation prompt negatively. The request is simply
    /// discarded; no message is appended.
    pub fn dismiss(&self, request: WalletConfirmationRequest) {
        tracing::debug!(item = %request.item_name, "purchase confirmation dismissed");
    }

    /// Run a try-on for one selected suggestion.
    ///
    /// The originating message shows a progress label for the duration of
    /// the call, cleared on success and failure alike; a message that no
    /// longer exists (view moved on) is tolerated. On failure the outcome
    /// keeps the garment list so the consumer can fall back to a flat
    /// layout instead of losing the selection.
    pub async fn try_on(&self, message_id: &str, outfit: &SuggestedOutfit) -> TryOnOutcome {
        let garments = self.build_garments(outfit);
        let _status = StatusGuard::acquire(&self.store, message_id, TRY_ON_STATUS);

        match self.visualizer.render(&garments).await {
            Ok(rendered) => TryOnOutcome {
                garments,
                rendered_image: Some(rendered),
            },
            Err(e) => {
                tracing::warn!(error = %e, outfit = %outfit.name, "try-on render failed, falling back");
                TryOnOutcome {
                    garments,
                    rendered_image: None,
                }
            }
        }
    }

    fn build_garments(&self, outfit: &SuggestedOutfit) -> Vec<Garment> {
        let analyzed = lock(&self.analyzed_image).clone();
        outfit
            .item_details
            .iter()
            .map(|item| {
                let image_reference = if item.prospective {
                    // Not yet owned: show it on the analyzed photo, not a
                    // closet image.
                    analyzed
                        .clone()
                        .unwrap_or_else(|| item.image_reference.clone())
                } else {
                    item.image_reference.clone()
                };
                Garment {
                    id: item.id.clone(),
                    image_reference,
                    body_region: item.body_region.clone(),
                }
            })
            .collect()
    }
}

/// Scoped status label: set on acquire, cleared on drop, so the label
/// never outlives the call on any exit path.
struct StatusGuard<'a> {
    store: &'a ConversationStore,
    message_id: &'a str,
}

impl<'a> StatusGuard<'a> {
    fn acquire(store: &'a ConversationStore, message_id: &'a str, label: &str) -> Self {
        store.set_status(message_id, label);
        Self { store, message_id }
    }
}

impl Drop for StatusGuard<'_> {
    fn drop(&mut self) {
        self.store.clear_status(self.message_id);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{OutfitItem, WalletConfirmation};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeWallet {
        balance: f64,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl WalletApi for FakeWallet {
        async fn spend(&self, _amount: f64, _item_name: &str) -> Result<f64, ClientError> {
            match &self.fail_with {
                Some(text) => Err(ClientError::http(text.clone())),
                None => Ok(self.balance),
            }
        }
    }

    struct FakeVisualizer {
        result: Result<String, String>,
        /// Observed status of the originating message at render time.
        saw_status: Arc<AtomicBool>,
        store: Arc<ConversationStore>,
        message_id: String,
    }

    #[async_trait]
    impl VisualizationApi for FakeVisualizer {
        async fn render(&self, _garments: &[Garment]) -> Result<String, ClientError> {
            let status_set = self
                .store
                .messages()
                .iter()
                .any(|m| m.id == self.message_id && m.status.is_some());
            self.saw_status.store(status_set, Ordering::SeqCst);
            self.result
                .clone()
                .map_err(ClientError::http)
        }
    }

    struct NoopVisualizer;

    #[async_trait]
    impl VisualizationApi for NoopVisualizer {
        async fn render(&self, _garments: &[Garment]) -> Result<String, ClientError> {
            Ok("render/none.png".to_string())
        }
    }

    fn confirmation_payload() -> FinalPayload {
        FinalPayload {
            response: "Want me to buy it?".to_string(),
            images: Vec::new(),
            suggested_outfits: Vec::new(),
            wallet_confirmation: Some(WalletConfirmation {
                required: true,
                item_name: "Linen blazer".to_string(),
                price: 120.0,
                currency: "EUR".to_string(),
                current_balance: 500.0,
            }),
        }
    }

    fn dispatcher(
        store: &Arc<ConversationStore>,
        wallet: FakeWallet,
        visualizer: Arc<dyn VisualizationApi>,
    ) -> SideEffectDispatcher {
        SideEffectDispatcher::new(Arc::clone(store), Arc::new(wallet), visualizer, 0.0)
    }

    #[test]
    fn confirmation_request_computes_remaining() {
        let store = Arc::new(ConversationStore::new("hi"));
        let d = dispatcher(
            &store,
            FakeWallet {
                balance: 380.0,
                fail_with: None,
            },
            Arc::new(NoopVisualizer),
        );

        let request = d.on_final(&confirmation_payload()).unwrap();
        assert!((request.remaining() - 380.0).abs() < f64::EPSILON);
        assert!((d.cached_balance() - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unrequired_or_absent_confirmation_yields_nothing() {
        let store = Arc::new(ConversationStore::new("hi"));
        let d = dispatcher(
            &store,
            FakeWallet {
                balance: 0.0,
                fail_with: None,
            },
            Arc::new(NoopVisualizer),
        );

        let mut payload = confirmation_payload();
        if let Some(conf) = payload.wallet_confirmation.as_mut() {
            conf.required = false;
        }
        assert!(d.on_final(&payload).is_none());

        payload.wallet_confirmation = None;
        assert!(d.on_final(&payload).is_none());
    }

    #[tokio::test]
    async fn confirm_uses_server_balance_and_appends_ack() {
        let store = Arc::new(ConversationStore::new("hi"));
        // Server applies a member discount: returned balance differs from
        // the locally computed 380.
        let d = dispatcher(
            &store,
            FakeWallet {
                balance: 392.0,
                fail_with: None,
            },
            Arc::new(NoopVisualizer),
        );

        let request = d.on_final(&confirmation_payload()).unwrap();
        let balance = d.confirm_purchase(&request).await.unwrap();

        assert!((balance - 392.0).abs() < f64::EPSILON);
        assert!((d.cached_balance() - 392.0).abs() < f64::EPSILON);
        let last = store.last().unwrap();
        assert!(last.text.contains("Linen blazer"));
        assert!(last.text.contains("392.00"));
    }

    #[tokio::test]
    async fn failed_spend_surfaces_server_text_and_appends_nothing() {
        let store = Arc::new(ConversationStore::new("hi"));
        let d = dispatcher(
            &store,
            FakeWallet {
                balance: 0.0,
                fail_with: Some("insufficient funds".to_string()),
            },
            Arc::new(NoopVisualizer),
        );

        let request = d.on_final(&confirmation_payload()).unwrap();
        let err = d.confirm_purchase(&request).await.unwrap_err();

        assert!(err.message.contains("insufficient funds"));
        assert_eq!(store.len(), 1);
        // Cached balance keeps the pre-spend value.
        assert!((d.cached_balance() - 500.0).abs() < f64::EPSILON);
    }

    fn outfit_with_prospective() -> SuggestedOutfit {
        SuggestedOutfit {
            name: "Evening out".to_string(),
            score: 0.88,
            item_details: vec![
                OutfitItem {
                    id: "closet-12".to_string(),
                    image_reference: "closet/12.jpg".to_string(),
                    body_region: "top".to_string(),
                    prospective: false,
                },
                OutfitItem {
                    id: "shop-7".to_string(),
                    image_reference: "catalog/7.jpg".to_string(),
                    body_region: "bottom".to_string(),
                    prospective: true,
                },
            ],
        }
    }

    #[tokio::test]
    async fn prospective_item_uses_analyzed_image() {
        let store = Arc::new(ConversationStore::new("hi"));
        let saw_status = Arc::new(AtomicBool::new(false));
        let message_id = store.last().unwrap().id;
        let d = dispatcher(
            &store,
            FakeWallet {
                balance: 0.0,
                fail_with: None,
            },
            Arc::new(FakeVisualizer {
                result: Ok("render/42.png".to_string()),
                saw_status: Arc::clone(&saw_status),
                store: Arc::clone(&store),
                message_id: message_id.clone(),
            }),
        );
        d.set_analyzed_image("uploads/analysis-3.jpg");

        let outcome = d.try_on(&message_id, &outfit_with_prospective()).await;

        assert_eq!(outcome.rendered_image.as_deref(), Some("render/42.png"));
        assert_eq!(outcome.garments[0].image_reference, "closet/12.jpg");
        assert_eq!(outcome.garments[1].image_reference, "uploads/analysis-3.jpg");
        // Status was set while the render was outstanding, cleared after.
        assert!(saw_status.load(Ordering::SeqCst));
        assert_eq!(store.last().unwrap().status, None);
    }

    #[tokio::test]
    async fn failed_render_keeps_garments_and_clears_status() {
        let store = Arc::new(ConversationStore::new("hi"));
        let message_id = store.last().unwrap().id;
        let d = dispatcher(
            &store,
            FakeWallet {
                balance: 0.0,
                fail_with: None,
            },
            Arc::new(FakeVisualizer {
                result: Err("renderer unavailable".to_string()),
                saw_status: Arc::new(AtomicBool::new(false)),
                store: Arc::clone(&store),
                message_id: message_id.clone(),
            }),
        );

        let outcome = d.try_on(&message_id, &outfit_with_prospective()).await;

        assert_eq!(outcome.rendered_image, None);
        assert_eq!(outcome.garments.len(), 2);
        assert_eq!(store.last().unwrap().status, None);
    }

    #[tokio::test]
    async fn try_on_tolerates_missing_message() {
        let store = Arc::new(ConversationStore::new("hi"));
        let d = dispatcher(
            &store,
            FakeWallet {
                balance: 0.0,
                fail_with: None,
            },
            Arc::new(NoopVisualizer),
        );

        // The conversation was reset after the selection; the originating
        // message id no longer resolves.
        let outcome = d.try_on("gone-id", &outfit_with_prospective()).await;
        assert!(outcome.rendered_image.is_some());
    }
}
