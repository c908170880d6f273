//! Purchase confirmation request

/// Ephemeral prompt data for a pending purchase.
///
/// Created only from a terminal payload's confirmation flag, destroyed on
/// resolution (confirm or cancel) or explicit dismissal.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletConfirmationRequest {
    pub item_name: String,
    pub price: f64,
    pub currency: String,
    /// Balance reported at the time the confirmation was raised.
    pub balance_at_request: f64,
}

impl WalletConfirmationRequest {
    /// Balance left after the purchase, as shown in the prompt. Display
    /// only; the authoritative post-spend balance comes from the server.
    pub fn remaining(&self) -> f64 {
        self.balance_at_request - self.price
    }
}
