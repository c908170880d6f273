//! Try-on outcome

use crate::client::Garment;

/// Result of a try-on request.
///
/// The failure path carries the same garment list with no rendered image,
/// so the consumer can degrade to a flat garment layout rather than losing
/// the user's selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryOnOutcome {
    pub garments: Vec<Garment>,
    pub rendered_image: Option<String>,
}

impl TryOnOutcome {
    pub fn is_rendered(&self) -> bool {
        self.rendered_image.is_some()
    }
}
