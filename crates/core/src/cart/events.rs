//! Cart change notifications

use crate::cart::Cart;

/// Published after every successful cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartEvent {
    /// Contents changed; observers should re-read.
    Updated {
        /// Distinct product lines.
        line_count: usize,

        /// Total units, as shown on the badge.
        item_count: u32,
    },

    /// The cart was emptied, either explicitly or by a placed order.
    Cleared,
}

impl CartEvent {
    pub(super) fn for_cart(cart: &Cart) -> Self {
        if cart.is_empty() {
            Self::Cleared
        } else {
            Self::Updated {
                line_count: cart.len(),
                item_count: cart.item_count(),
            }
        }
    }

    /// Badge count carried by the event.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        match self {
            Self::Updated { item_count, .. } => *item_count,
            Self::Cleared => 0,
        }
    }
}
