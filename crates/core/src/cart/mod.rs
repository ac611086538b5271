//! Cart
//!
//! The pre-order selection for one browsing session. [`Cart`] is a plain value;
//! [`CartStore`] persists it in the client-local key-value store and tells every
//! same-client observer when it changes.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    pricing::{PricedLine, PricingError, subtotal},
    products::{Product, ProductUuid},
};

mod events;
mod store;

pub use events::CartEvent;
pub use store::{CART_STORAGE_KEY, CartStorage, CartStore, MemoryCartStorage};

/// Errors related to cart mutation and persistence.
#[derive(Debug, Error)]
pub enum CartError {
    /// Items must be added at least one at a time.
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),

    /// The product has no entry in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductUuid),

    /// Adding would overflow the line quantity.
    #[error("quantity overflow for product {0}")]
    QuantityOverflow(ProductUuid),

    /// The stored payload could not be decoded.
    #[error("stored cart is corrupt")]
    Corrupt(#[source] serde_json::Error),

    /// The cart could not be encoded for storage.
    #[error("failed to encode cart")]
    Encode(#[source] serde_json::Error),

    /// The underlying key-value store failed.
    #[error("cart storage failed: {0}")]
    Storage(String),
}

/// A decoded cart that breaks the one-line-per-product, at-least-one-unit rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidCartLine {
    /// A line holds no units.
    #[error("product {0} has quantity 0")]
    ZeroQuantity(ProductUuid),

    /// A product appears on more than one line.
    #[error("product {0} appears more than once")]
    DuplicateProduct(ProductUuid),
}

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product this line refers to.
    pub product_id: ProductUuid,

    /// Product name at the time it was added.
    pub name: String,

    /// Unit price in minor units at the time it was added.
    pub unit_price: u64,

    /// Number of units, never below 1.
    pub quantity: u32,

    /// Image shown next to the line.
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl PricedLine for CartItem {
    fn unit_price(&self) -> u64 {
        self.unit_price
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Cart contents, keyed by product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl TryFrom<Vec<CartItem>> for Cart {
    type Error = InvalidCartLine;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        let mut seen = FxHashSet::default();

        for item in &items {
            if item.quantity == 0 {
                return Err(InvalidCartLine::ZeroQuantity(item.product_id));
            }

            if !seen.insert(item.product_id) {
                return Err(InvalidCartLine::DuplicateProduct(item.product_id));
            }
        }

        Ok(Self { items })
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of `product`. Re-adding a product increments its line.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is zero.
    /// - [`CartError::QuantityOverflow`]: the line quantity would overflow.
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        if let Some(item) = self.get_mut(product.uuid) {
            item.quantity = item
                .quantity
                .checked_add(quantity)
                .ok_or(CartError::QuantityOverflow(product.uuid))?;

            return Ok(());
        }

        self.items.push(CartItem {
            product_id: product.uuid,
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            image_ref: product.image_ref.clone(),
        });

        Ok(())
    }

    /// Set the quantity of an existing line. Values below 1 are clamped to 1;
    /// removal is only ever explicit.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if the product has no line.
    pub fn set_quantity(&mut self, product: ProductUuid, quantity: u32) -> Result<(), CartError> {
        let item = self.get_mut(product).ok_or(CartError::NotInCart(product))?;

        item.quantity = quantity.max(1);

        Ok(())
    }

    /// Remove a product's line entirely.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if the product has no line.
    pub fn remove(&mut self, product: ProductUuid) -> Result<CartItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|item| item.product_id == product)
            .ok_or(CartError::NotInCart(product))?;

        Ok(self.items.remove(index))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a product's line.
    #[must_use]
    pub fn get(&self, product: ProductUuid) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product)
    }

    /// Total units across all lines, as shown on the cart badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Number of distinct product lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line totals.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the sum overflows.
    pub fn subtotal(&self) -> Result<u64, PricingError> {
        subtotal(&self.items)
    }

    fn get_mut(&mut self, product: ProductUuid) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| item.product_id == product)
    }
}
