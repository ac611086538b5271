//! Order Models

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    identity::UserUuid,
    orders::{data::NewOrder, status::OrderStatus},
    pricing::{PricedLine, PricingError, ShippingMethod, subtotal},
    products::ProductUuid,
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItem>;

/// Client-generated token identifying one submission attempt.
pub type IdempotencyKey = TypedUuid<NewOrder>;

/// Channel an order was placed through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Cart checkout.
    #[default]
    Website,

    /// Single-product hand-off to a messaging app.
    Whatsapp,
}

impl OrderType {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Whatsapp => "whatsapp",
        }
    }
}

impl Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised order type text.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown order type: {0}")]
pub struct UnknownOrderType(pub String);

impl FromStr for OrderType {
    type Err = UnknownOrderType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "website" => Ok(Self::Website),
            "whatsapp" => Ok(Self::Whatsapp),
            other => Err(UnknownOrderType(other.to_string())),
        }
    }
}

/// Who the order is for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Full name.
    pub name: String,

    /// Contact phone number.
    pub phone: String,
}

/// Where the order ships to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// First address line, required.
    pub line1: String,

    /// Second address line.
    pub line2: Option<String>,

    /// City or town.
    pub city: String,

    /// State or province.
    pub state: String,

    /// Postal or PIN code.
    pub postal_code: String,

    /// Country.
    pub country: String,

    /// Nearby landmark for the courier.
    pub landmark: Option<String>,
}

/// One line of a placed order, a snapshot of the product at order time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    /// Item identifier.
    pub uuid: OrderItemUuid,

    /// Parent order.
    pub order: OrderUuid,

    /// Product the line was ordered from.
    pub product: ProductUuid,

    /// Product name when the order was placed.
    pub product_name: String,

    /// Units ordered, at least 1.
    pub quantity: u32,

    /// Unit price in minor units when the order was placed.
    pub unit_price: u64,
}

impl PricedLine for OrderItem {
    fn unit_price(&self) -> u64 {
        self.unit_price
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// A placed order. Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Order identifier.
    pub uuid: OrderUuid,

    /// Placing user, `None` for guest and hand-off orders.
    pub user: Option<UserUuid>,

    /// Customer contact details.
    pub customer: CustomerDetails,

    /// Delivery address.
    pub address: ShippingAddress,

    /// Sum of item line totals at creation.
    pub total_amount: u64,

    /// Shipping charged on top of `total_amount`.
    pub shipping_fee: u64,

    /// Shipping method chosen at checkout.
    pub shipping_method: ShippingMethod,

    /// Current fulfillment status.
    pub status: OrderStatus,

    /// Channel the order came through.
    pub order_type: OrderType,

    /// Submission token the order was created from.
    pub idempotency_key: IdempotencyKey,

    /// Line items, never empty.
    pub items: Vec<OrderItem>,

    /// Placement time.
    pub created_at: Timestamp,

    /// Last status change.
    pub updated_at: Timestamp,
}

impl Order {
    /// Amount collected on delivery.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the sum does not fit.
    pub fn grand_total(&self) -> Result<u64, PricingError> {
        self.total_amount
            .checked_add(self.shipping_fee)
            .ok_or(PricingError::Overflow)
    }

    /// Sum of the items' line totals.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the sum overflows.
    pub fn items_total(&self) -> Result<u64, PricingError> {
        subtotal(&self.items)
    }

    /// Whether the stored total agrees with the items and at least one item
    /// exists.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        !self.items.is_empty() && self.items_total() == Ok(self.total_amount)
    }

    /// Reference printed on hand-off messages and labels. This is the full
    /// id because the leading digits of a v7 uuid only encode the timestamp.
    #[must_use]
    pub fn reference(&self) -> String {
        self.uuid.to_string()
    }
}
