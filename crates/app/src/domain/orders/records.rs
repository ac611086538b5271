//! Order Records

use farmstall::{
    identity::UserUuid,
    orders::{
        CustomerDetails, IdempotencyKey, Order, OrderItem, OrderItemUuid, OrderStatus, OrderType,
        OrderUuid, ShippingAddress,
    },
    pricing::ShippingMethod,
    products::ProductUuid,
};
use jiff::Timestamp;

/// An `orders` row, before its items are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub idempotency_key: IdempotencyKey,
    pub user: Option<UserUuid>,
    pub customer: CustomerDetails,
    pub address: ShippingAddress,
    pub total_amount: u64,
    pub shipping_fee: u64,
    pub shipping_method: ShippingMethod,
    pub status: OrderStatus,
    pub order_type: OrderType,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderRecord {
    /// Combine the row with its line items.
    #[must_use]
    pub fn with_items(self, items: Vec<OrderItem>) -> Order {
        Order {
            uuid: self.uuid,
            user: self.user,
            customer: self.customer,
            address: self.address,
            total_amount: self.total_amount,
            shipping_fee: self.shipping_fee,
            shipping_method: self.shipping_method,
            status: self.status,
            order_type: self.order_type,
            idempotency_key: self.idempotency_key,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Order Item Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub order: OrderUuid,
    pub product: ProductUuid,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: u64,
}

impl From<OrderItemRecord> for OrderItem {
    fn from(record: OrderItemRecord) -> Self {
        Self {
            uuid: record.uuid,
            order: record.order,
            product: record.product,
            product_name: record.product_name,
            quantity: record.quantity,
            unit_price: record.unit_price,
        }
    }
}
