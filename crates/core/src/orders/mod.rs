//! Orders
//!
//! Placed orders, the data needed to place one, and the status machine that
//! governs fulfillment.

pub mod data;
pub mod models;
pub mod status;

pub use data::{Field, FieldError, NewOrder, OrderLine, ValidationError};
pub use models::{
    CustomerDetails, IdempotencyKey, Order, OrderItem, OrderItemUuid, OrderType, OrderUuid,
    ShippingAddress, UnknownOrderType,
};
pub use status::{OrderStatus, TransitionError, UnknownOrderStatus};
