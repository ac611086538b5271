//! Farmstall prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        CART_STORAGE_KEY, Cart, CartError, CartEvent, CartItem, CartStorage, CartStore,
        MemoryCartStorage,
    },
    handoff::{HandoffLink, OrderMessage, ShippingLabel},
    identity::{Caller, Forbidden, Role, UnknownRole, UserUuid},
    orders::{
        CustomerDetails, Field, FieldError, IdempotencyKey, NewOrder, Order, OrderItem,
        OrderItemUuid, OrderLine, OrderStatus, OrderType, OrderUuid, ShippingAddress,
        TransitionError, ValidationError,
    },
    pricing::{
        CURRENCY, PricedLine, PricingError, ShippingMethod, ShippingPolicy, Totals, format_price,
    },
    products::{Product, ProductUuid},
    uuids::TypedUuid,
};
