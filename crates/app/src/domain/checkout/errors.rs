//! Checkout errors.

use farmstall::{cart::CartError, pricing::PricingError};
use thiserror::Error;

use crate::domain::{orders::OrdersServiceError, profiles::ProfilesServiceError};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Orders(#[from] OrdersServiceError),

    #[error(transparent)]
    Profiles(#[from] ProfilesServiceError),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}
