//! Checkout
//!
//! The two ways a shopper places an order: checking out the cart, or sending a
//! single product to the store over a messaging app.

pub mod data;
pub mod errors;
pub mod service;

pub use errors::CheckoutError;
pub use service::CheckoutService;
