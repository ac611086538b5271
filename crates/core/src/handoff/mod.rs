//! Hand-off
//!
//! Read-only projections of a placed order: the text sent to a messaging app
//! and the label printed for the courier.

mod label;
mod message;

pub use label::ShippingLabel;
pub use message::{DEFAULT_RECIPIENT_PARAM, HandoffLink, OrderMessage};
