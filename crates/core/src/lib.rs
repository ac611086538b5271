//! Farmstall
//!
//! Order lifecycle for a farm-goods marketplace: the session cart, pricing and
//! shipping, order submission data, the fulfillment status machine and the
//! hand-off renderers. Nothing here touches storage.

pub mod cart;
pub mod handoff;
pub mod identity;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod uuids;
