//! Store Config

use clap::Args;
use farmstall::{
    handoff::{DEFAULT_RECIPIENT_PARAM, HandoffLink},
    pricing::ShippingPolicy,
};

/// Shipping fees and the messaging hand-off target. Amounts are in paise.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// Standard shipping is free strictly above this subtotal
    #[arg(long, env = "FREE_SHIPPING_THRESHOLD", default_value_t = 500_00)]
    pub free_shipping_threshold: u64,

    /// Standard shipping fee
    #[arg(long, env = "STANDARD_SHIPPING_FEE", default_value_t = 50_00)]
    pub standard_shipping_fee: u64,

    /// Express shipping fee, charged regardless of subtotal
    #[arg(long, env = "EXPRESS_SHIPPING_FEE", default_value_t = 100_00)]
    pub express_shipping_fee: u64,

    /// Number that receives hand-off orders
    #[arg(long, env = "WHATSAPP_NUMBER")]
    pub whatsapp_number: String,

    /// Deep-link scheme of the messaging app
    #[arg(long, env = "WHATSAPP_SCHEME", default_value = "whatsapp")]
    pub whatsapp_scheme: String,

    /// Query parameter the deep link names the recipient with
    #[arg(long, env = "WHATSAPP_RECIPIENT_PARAM", default_value = DEFAULT_RECIPIENT_PARAM)]
    pub whatsapp_recipient_param: String,
}

impl StoreConfig {
    /// Shipping thresholds and fees as a pricing policy.
    #[must_use]
    pub fn shipping_policy(&self) -> ShippingPolicy {
        ShippingPolicy {
            free_shipping_threshold: self.free_shipping_threshold,
            standard_fee: self.standard_shipping_fee,
            express_fee: self.express_shipping_fee,
        }
    }

    /// Deep-link target for hand-off orders.
    #[must_use]
    pub fn handoff_link(&self) -> HandoffLink {
        HandoffLink::new(self.whatsapp_scheme.clone(), &self.whatsapp_number)
            .with_recipient_param(self.whatsapp_recipient_param.clone())
    }
}
