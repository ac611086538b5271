//! Checkout Data

use farmstall::{
    orders::{CustomerDetails, IdempotencyKey, Order, ShippingAddress},
    pricing::ShippingMethod,
    products::ProductUuid,
};

use crate::domain::profiles::data::ProfileDetails;

/// Customer details as entered on the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerForm {
    pub customer: CustomerDetails,
    pub address: ShippingAddress,
}

impl CustomerForm {
    /// Form pre-filled from a saved profile.
    #[must_use]
    pub fn from_profile(profile: &ProfileDetails) -> Self {
        Self::default().fill_blanks_from(profile)
    }

    /// Copy profile values into every field the shopper left blank.
    #[must_use]
    pub fn fill_blanks_from(mut self, profile: &ProfileDetails) -> Self {
        let address = &mut self.address;

        fill(&mut self.customer.name, profile.full_name.as_deref());
        fill(&mut self.customer.phone, profile.phone.as_deref());
        fill(&mut address.line1, profile.address_line1.as_deref());
        fill(&mut address.city, profile.city.as_deref());
        fill(&mut address.state, profile.state.as_deref());
        fill(&mut address.postal_code, profile.postal_code.as_deref());
        fill(&mut address.country, profile.country.as_deref());
        fill_optional(&mut address.line2, profile.address_line2.as_deref());
        fill_optional(&mut address.landmark, profile.landmark.as_deref());

        self
    }
}

fn fill(field: &mut String, saved: Option<&str>) {
    if let Some(saved) = saved
        && field.trim().is_empty()
    {
        saved.clone_into(field);
    }
}

fn fill_optional(field: &mut Option<String>, saved: Option<&str>) {
    if field.as_deref().is_none_or(|value| value.trim().is_empty()) {
        *field = saved.map(str::to_string);
    }
}

/// Checkout of the whole cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub idempotency_key: IdempotencyKey,
    pub form: CustomerForm,
    pub shipping_method: ShippingMethod,
}

/// "Order on WhatsApp" for a single product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsAppRequest {
    pub idempotency_key: IdempotencyKey,
    pub product: ProductUuid,
    pub quantity: u32,
    pub form: CustomerForm,
}

/// A placed hand-off order and the deep link that sends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    pub order: Order,
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved() -> ProfileDetails {
        ProfileDetails {
            full_name: Some("Lakshmi Iyer".to_string()),
            phone: Some("9847055555".to_string()),
            address_line1: Some("3 Hill View".to_string()),
            city: Some("Munnar".to_string()),
            state: Some("Kerala".to_string()),
            postal_code: Some("685612".to_string()),
            country: Some("India".to_string()),
            landmark: Some("Tea museum".to_string()),
            ..ProfileDetails::default()
        }
    }

    #[test]
    fn profile_prefills_every_saved_field() {
        let form = CustomerForm::from_profile(&saved());

        assert_eq!(form.customer.name, "Lakshmi Iyer");
        assert_eq!(form.address.postal_code, "685612");
        assert_eq!(form.address.landmark.as_deref(), Some("Tea museum"));
        assert_eq!(form.address.line2, None);
    }

    #[test]
    fn entered_values_win_over_profile() {
        let mut form = CustomerForm::default();

        form.customer.phone = "9000012345".to_string();
        form.address.landmark = Some("Bus stand".to_string());
        form.address.city = "  ".to_string();

        let form = form.fill_blanks_from(&saved());

        assert_eq!(form.customer.phone, "9000012345");
        assert_eq!(form.address.landmark.as_deref(), Some("Bus stand"));
        assert_eq!(form.address.city, "Munnar");
        assert_eq!(form.customer.name, "Lakshmi Iyer");
    }
}
