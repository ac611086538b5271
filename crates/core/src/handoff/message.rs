//! Order Message

use url::form_urlencoded::byte_serialize;

use crate::{
    orders::Order,
    pricing::{PricedLine, PricingError, format_price},
};

/// Line-oriented plain-text summary of an order.
#[derive(Debug, Clone, Copy)]
pub struct OrderMessage<'a> {
    order: &'a Order,
}

impl<'a> OrderMessage<'a> {
    /// Wrap `order` for rendering.
    #[must_use]
    pub fn new(order: &'a Order) -> Self {
        Self { order }
    }

    /// Render the summary. Lines for absent or blank values are left out
    /// entirely.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line or total overflows.
    pub fn render(&self) -> Result<String, PricingError> {
        let order = self.order;
        let address = &order.address;
        let mut lines = MessageLines::default();

        lines.push(format!("New order #{}", order.reference()));
        lines.labelled("Customer", &order.customer.name);
        lines.labelled("Phone", &order.customer.phone);
        lines.push("Address:".to_string());
        lines.value(&address.line1);
        lines.value(address.line2.as_deref().unwrap_or_default());
        lines.labelled("Landmark", address.landmark.as_deref().unwrap_or_default());
        lines.value(&format!(
            "{}, {} - {}",
            address.city.trim(),
            address.state.trim(),
            address.postal_code.trim()
        ));
        lines.value(&address.country);
        lines.push("Items:".to_string());

        for item in &order.items {
            lines.push(format!(
                "{} x {} - {}",
                item.product_name.trim(),
                item.quantity,
                format_price(item.line_total()?)
            ));
        }

        let shipping = if order.shipping_fee == 0 {
            "Free".to_string()
        } else {
            format_price(order.shipping_fee)
        };

        lines.labelled("Subtotal", &format_price(order.total_amount));
        lines.labelled("Shipping", &shipping);
        lines.labelled("Total", &format_price(order.grand_total()?));
        lines.labelled("Payment", "Cash on delivery");

        Ok(lines.finish())
    }
}

#[derive(Debug, Default)]
struct MessageLines(Vec<String>);

impl MessageLines {
    fn push(&mut self, line: String) {
        self.0.push(line);
    }

    fn value(&mut self, value: &str) {
        let value = value.trim();

        if !value.is_empty() {
            self.push(value.to_string());
        }
    }

    fn labelled(&mut self, label: &str, value: &str) {
        let value = value.trim();

        if !value.is_empty() {
            self.push(format!("{label}: {value}"));
        }
    }

    fn finish(self) -> String {
        self.0.join("\n")
    }
}

/// Query parameter naming the recipient unless configured otherwise.
pub const DEFAULT_RECIPIENT_PARAM: &str = "recipient";

/// Messaging-app deep link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffLink {
    scheme: String,
    recipient_param: String,
    recipient: String,
}

impl HandoffLink {
    /// Link to `recipient` through the app registered for `scheme`. Anything
    /// other than digits is stripped from the recipient number.
    #[must_use]
    pub fn new(scheme: impl Into<String>, recipient: &str) -> Self {
        Self {
            scheme: scheme.into(),
            recipient_param: DEFAULT_RECIPIENT_PARAM.to_string(),
            recipient: recipient.chars().filter(char::is_ascii_digit).collect(),
        }
    }

    /// Name the recipient with `param` instead, e.g. `phone` for `WhatsApp`.
    #[must_use]
    pub fn with_recipient_param(mut self, param: impl Into<String>) -> Self {
        self.recipient_param = param.into();
        self
    }

    /// Recipient number, digits only.
    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Deep link carrying `text`.
    #[must_use]
    pub fn for_text(&self, text: &str) -> String {
        let encoded: String = byte_serialize(text.as_bytes()).collect();

        format!(
            "{}://send?{}={}&text={encoded}",
            self.scheme, self.recipient_param, self.recipient
        )
    }

    /// Deep link carrying the rendered summary of `order`.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the summary cannot be rendered.
    pub fn for_order(&self, order: &Order) -> Result<String, PricingError> {
        Ok(self.for_text(&OrderMessage::new(order).render()?))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::handoff::tests::sample_order;

    use super::*;

    #[test]
    fn item_lines_show_name_quantity_and_amount() -> TestResult {
        let message = OrderMessage::new(&sample_order()).render()?;

        assert!(
            message.lines().any(|line| line == "Tapioca Chips x 2 - ₹300"),
            "missing item line in:\n{message}"
        );

        Ok(())
    }

    #[test]
    fn header_carries_the_full_order_id() -> TestResult {
        let first = sample_order();
        let second = sample_order();

        let first_message = OrderMessage::new(&first).render()?;
        let second_message = OrderMessage::new(&second).render()?;

        assert_eq!(
            first_message.lines().next(),
            Some(format!("New order #{}", first.uuid).as_str())
        );
        assert_ne!(
            first_message.lines().next(),
            second_message.lines().next(),
            "orders placed back to back share a header"
        );

        Ok(())
    }

    #[test]
    fn absent_landmark_leaves_no_trace() -> TestResult {
        let message = OrderMessage::new(&sample_order()).render()?;

        assert!(!message.contains("Landmark"));
        assert!(
            message.lines().all(|line| !line.trim().is_empty()),
            "blank line in:\n{message}"
        );

        Ok(())
    }

    #[test]
    fn present_landmark_and_second_line_are_rendered() -> TestResult {
        let mut order = sample_order();

        order.address.line2 = Some("Near the old mill".to_string());
        order.address.landmark = Some("Opposite St. Mary's church".to_string());

        let message = OrderMessage::new(&order).render()?;

        assert!(message.contains("\nNear the old mill\n"));
        assert!(message.contains("\nLandmark: Opposite St. Mary's church\n"));

        Ok(())
    }

    #[test]
    fn whitespace_only_fields_are_treated_as_absent() -> TestResult {
        let mut order = sample_order();

        order.address.line2 = Some("   ".to_string());

        let message = OrderMessage::new(&order).render()?;

        assert!(message.lines().all(|line| !line.trim().is_empty()));

        Ok(())
    }

    #[test]
    fn totals_and_payment_note_close_the_message() -> TestResult {
        let message = OrderMessage::new(&sample_order()).render()?;
        let tail: Vec<&str> = message.lines().rev().take(4).collect();

        assert_eq!(
            tail,
            vec![
                "Payment: Cash on delivery",
                "Total: ₹350",
                "Shipping: ₹50",
                "Subtotal: ₹300",
            ]
        );

        Ok(())
    }

    #[test]
    fn free_shipping_is_spelled_out() -> TestResult {
        let mut order = sample_order();

        order.shipping_fee = 0;

        let message = OrderMessage::new(&order).render()?;

        assert!(message.contains("Shipping: Free"));

        Ok(())
    }

    #[test]
    fn link_encodes_message_for_query_string() -> TestResult {
        let link = HandoffLink::new("whatsapp", "+91 98765-43210");
        let url = link.for_order(&sample_order())?;

        assert!(url.starts_with("whatsapp://send?recipient=919876543210&text="));
        assert!(!url.contains('\n'));
        assert!(url.contains("Tapioca+Chips+x+2+-+%E2%82%B9300"));

        Ok(())
    }

    #[test]
    fn recipient_parameter_can_be_renamed() {
        let link = HandoffLink::new("whatsapp", "919876543210").with_recipient_param("phone");

        assert_eq!(
            link.for_text("hi"),
            "whatsapp://send?phone=919876543210&text=hi"
        );
    }

    #[test]
    fn encoded_text_decodes_back_to_message() -> TestResult {
        let order = sample_order();
        let link = HandoffLink::new("whatsapp", "919876543210");
        let url = link.for_order(&order)?;
        let query = url.split_once('?').map(|(_, query)| query).unwrap_or_default();

        let text = url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "text")
            .map(|(_, value)| value.into_owned())
            .ok_or("text parameter missing")?;

        assert_eq!(text, OrderMessage::new(&order).render()?);

        Ok(())
    }
}
