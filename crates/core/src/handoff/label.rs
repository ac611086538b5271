//! Shipping Label

use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use crate::{
    orders::Order,
    pricing::{PricedLine, PricingError, format_price},
};

const PLACEHOLDER: &str = "-";

/// Print-oriented rendering of an order. Every label carries the same rows in
/// the same order, whichever fields are filled in.
#[derive(Debug, Clone, Copy)]
pub struct ShippingLabel<'a> {
    order: &'a Order,
}

impl<'a> ShippingLabel<'a> {
    /// Wrap `order` for rendering.
    #[must_use]
    pub fn new(order: &'a Order) -> Self {
        Self { order }
    }

    /// Render the address block, item table and totals.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line or total overflows.
    pub fn render(&self) -> Result<String, PricingError> {
        let details = self.details_table();
        let items = self.items_table()?;
        let totals = self.totals_table()?;

        Ok(format!("{details}\n{items}\n{totals}"))
    }

    fn details_table(&self) -> Table {
        let order = self.order;
        let address = &order.address;
        let mut builder = Builder::default();

        let rows = [
            ("Order", format!("#{}", order.reference())),
            (
                "Placed",
                order.created_at.strftime("%Y-%m-%d %H:%M UTC").to_string(),
            ),
            ("Ship to", field(&order.customer.name)),
            ("Phone", field(&order.customer.phone)),
            ("Address 1", field(&address.line1)),
            ("Address 2", optional(address.line2.as_deref())),
            ("Landmark", optional(address.landmark.as_deref())),
            ("City", field(&address.city)),
            ("State", field(&address.state)),
            ("Postal code", field(&address.postal_code)),
            ("Country", field(&address.country)),
        ];

        for (label, value) in rows {
            builder.push_record([label.to_string(), value]);
        }

        let mut table = builder.build();

        table.with(Style::modern());

        table
    }

    fn items_table(&self) -> Result<Table, PricingError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Unit price", "Amount"]);

        for item in &self.order.items {
            builder.push_record([
                field(&item.product_name),
                item.quantity.to_string(),
                format_price(item.unit_price),
                format_price(item.line_total()?),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern());
        table.modify(Columns::new(1..4), Alignment::right());

        Ok(table)
    }

    fn totals_table(&self) -> Result<Table, PricingError> {
        let order = self.order;
        let mut builder = Builder::default();

        builder.push_record(["Subtotal".to_string(), format_price(order.total_amount)]);
        builder.push_record([
            format!("Shipping ({})", order.shipping_method),
            format_price(order.shipping_fee),
        ]);
        builder.push_record(["Total".to_string(), format_price(order.grand_total()?)]);
        builder.push_record(["Payment".to_string(), "Cash on delivery".to_string()]);

        let mut table = builder.build();

        table.with(Style::modern());
        table.modify(Columns::last(), Alignment::right());

        Ok(table)
    }
}

fn field(value: &str) -> String {
    optional(Some(value))
}

fn optional(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(PLACEHOLDER)
        .to_string()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::handoff::tests::sample_order;

    use super::*;

    fn row<'a>(label: &'a str, row_label: &str) -> Option<&'a str> {
        label.lines().find(|line| line.contains(row_label))
    }

    #[test]
    fn orders_placed_together_get_distinct_labels() -> TestResult {
        let first = sample_order();
        let second = sample_order();

        let first_label = ShippingLabel::new(&first).render()?;
        let second_label = ShippingLabel::new(&second).render()?;

        let first_row = row(&first_label, "Order").ok_or("order row missing")?;
        let second_row = row(&second_label, "Order").ok_or("order row missing")?;

        assert!(first_row.contains(&first.uuid.to_string()), "got {first_row}");
        assert_ne!(first_row, second_row);

        Ok(())
    }

    #[test]
    fn absent_fields_print_placeholder() -> TestResult {
        let label = ShippingLabel::new(&sample_order()).render()?;

        let landmark = row(&label, "Landmark").ok_or("landmark row missing")?;
        let second_line = row(&label, "Address 2").ok_or("address 2 row missing")?;

        assert!(landmark.contains("│ - "), "got {landmark}");
        assert!(second_line.contains("│ - "), "got {second_line}");

        Ok(())
    }

    #[test]
    fn layout_is_identical_whichever_fields_are_set() -> TestResult {
        let bare = sample_order();
        let mut full = sample_order();

        full.address.line2 = Some("Near the old mill".to_string());
        full.address.landmark = Some("Blue gate".to_string());

        let bare_label = ShippingLabel::new(&bare).render()?;
        let full_label = ShippingLabel::new(&full).render()?;

        let labels = |text: &str| -> Vec<String> {
            text.lines()
                .filter_map(|line| line.split('│').nth(1))
                .map(|cell| cell.trim().to_string())
                .collect()
        };

        assert_eq!(bare_label.lines().count(), full_label.lines().count());
        assert_eq!(labels(&bare_label), labels(&full_label));

        Ok(())
    }

    #[test]
    fn items_and_totals_are_listed() -> TestResult {
        let label = ShippingLabel::new(&sample_order()).render()?;

        let item = row(&label, "Tapioca Chips").ok_or("item row missing")?;

        assert!(item.contains("₹150"));
        assert!(item.contains("₹300"));
        assert!(row(&label, "Total").is_some_and(|line| line.contains("₹350")));
        assert!(row(&label, "Shipping (standard)").is_some());

        Ok(())
    }

    #[test]
    fn rendering_leaves_order_untouched() -> TestResult {
        let order = sample_order();
        let before = order.clone();

        ShippingLabel::new(&order).render()?;

        assert_eq!(order, before);

        Ok(())
    }
}
