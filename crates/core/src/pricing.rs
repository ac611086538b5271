//! Pricing
//!
//! Amounts are unsigned minor units (paise). Every function here is pure: the
//! same lines and policy always produce the same totals, which is what makes the
//! figure shown at checkout identical to the one stored on the order.

use std::{
    fmt::{self, Display},
    num::TryFromIntError,
    str::FromStr,
};

use rusty_money::{Money, MoneyError, iso};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency every amount in the marketplace is expressed in.
pub const CURRENCY: &iso::Currency = iso::INR;

/// Errors that can occur while pricing lines.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A line or sum does not fit in the amount type.
    #[error("amount overflow")]
    Overflow,

    /// An amount could not be converted between signed and unsigned units.
    #[error("amount out of range")]
    OutOfRange(#[from] TryFromIntError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Anything with a unit price and a quantity.
pub trait PricedLine {
    /// Unit price in minor units.
    fn unit_price(&self) -> u64;

    /// Number of units.
    fn quantity(&self) -> u32;

    /// `unit_price × quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] when the product does not fit.
    fn line_total(&self) -> Result<u64, PricingError> {
        self.unit_price()
            .checked_mul(u64::from(self.quantity()))
            .ok_or(PricingError::Overflow)
    }
}

/// Sum of `unit_price × quantity` over `lines`.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: a line total overflowed.
/// - [`PricingError::OutOfRange`]: a total does not fit the money type.
/// - [`PricingError::Money`]: wrapped money arithmetic error.
pub fn subtotal<L: PricedLine>(lines: &[L]) -> Result<u64, PricingError> {
    let total = lines
        .iter()
        .try_fold(Money::from_minor(0, CURRENCY), |acc, line| {
            let amount = i64::try_from(line.line_total()?)?;

            acc.add(Money::from_minor(amount, CURRENCY))
                .map_err(PricingError::from)
        })?;

    Ok(u64::try_from(total.to_minor_units())?)
}

/// How the order is shipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    /// Free above the threshold, flat fee below it.
    #[default]
    Standard,

    /// Always charged the express fee.
    Express,
}

impl ShippingMethod {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
        }
    }
}

impl Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised shipping method text.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown shipping method: {0}")]
pub struct UnknownShippingMethod(pub String);

impl FromStr for ShippingMethod {
    type Err = UnknownShippingMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            other => Err(UnknownShippingMethod(other.to_string())),
        }
    }
}

/// Shipping thresholds and fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Standard shipping is free when the subtotal is strictly above this.
    pub free_shipping_threshold: u64,

    /// Standard shipping fee.
    pub standard_fee: u64,

    /// Express shipping fee, charged regardless of subtotal.
    pub express_fee: u64,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: 500_00,
            standard_fee: 50_00,
            express_fee: 100_00,
        }
    }
}

impl ShippingPolicy {
    /// Fee for shipping an order with the given subtotal.
    #[must_use]
    pub fn shipping_fee(&self, subtotal: u64, method: ShippingMethod) -> u64 {
        match method {
            ShippingMethod::Express => self.express_fee,
            ShippingMethod::Standard if subtotal > self.free_shipping_threshold => 0,
            ShippingMethod::Standard => self.standard_fee,
        }
    }

    /// Subtotal, shipping and grand total for `lines`.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if any amount overflows.
    pub fn totals<L: PricedLine>(
        &self,
        lines: &[L],
        method: ShippingMethod,
    ) -> Result<Totals, PricingError> {
        let subtotal = subtotal(lines)?;
        let shipping = self.shipping_fee(subtotal, method);
        let total = subtotal
            .checked_add(shipping)
            .ok_or(PricingError::Overflow)?;

        Ok(Totals {
            subtotal,
            shipping,
            total,
        })
    }
}

/// Priced summary of a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// Sum of line totals.
    pub subtotal: u64,

    /// Shipping fee.
    pub shipping: u64,

    /// `subtotal + shipping`.
    pub total: u64,
}

/// Format a minor-unit amount, dropping the fractional part when it is zero.
#[must_use]
pub fn format_price(minor_units: u64) -> String {
    let scale = 10_u64.pow(CURRENCY.exponent);
    let major_units = minor_units / scale;
    let fractional = minor_units % scale;
    let symbol = CURRENCY.symbol;

    if fractional == 0 {
        format!("{symbol}{major_units}")
    } else {
        let width = CURRENCY.exponent as usize;

        format!("{symbol}{major_units}.{fractional:0width$}")
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    struct Line(u64, u32);

    impl PricedLine for Line {
        fn unit_price(&self) -> u64 {
            self.0
        }

        fn quantity(&self) -> u32 {
            self.1
        }
    }

    fn policy() -> ShippingPolicy {
        ShippingPolicy {
            free_shipping_threshold: 500_00,
            standard_fee: 50_00,
            express_fee: 120_00,
        }
    }

    #[test]
    fn cart_below_threshold_pays_standard_shipping() -> TestResult {
        let lines = [Line(80_00, 2), Line(120_00, 1)];

        let totals = policy().totals(&lines, ShippingMethod::Standard)?;

        assert_eq!(totals.subtotal, 280_00);
        assert_eq!(totals.shipping, 50_00);
        assert_eq!(totals.total, 330_00);

        Ok(())
    }

    #[test]
    fn threshold_itself_is_not_free() -> TestResult {
        let totals = policy().totals(&[Line(250_00, 2)], ShippingMethod::Standard)?;

        assert_eq!(totals.subtotal, 500_00);
        assert_eq!(totals.shipping, 50_00);

        Ok(())
    }

    #[test]
    fn above_threshold_ships_free() -> TestResult {
        let totals = policy().totals(&[Line(500_01, 1)], ShippingMethod::Standard)?;

        assert_eq!(totals.shipping, 0);
        assert_eq!(totals.total, 500_01);

        Ok(())
    }

    #[test]
    fn express_is_charged_regardless_of_subtotal() -> TestResult {
        let totals = policy().totals(&[Line(900_00, 1)], ShippingMethod::Express)?;

        assert_eq!(totals.shipping, 120_00);
        assert_eq!(totals.total, 1020_00);

        Ok(())
    }

    #[test]
    fn empty_lines_have_zero_subtotal() -> TestResult {
        let lines: [Line; 0] = [];

        assert_eq!(subtotal(&lines)?, 0);

        Ok(())
    }

    #[test]
    fn line_total_overflow_is_reported() {
        let result = subtotal(&[Line(u64::MAX, 2)]);

        assert_eq!(result, Err(PricingError::Overflow));
    }

    #[test]
    fn totals_are_deterministic() -> TestResult {
        let lines = [Line(150_00, 3), Line(45_50, 2)];

        let first = policy().totals(&lines, ShippingMethod::Standard)?;
        let second = policy().totals(&lines, ShippingMethod::Standard)?;

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn format_price_whole_rupees() {
        assert_eq!(format_price(300_00), "₹300");
    }

    #[test]
    fn format_price_with_paise() {
        assert_eq!(format_price(45_05), "₹45.05");
    }

    #[test]
    fn shipping_method_round_trips_through_text() -> TestResult {
        for method in [ShippingMethod::Standard, ShippingMethod::Express] {
            assert_eq!(method.as_str().parse::<ShippingMethod>()?, method);
        }

        assert!("overnight".parse::<ShippingMethod>().is_err());

        Ok(())
    }
}
