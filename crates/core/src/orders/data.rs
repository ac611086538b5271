//! Order Submission Data

use std::fmt::{self, Display};

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{
    identity::UserUuid,
    orders::models::{CustomerDetails, IdempotencyKey, OrderType, ShippingAddress},
    pricing::ShippingMethod,
    products::ProductUuid,
};

const PHONE_DIGITS_MIN: usize = 7;
const PHONE_DIGITS_MAX: usize = 15;

/// A product and how many units of it to order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    /// Product to order.
    pub product: ProductUuid,

    /// Units requested.
    pub quantity: u32,
}

/// Everything needed to place an order. Prices and names are never supplied
/// here; they are read from the catalog when the order is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// Token for this submission attempt. Resubmitting with the same key
    /// returns the original order.
    pub idempotency_key: IdempotencyKey,

    /// Placing user, if any.
    pub user: Option<UserUuid>,

    /// Customer contact details.
    pub customer: CustomerDetails,

    /// Delivery address.
    pub address: ShippingAddress,

    /// Requested lines.
    pub lines: Vec<OrderLine>,

    /// Channel the order is placed through.
    pub order_type: OrderType,

    /// Shipping method chosen by the customer.
    pub shipping_method: ShippingMethod,
}

/// Form field a [`FieldError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Customer name.
    Name,

    /// Customer phone.
    Phone,

    /// First address line.
    AddressLine1,

    /// City.
    City,

    /// State.
    State,

    /// Postal code.
    PostalCode,

    /// Country.
    Country,

    /// Item list.
    Items,
}

impl Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::AddressLine1 => "address line 1",
            Self::City => "city",
            Self::State => "state",
            Self::PostalCode => "postal code",
            Self::Country => "country",
            Self::Items => "items",
        })
    }
}

/// A single problem with a submission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// A required field is blank.
    #[error("{0} is required")]
    Required(Field),

    /// The phone number does not look dialable.
    #[error("phone number must contain 7 to 15 digits")]
    InvalidPhone,

    /// The postal code contains unexpected characters.
    #[error("postal code may only contain letters, digits, spaces and hyphens")]
    InvalidPostalCode,

    /// No lines were requested.
    #[error("at least one item is required")]
    NoItems,

    /// A line asks for zero units.
    #[error("quantity for product {0} must be at least 1")]
    ZeroQuantity(ProductUuid),

    /// The same product appears on more than one line.
    #[error("product {0} appears on more than one line")]
    DuplicateLine(ProductUuid),

    /// Hand-off orders carry exactly one product.
    #[error("whatsapp orders must contain exactly one item, got {0}")]
    WhatsappLineCount(usize),
}

impl FieldError {
    /// Field the problem belongs to.
    #[must_use]
    pub fn field(&self) -> Field {
        match self {
            Self::Required(field) => *field,
            Self::InvalidPhone => Field::Phone,
            Self::InvalidPostalCode => Field::PostalCode,
            Self::NoItems
            | Self::ZeroQuantity(_)
            | Self::DuplicateLine(_)
            | Self::WhatsappLineCount(_) => Field::Items,
        }
    }
}

/// Every problem found with a submission. Nothing is written when this is
/// returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("order failed validation ({} problem(s))", .errors.len())]
pub struct ValidationError {
    /// Problems in field order.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Whether `error` was among the problems found.
    #[must_use]
    pub fn contains(&self, error: &FieldError) -> bool {
        self.errors.contains(error)
    }

    /// Problems for one field.
    pub fn for_field(&self, field: Field) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(move |error| error.field() == field)
    }
}

impl NewOrder {
    /// Check required fields, formats and lines, collecting every problem.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing each problem found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        require(&mut errors, Field::Name, &self.customer.name);

        if require(&mut errors, Field::Phone, &self.customer.phone)
            && !is_phone(&self.customer.phone)
        {
            errors.push(FieldError::InvalidPhone);
        }

        require(&mut errors, Field::AddressLine1, &self.address.line1);
        require(&mut errors, Field::City, &self.address.city);
        require(&mut errors, Field::State, &self.address.state);

        if require(&mut errors, Field::PostalCode, &self.address.postal_code)
            && !is_postal_code(&self.address.postal_code)
        {
            errors.push(FieldError::InvalidPostalCode);
        }

        require(&mut errors, Field::Country, &self.address.country);

        self.validate_lines(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors })
        }
    }

    /// Total units requested across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    fn validate_lines(&self, errors: &mut Vec<FieldError>) {
        if self.lines.is_empty() {
            errors.push(FieldError::NoItems);
            return;
        }

        if self.order_type == OrderType::Whatsapp && self.lines.len() != 1 {
            errors.push(FieldError::WhatsappLineCount(self.lines.len()));
        }

        let mut seen = FxHashSet::default();

        for line in &self.lines {
            if line.quantity == 0 {
                errors.push(FieldError::ZeroQuantity(line.product));
            }

            if !seen.insert(line.product) {
                errors.push(FieldError::DuplicateLine(line.product));
            }
        }
    }
}

fn require(errors: &mut Vec<FieldError>, field: Field, value: &str) -> bool {
    let present = !value.trim().is_empty();

    if !present {
        errors.push(FieldError::Required(field));
    }

    present
}

fn is_phone(value: &str) -> bool {
    let mut digits = 0_usize;

    for c in value.trim().chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '+' | '-' | '(' | ')' => {}
            _ => return false,
        }
    }

    (PHONE_DIGITS_MIN..=PHONE_DIGITS_MAX).contains(&digits)
}

fn is_postal_code(value: &str) -> bool {
    value
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
}
