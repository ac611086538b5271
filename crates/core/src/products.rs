//! Products

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Catalog product as seen by the order lifecycle: the fields needed to price
/// and stock-check a line.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product identifier.
    pub uuid: ProductUuid,

    /// Display name.
    pub name: String,

    /// Unit price in minor units.
    pub price: u64,

    /// Units available for sale.
    pub stock_quantity: u32,

    /// Reference to the primary product image.
    pub image_ref: Option<String>,

    /// Creation time.
    pub created_at: Timestamp,

    /// Last update time.
    pub updated_at: Timestamp,
}
