//! Product Records

use farmstall::{
    pricing::PricedLine,
    products::{Product, ProductUuid},
};
use jiff::Timestamp;

/// Product Record
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub price: u64,
    pub stock_quantity: u32,
    pub image_ref: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Self {
            uuid: record.uuid,
            name: record.name,
            price: record.price,
            stock_quantity: record.stock_quantity,
            image_ref: record.image_ref,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Units taken from stock for one order line, with the name and price the
/// product had at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockReservation {
    pub product: ProductUuid,
    pub name: String,
    pub unit_price: u64,
    pub quantity: u32,
}

impl PricedLine for StockReservation {
    fn unit_price(&self) -> u64 {
        self.unit_price
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}
