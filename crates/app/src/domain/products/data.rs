//! Product Data

use farmstall::products::ProductUuid;

/// New Product Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub price: u64,
    pub stock_quantity: u32,
    pub image_ref: Option<String>,
}
