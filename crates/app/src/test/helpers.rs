//! Test Helpers

use farmstall::{
    orders::{CustomerDetails, IdempotencyKey, NewOrder, OrderLine, OrderType, ShippingAddress},
    pricing::ShippingMethod,
    products::{Product, ProductUuid},
};

use crate::{
    domain::products::{ProductsService, ProductsServiceError, data::NewProduct},
    test::TestContext,
};

pub(crate) async fn create_product(
    ctx: &TestContext,
    name: &str,
    price: u64,
    stock_quantity: u32,
) -> Result<Product, ProductsServiceError> {
    ctx.products
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            name: name.to_string(),
            price,
            stock_quantity,
            image_ref: None,
        })
        .await
}

pub(crate) async fn stock_of(
    ctx: &TestContext,
    product: ProductUuid,
) -> Result<u32, ProductsServiceError> {
    Ok(ctx.products.get_product(product).await?.stock_quantity)
}

pub(crate) async fn count_orders(ctx: &TestContext) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(ctx.db.pool())
        .await
}

/// A valid guest website order for `lines` of `(product, quantity)`.
pub(crate) fn new_order(lines: &[(ProductUuid, u32)]) -> NewOrder {
    NewOrder {
        idempotency_key: IdempotencyKey::new(),
        user: None,
        customer: CustomerDetails {
            name: "Arun Kumar".to_string(),
            phone: "+91 98460 11223".to_string(),
        },
        address: ShippingAddress {
            line1: "7 Spice Market Lane".to_string(),
            line2: None,
            city: "Kozhikode".to_string(),
            state: "Kerala".to_string(),
            postal_code: "673001".to_string(),
            country: "India".to_string(),
            landmark: Some("Near the clock tower".to_string()),
        },
        lines: lines
            .iter()
            .map(|&(product, quantity)| OrderLine { product, quantity })
            .collect(),
        order_type: OrderType::Website,
        shipping_method: ShippingMethod::Standard,
    }
}
