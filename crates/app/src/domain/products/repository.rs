//! Products Repository

use farmstall::products::ProductUuid;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::{
    database::{amount_param, quantity_param, try_get_amount, try_get_quantity},
    domain::products::{
        data::NewProduct,
        records::{ProductRecord, StockReservation},
    },
};

const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const RESERVE_STOCK_SQL: &str = include_str!("sql/reserve_stock.sql");
const GET_STOCK_LEVEL_SQL: &str = include_str!("sql/get_stock_level.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: &NewProduct,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(&product.name)
            .bind(amount_param(product.price)?)
            .bind(quantity_param(product.stock_quantity)?)
            .bind(product.image_ref.as_deref())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_PRODUCTS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    /// Take `quantity` units of `product` out of stock, returning the name and
    /// price read by the same statement. `None` when the product is missing or
    /// has too few units; nothing is changed in that case.
    pub(crate) async fn reserve_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Option<StockReservation>, sqlx::Error> {
        let row = sqlx::query(RESERVE_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(quantity_param(quantity)?)
            .fetch_optional(&mut **tx)
            .await?;

        row.map(|row| {
            Ok(StockReservation {
                product: ProductUuid::from_uuid(row.try_get("uuid")?),
                name: row.try_get("name")?,
                unit_price: try_get_amount(&row, "price")?,
                quantity,
            })
        })
        .transpose()
    }

    /// Units currently in stock, `None` for an unknown product.
    pub(crate) async fn stock_level(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Option<u32>, sqlx::Error> {
        let level: Option<i32> = query_scalar(GET_STOCK_LEVEL_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        level
            .map(|level| {
                u32::try_from(level).map_err(|e| sqlx::Error::ColumnDecode {
                    index: "stock_quantity".to_string(),
                    source: Box::new(e),
                })
            })
            .transpose()
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            price: try_get_amount(row, "price")?,
            stock_quantity: try_get_quantity(row, "stock_quantity")?,
            image_ref: row.try_get("image_ref")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
