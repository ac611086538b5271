//! Orders Repository

use farmstall::{
    identity::UserUuid,
    orders::{
        CustomerDetails, IdempotencyKey, NewOrder, OrderStatus, OrderUuid, ShippingAddress,
    },
    pricing::Totals,
};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::{amount_param, try_get_amount, try_get_parsed},
    domain::orders::records::OrderRecord,
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const FIND_ORDER_BY_IDEMPOTENCY_KEY_SQL: &str =
    include_str!("../sql/find_order_by_idempotency_key.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const GET_ORDER_STATUS_SQL: &str = include_str!("../sql/get_order_status.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");
const LIST_ORDERS_FOR_USER_SQL: &str = include_str!("../sql/list_orders_for_user.sql");
const LIST_ORDERS_SQL: &str = include_str!("../sql/list_orders.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: OrderUuid,
        order: &NewOrder,
        totals: &Totals,
    ) -> Result<OrderRecord, sqlx::Error> {
        let address = &order.address;

        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(uuid.into_uuid())
            .bind(order.idempotency_key.into_uuid())
            .bind(order.user.map(UserUuid::into_uuid))
            .bind(order.customer.name.trim())
            .bind(order.customer.phone.trim())
            .bind(address.line1.trim())
            .bind(non_blank(address.line2.as_deref()))
            .bind(address.city.trim())
            .bind(address.state.trim())
            .bind(address.postal_code.trim())
            .bind(address.country.trim())
            .bind(non_blank(address.landmark.as_deref()))
            .bind(amount_param(totals.subtotal)?)
            .bind(amount_param(totals.shipping)?)
            .bind(order.shipping_method.as_str())
            .bind(order.order_type.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_by_idempotency_key(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: IdempotencyKey,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(FIND_ORDER_BY_IDEMPOTENCY_KEY_SQL)
            .bind(key.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderStatus, sqlx::Error> {
        let row = query(GET_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        try_get_parsed(&row, "status")
    }

    /// Move `order` from `expected` to `next`. `None` when the order is no
    /// longer in `expected`; nothing is written in that case.
    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(expected.as_str())
            .bind(next.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_FOR_USER_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(status.map(OrderStatus::as_str))
            .fetch_all(&mut **tx)
            .await
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            idempotency_key: IdempotencyKey::from_uuid(row.try_get("idempotency_key")?),
            user: row
                .try_get::<Option<Uuid>, _>("user_uuid")?
                .map(UserUuid::from_uuid),
            customer: CustomerDetails {
                name: row.try_get("customer_name")?,
                phone: row.try_get("customer_phone")?,
            },
            address: ShippingAddress {
                line1: row.try_get("address_line1")?,
                line2: row.try_get("address_line2")?,
                city: row.try_get("city")?,
                state: row.try_get("state")?,
                postal_code: row.try_get("postal_code")?,
                country: row.try_get("country")?,
                landmark: row.try_get("landmark")?,
            },
            total_amount: try_get_amount(row, "total_amount")?,
            shipping_fee: try_get_amount(row, "shipping_fee")?,
            shipping_method: try_get_parsed(row, "shipping_method")?,
            status: try_get_parsed(row, "status")?,
            order_type: try_get_parsed(row, "order_type")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
