//! Orders service.

use async_trait::async_trait;
use farmstall::{
    identity::{Caller, Forbidden, Role, UserUuid},
    orders::{
        IdempotencyKey, NewOrder, Order, OrderItem, OrderItemUuid, OrderLine, OrderStatus,
        OrderUuid,
    },
    pricing::ShippingPolicy,
    products::ProductUuid,
};
use mockall::automock;
use rustc_hash::FxHashMap;
use sqlx::{Postgres, Transaction};
use tracing::{Span, error, field, info, warn};

use crate::{
    database::Db,
    domain::{
        orders::{
            errors::OrdersServiceError,
            records::OrderRecord,
            repositories::{PgOrderItemsRepository, PgOrdersRepository},
        },
        products::{records::StockReservation, repository::PgProductsRepository},
    },
    retry::{RetryConfig, retry_on_transient},
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    policy: ShippingPolicy,
    retry: RetryConfig,
    orders: PgOrdersRepository,
    items: PgOrderItemsRepository,
    products: PgProductsRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, policy: ShippingPolicy) -> Self {
        Self {
            db,
            policy,
            retry: RetryConfig::once(),
            orders: PgOrdersRepository::new(),
            items: PgOrderItemsRepository::new(),
            products: PgProductsRepository::new(),
        }
    }

    /// Replace the retry policy applied to submissions.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// One submission attempt in a single transaction. Dropping the
    /// transaction on any error releases every stock reservation made so far.
    async fn try_submit(
        &self,
        order: &NewOrder,
        attempt: u32,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        if let Some(existing) = self
            .orders
            .find_by_idempotency_key(&mut tx, order.idempotency_key)
            .await?
        {
            let placed = self.attach_items(&mut tx, existing).await?;

            tx.commit().await?;

            info!(order_uuid = %placed.uuid, "order already placed for idempotency key");

            return Ok(placed);
        }

        // Product rows are always locked in uuid order.
        let mut lines = order.lines.clone();

        lines.sort_by_key(|line| line.product);

        let mut reserved: FxHashMap<ProductUuid, StockReservation> = FxHashMap::default();

        for line in &lines {
            match self
                .products
                .reserve_stock(&mut tx, line.product, line.quantity)
                .await?
            {
                Some(reservation) => {
                    reserved.insert(line.product, reservation);
                }
                None => return Err(self.stock_failure(&mut tx, *line).await),
            }
        }

        let reservations: Vec<StockReservation> = order
            .lines
            .iter()
            .filter_map(|line| reserved.remove(&line.product))
            .collect();

        let totals = self.policy.totals(&reservations, order.shipping_method)?;

        let record = match self
            .orders
            .create_order(&mut tx, OrderUuid::new(), order, &totals)
            .await
            .map_err(OrdersServiceError::from)
        {
            // A concurrent submission with the same key committed first.
            Err(OrdersServiceError::AlreadyExists) => {
                tx.rollback().await?;

                return self.find_placed(order.idempotency_key).await;
            }
            created => created?,
        };

        let mut items = Vec::with_capacity(reservations.len());

        for reservation in &reservations {
            let item = self
                .items
                .create_item(&mut tx, OrderItemUuid::new(), record.uuid, reservation)
                .await?;

            items.push(OrderItem::from(item));
        }

        tx.commit().await?;

        info!(
            order_uuid = %record.uuid,
            attempt,
            total_amount = totals.subtotal,
            shipping_fee = totals.shipping,
            "placed order"
        );

        Ok(record.with_items(items))
    }

    async fn stock_failure(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        line: OrderLine,
    ) -> OrdersServiceError {
        match self.products.stock_level(tx, line.product).await {
            Ok(Some(available)) => {
                warn!(
                    product_uuid = %line.product,
                    requested = line.quantity,
                    available,
                    "insufficient stock"
                );

                OrdersServiceError::OutOfStock {
                    product: line.product,
                    requested: line.quantity,
                    available,
                }
            }
            Ok(None) => {
                warn!(product_uuid = %line.product, "ordered product does not exist");

                OrdersServiceError::UnknownProduct(line.product)
            }
            Err(error) => error.into(),
        }
    }

    async fn find_placed(&self, key: IdempotencyKey) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .orders
            .find_by_idempotency_key(&mut tx, key)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        let placed = self.attach_items(&mut tx, record).await?;

        tx.commit().await?;

        Ok(placed)
    }

    async fn attach_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: OrderRecord,
    ) -> Result<Order, sqlx::Error> {
        let items = self.items.list_items(tx, &[record.uuid]).await?;

        Ok(record.with_items(items.into_iter().map(OrderItem::from).collect()))
    }

    async fn attach_all_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        records: Vec<OrderRecord>,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let uuids: Vec<OrderUuid> = records.iter().map(|record| record.uuid).collect();

        let mut grouped: FxHashMap<OrderUuid, Vec<OrderItem>> = FxHashMap::default();

        for item in self.items.list_items(tx, &uuids).await? {
            grouped.entry(item.order).or_default().push(item.into());
        }

        Ok(records
            .into_iter()
            .map(|record| {
                let items = grouped.remove(&record.uuid).unwrap_or_default();

                record.with_items(items)
            })
            .collect())
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.submit_order",
        skip(self, order),
        fields(
            idempotency_key = %order.idempotency_key,
            order_type = %order.order_type,
            line_count = order.lines.len(),
            order_uuid = field::Empty,
        ),
        err
    )]
    async fn submit_order(&self, order: NewOrder) -> Result<Order, OrdersServiceError> {
        order.validate()?;

        let submission = &order;

        let placed = retry_on_transient(&self.retry, move |attempt| {
            self.try_submit(submission, attempt)
        })
        .await
        .into_result()
        .inspect_err(|failure| {
            if let OrdersServiceError::Sql(source) = failure {
                error!(
                    idempotency_key = %order.idempotency_key,
                    order_type = %order.order_type,
                    line_count = order.lines.len(),
                    error = %source,
                    "failed to persist order"
                );
            }
        })?;

        Span::current().record("order_uuid", field::display(placed.uuid));

        Ok(placed)
    }

    async fn get_order(
        &self,
        caller: Caller,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.orders.get_order(&mut tx, order).await?;

        if !caller.can_read(record.user) {
            return Err(OrdersServiceError::NotFound);
        }

        let placed = self.attach_items(&mut tx, record).await?;

        tx.commit().await?;

        Ok(placed)
    }

    #[tracing::instrument(
        name = "orders.service.transition_status",
        skip(self, caller),
        fields(order_uuid = %order, from = field::Empty, to = %next),
        err
    )]
    async fn transition_status(
        &self,
        caller: Caller,
        order: OrderUuid,
        next: OrderStatus,
    ) -> Result<Order, OrdersServiceError> {
        caller.require_admin()?;

        let mut tx = self.db.begin_transaction().await?;

        let current = self.orders.get_status(&mut tx, order).await?;

        Span::current().record("from", field::display(current));

        current.transition_to(next)?;

        let Some(record) = self
            .orders
            .update_status(&mut tx, order, current, next)
            .await?
        else {
            let actual = self.orders.get_status(&mut tx, order).await?;

            warn!(
                order_uuid = %order,
                expected = %current,
                actual = %actual,
                "order status changed concurrently"
            );

            return Err(OrdersServiceError::StatusConflict {
                expected: current,
                actual,
            });
        };

        let updated = self.attach_items(&mut tx, record).await?;

        tx.commit().await?;

        info!(order_uuid = %order, from = %current, to = %next, "changed order status");

        Ok(updated)
    }

    async fn list_for_user(
        &self,
        caller: Caller,
        user: UserUuid,
    ) -> Result<Vec<Order>, OrdersServiceError> {
        if !caller.can_read(Some(user)) {
            return Err(Forbidden {
                required: Role::Admin,
                actual: caller.role,
            }
            .into());
        }

        let mut tx = self.db.begin_transaction().await?;

        let records = self.orders.list_for_user(&mut tx, user).await?;
        let orders = self.attach_all_items(&mut tx, records).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn list_all(
        &self,
        caller: Caller,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrdersServiceError> {
        caller.require_admin()?;

        let mut tx = self.db.begin_transaction().await?;

        let records = self.orders.list_orders(&mut tx, status).await?;
        let orders = self.attach_all_items(&mut tx, records).await?;

        tx.commit().await?;

        Ok(orders)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Validate and place an order, reserving stock for every line. Placing
    /// the same idempotency key again returns the order placed the first
    /// time.
    async fn submit_order(&self, order: NewOrder) -> Result<Order, OrdersServiceError>;

    /// Retrieve an order the caller owns, or any order for an admin.
    async fn get_order(&self, caller: Caller, order: OrderUuid)
    -> Result<Order, OrdersServiceError>;

    /// Move an order to `next`. Admin only.
    async fn transition_status(
        &self,
        caller: Caller,
        order: OrderUuid,
        next: OrderStatus,
    ) -> Result<Order, OrdersServiceError>;

    /// Orders placed by `user`, newest first.
    async fn list_for_user(
        &self,
        caller: Caller,
        user: UserUuid,
    ) -> Result<Vec<Order>, OrdersServiceError>;

    /// Every order, newest first, optionally only those in `status`. Admin
    /// only.
    async fn list_all(
        &self,
        caller: Caller,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrdersServiceError>;
}
