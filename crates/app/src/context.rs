//! App Context

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::{
    config::AppConfig,
    database::{self, Db},
    domain::{
        checkout::CheckoutService,
        orders::{OrdersService, PgOrdersService},
        products::{PgProductsService, ProductsService},
        profiles::{PgProfilesService, ProfilesService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub profiles: Arc<dyn ProfilesService>,
    pub orders: Arc<dyn OrdersService>,
    pub checkout: CheckoutService,
}

impl AppContext {
    /// Connect to the database, bring its schema up to date and build every
    /// service.
    ///
    /// # Errors
    ///
    /// Returns an error when the database is unreachable or a migration fails.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(&config.database)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrations)?;

        Ok(Self::from_db(Db::new(pool), config))
    }

    /// Build every service over an existing connection pool.
    #[must_use]
    pub fn from_db(db: Db, config: &AppConfig) -> Self {
        let products: Arc<dyn ProductsService> = Arc::new(PgProductsService::new(db.clone()));
        let profiles: Arc<dyn ProfilesService> = Arc::new(PgProfilesService::new(db.clone()));
        let orders: Arc<dyn OrdersService> = Arc::new(PgOrdersService::new(
            db,
            config.store.shipping_policy(),
        ));

        Self {
            checkout: CheckoutService::new(
                Arc::clone(&orders),
                Arc::clone(&profiles),
                config.store.handoff_link(),
            ),
            products,
            profiles,
            orders,
        }
    }
}

#[cfg(test)]
mod tests {
    use farmstall::{
        cart::{CartStore, MemoryCartStorage},
        identity::{Caller, UserUuid},
        orders::{IdempotencyKey, OrderStatus},
        pricing::ShippingMethod,
    };
    use testresult::TestResult;

    use crate::{
        domain::checkout::data::{CheckoutRequest, CustomerForm},
        test::{
            TestContext,
            helpers::{create_product, new_order, stock_of},
        },
    };

    use super::*;

    fn config() -> TestResult<AppConfig> {
        Ok(AppConfig::try_from_args([
            "farmstall",
            "--database-url",
            "postgres://unused/farmstall",
            "--whatsapp-number",
            "+91 90000 00000",
            "--free-shipping-threshold",
            "0",
        ])?)
    }

    #[tokio::test]
    async fn wired_services_share_one_database() -> TestResult {
        let ctx = TestContext::new().await;
        let app = AppContext::from_db(Db::new(ctx.db.pool().clone()), &config()?);
        let user = UserUuid::new();
        let ghee = create_product(&ctx, "Cow Ghee", 650_00, 5).await?;
        let cart = CartStore::new(MemoryCartStorage::new());

        cart.add(&ghee, 2)?;

        let template = new_order(&[]);
        let order = app
            .checkout
            .checkout(
                Caller::user(user),
                &cart,
                CheckoutRequest {
                    idempotency_key: IdempotencyKey::new(),
                    form: CustomerForm {
                        customer: template.customer,
                        address: template.address,
                    },
                    shipping_method: ShippingMethod::Standard,
                },
            )
            .await?;

        assert_eq!(order.user, Some(user));
        assert_eq!(order.shipping_fee, 0);
        assert_eq!(stock_of(&ctx, ghee.uuid).await?, 3);
        assert!(cart.list()?.is_empty());

        let history = app.orders.list_for_user(Caller::user(user), user).await?;

        assert_eq!(history.len(), 1);
        assert_eq!(
            history.first().map(|order| order.status),
            Some(OrderStatus::Pending)
        );

        Ok(())
    }
}
