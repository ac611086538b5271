//! Test context for service-level integration tests.

use farmstall::pricing::ShippingPolicy;

use crate::{
    database::Db,
    domain::{orders::PgOrdersService, products::PgProductsService, profiles::PgProfilesService},
};

use super::db::TestDb;

pub struct TestContext {
    pub db: TestDb,
    pub products: PgProductsService,
    pub profiles: PgProfilesService,
    pub orders: PgOrdersService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        Self {
            products: PgProductsService::new(db.clone()),
            profiles: PgProfilesService::new(db.clone()),
            orders: PgOrdersService::new(db, ShippingPolicy::default()),
            db: test_db,
        }
    }
}
