use std::sync::Arc;

use crate::{
    cart::store::CartStore,
    config::AppConfig,
    db::{DbPool, OrmConn, create_orm_conn},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub carts: CartStore,
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig) -> Self {
        let orm = create_orm_conn(&pool);
        let carts = CartStore::new(chrono::Duration::minutes(config.cart_ttl_minutes));
        Self {
            pool,
            orm,
            config: Arc::new(config),
            carts,
        }
    }
}
