//! Product catalog: filter sanitizing, query construction and row normalization.

pub mod filters;
pub mod normalize;
pub mod query;

use sea_orm::{ConnectionTrait, DbErr, FromQueryResult, JsonValue};

use crate::models::Product;

pub use filters::{AvailabilityFilter, ProductFilters};
pub use normalize::{RowError, product_from_row};
pub use query::build_product_query;

/// Runs the catalog query and normalizes every row. Rows that fail
/// normalization are skipped with a warning rather than failing the listing.
pub async fn load_products<C>(db: &C, filters: &ProductFilters) -> Result<Vec<Product>, DbErr>
where
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();
    let statement = backend.build(&build_product_query(filters));

    let rows = JsonValue::find_by_statement(statement).all(db).await?;

    let products = rows
        .iter()
        .filter_map(|row| match product_from_row(row) {
            Ok(product) => Some(product),
            Err(err) => {
                tracing::warn!(error = %err, row = %row, "skipping malformed catalog row");
                None
            }
        })
        .collect();

    Ok(products)
}

pub async fn find_product<C>(db: &C, product_id: i64) -> Result<Option<Product>, DbErr>
where
    C: ConnectionTrait,
{
    let mut products = load_products(db, &ProductFilters::by_id(product_id)).await?;
    Ok(products.pop())
}
