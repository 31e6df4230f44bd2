use sea_orm::sea_query::{Alias, Condition, Expr, Order, Query, SelectStatement};

use super::filters::{AvailabilityFilter, ProductFilters};
use crate::entity::{
    categories::{Column as CategoryCol, Entity as Categories},
    products::{Column as ProductCol, Entity as Products},
};

/// Product columns selected by every catalog query, in row order.
const PRODUCT_COLUMNS: [ProductCol; 17] = [
    ProductCol::Id,
    ProductCol::CategoryId,
    ProductCol::Name,
    ProductCol::Description,
    ProductCol::Price,
    ProductCol::PreviousPrice,
    ProductCol::DiscountPercent,
    ProductCol::OnOffer,
    ProductCol::Availability,
    ProductCol::Size,
    ProductCol::Color,
    ProductCol::Image,
    ProductCol::Image2,
    ProductCol::Image3,
    ProductCol::Image4,
    ProductCol::Active,
    ProductCol::CreatedAt,
];

/// Single SELECT over active products in active categories, newest id first.
pub fn build_product_query(filters: &ProductFilters) -> SelectStatement {
    let mut condition = Condition::all()
        .add(Expr::col((Products, ProductCol::Active)).eq(true))
        .add(Expr::col((Categories, CategoryCol::Active)).eq(true));

    if let Some(id) = filters.product_id {
        condition = condition.add(Expr::col((Products, ProductCol::Id)).eq(id));
    }

    if let Some(category) = filters.category.as_ref() {
        condition = condition.add(
            Condition::any()
                .add(Expr::col((Categories, CategoryCol::Slug)).eq(category.as_str()))
                .add(Expr::col((Categories, CategoryCol::Name)).eq(category.as_str())),
        );
    }

    if filters.on_offer_only {
        condition = condition.add(Expr::col((Products, ProductCol::OnOffer)).eq(true));
    }

    if let AvailabilityFilter::Only(availability) = filters.availability {
        condition = condition
            .add(Expr::col((Products, ProductCol::Availability)).eq(availability.as_db_str()));
    }

    let mut query = Query::select();
    query
        .columns(PRODUCT_COLUMNS.map(|col| (Products, col)))
        .expr_as(
            Expr::col((Categories, CategoryCol::Name)),
            Alias::new("category_name"),
        )
        .expr_as(
            Expr::col((Categories, CategoryCol::Slug)),
            Alias::new("category_slug"),
        )
        .from(Products)
        .inner_join(
            Categories,
            Expr::col((Categories, CategoryCol::Id)).equals((Products, ProductCol::CategoryId)),
        )
        .cond_where(condition)
        .order_by((Products, ProductCol::Id), Order::Desc);

    if let Some(limit) = filters.limit {
        query.limit(limit);
    }

    query
}

#[cfg(test)]
mod tests {
    use sea_orm::sea_query::{MysqlQueryBuilder, Value};

    use super::*;

    fn sql(filters: &ProductFilters) -> String {
        build_product_query(filters).to_string(MysqlQueryBuilder)
    }

    #[test]
    fn base_query_restricts_to_active_rows_and_orders_by_id() {
        let (text, values) = build_product_query(&ProductFilters::default()).build(MysqlQueryBuilder);

        assert!(text.contains("FROM `products`"));
        assert!(text.contains(
            "INNER JOIN `categories` ON `categories`.`id` = `products`.`category_id`"
        ));
        assert!(text.contains("`products`.`active` = ?"));
        assert!(text.contains("`categories`.`active` = ?"));
        assert!(text.ends_with("ORDER BY `products`.`id` DESC"));
        assert!(!text.contains("LIMIT"));
        assert_eq!(values.0, vec![Value::Bool(Some(true)), Value::Bool(Some(true))]);
    }

    #[test]
    fn selects_category_aliases() {
        let text = sql(&ProductFilters::default());
        assert!(text.contains("`categories`.`name` AS `category_name`"));
        assert!(text.contains("`categories`.`slug` AS `category_slug`"));
        assert!(text.contains("`products`.`image_2`"));
    }

    #[test]
    fn sentinel_category_matches_unfiltered_query() {
        let todas = ProductFilters::from_raw(Some("todas"), None, None, None);
        assert_eq!(sql(&todas), sql(&ProductFilters::default()));
    }

    #[test]
    fn category_matches_slug_or_name() {
        let text = sql(&ProductFilters::from_raw(Some("camisetas"), None, None, None));
        assert!(text.contains(
            "(`categories`.`slug` = 'camisetas' OR `categories`.`name` = 'camisetas')"
        ));
    }

    #[test]
    fn availability_restricts_to_one_state() {
        let sold_out = sql(&ProductFilters::from_raw(None, None, Some("agotado"), None));
        assert!(sold_out.contains("`products`.`availability` = 'agotado'"));
        assert!(!sold_out.contains("'disponible'"));

        let available = sql(&ProductFilters::from_raw(None, None, Some("disponible"), None));
        assert!(available.contains("`products`.`availability` = 'disponible'"));
        assert!(!available.contains("'agotado'"));

        let all = sql(&ProductFilters::from_raw(None, None, Some("todas"), None));
        assert!(!all.contains("`availability` ="));
    }

    #[test]
    fn offer_flag_and_limit() {
        let filters = ProductFilters {
            on_offer_only: true,
            limit: Some(8),
            ..ProductFilters::default()
        };
        let (text, values) = build_product_query(&filters).build(MysqlQueryBuilder);
        assert!(text.contains("`products`.`on_offer` = ?"));
        assert!(text.ends_with("ORDER BY `products`.`id` DESC LIMIT ?"));
        assert_eq!(values.0.last(), Some(&Value::BigUnsigned(Some(8))));
    }

    #[test]
    fn by_id_lookup_is_bounded_to_one_row() {
        let filters = ProductFilters::by_id(42);
        assert_eq!(filters.availability, AvailabilityFilter::All);
        let text = sql(&filters);
        assert!(text.contains("`products`.`id` = 42"));
        assert!(text.ends_with("LIMIT 1"));
    }
}
