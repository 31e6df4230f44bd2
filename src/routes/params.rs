use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::catalog::ProductFilters;

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Public catalog filters. Every field is kept as a raw string so malformed
/// values degrade to "no restriction" instead of a 400.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogQuery {
    /// Category slug or name; `todas`/`all` means every category.
    pub category: Option<String>,
    /// `1`/`true` restricts to products on offer.
    pub on_offer: Option<String>,
    /// `disponible`, `agotado` or `todas`.
    pub availability: Option<String>,
    /// Maximum number of products; non-numeric values are ignored.
    pub limit: Option<String>,
}

impl From<&CatalogQuery> for ProductFilters {
    fn from(query: &CatalogQuery) -> Self {
        ProductFilters::from_raw(
            query.category.as_deref(),
            query.on_offer.as_deref(),
            query.availability.as_deref(),
            query.limit.as_deref(),
        )
    }
}

// Pagination fields are repeated rather than flattened: `serde(flatten)`
// loses the numeric types of query-string values.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MessageListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// `true` lists only messages not yet marked as read.
    pub unread: Option<bool>,
}

impl MessageListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}
