use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Availability, Product};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[schema(value_type = Option<f64>)]
    pub previous_price: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub discount_percent: Option<Decimal>,
    #[serde(default)]
    pub on_offer: bool,
    #[serde(default)]
    pub availability: Availability,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Every field is optional; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub previous_price: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub discount_percent: Option<Decimal>,
    pub on_offer: Option<bool>,
    pub availability: Option<Availability>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
