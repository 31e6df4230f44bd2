use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stock state of a product. Stored as `disponible` / `agotado`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    #[default]
    Available,
    SoldOut,
}

impl Availability {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Availability::Available => "disponible",
            Availability::SoldOut => "agotado",
        }
    }

    /// Accepts the stored Spanish values as well as the API spellings.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "disponible" | "available" => Some(Availability::Available),
            "agotado" | "sold-out" | "sold_out" | "soldout" => Some(Availability::SoldOut),
            _ => None,
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[schema(value_type = Option<f64>)]
    pub previous_price: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub discount_percent: Option<Decimal>,
    pub on_offer: bool,
    pub availability: Availability,
    pub category: Option<CategoryRef>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub address: String,
    pub city: String,
    pub notes: Option<String>,
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
    #[schema(value_type = f64)]
    pub shipping_cost: Decimal,
    #[schema(value_type = f64)]
    pub total: Decimal,
    pub status: String,
    pub channel: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    pub quantity: i32,
    #[schema(value_type = f64)]
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub resource: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_parses_stored_and_api_spellings() {
        assert_eq!(Availability::parse("agotado"), Some(Availability::SoldOut));
        assert_eq!(Availability::parse("Sold-Out"), Some(Availability::SoldOut));
        assert_eq!(Availability::parse(" disponible "), Some(Availability::Available));
        assert_eq!(Availability::parse("todas"), None);
    }
}
