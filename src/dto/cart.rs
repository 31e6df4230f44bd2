use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cart::{
    Cart, CartLineItem,
    checkout::{CheckoutPayload, CustomerInfo},
    shipping::{ShippingPolicy, ShippingStatus},
    store::CartSession,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetCityRequest {
    /// Empty or missing clears the destination.
    pub city: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutChannel {
    #[default]
    Whatsapp,
    Backend,
}

impl CheckoutChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutChannel::Whatsapp => "whatsapp",
            CheckoutChannel::Backend => "backend",
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartCheckoutRequest {
    pub customer: CustomerInfo,
    #[serde(default)]
    pub channel: CheckoutChannel,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub id: Uuid,
    pub items: Vec<CartLineItem>,
    pub item_count: u32,
    pub city: Option<String>,
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
    pub shipping_status: ShippingStatus,
    #[schema(value_type = f64)]
    pub shipping_cost: Decimal,
    #[schema(value_type = f64)]
    pub total: Decimal,
}

impl CartView {
    pub fn new(id: Uuid, cart: &Cart, city: Option<&str>, policy: &ShippingPolicy) -> Self {
        let subtotal = cart.subtotal();
        let quote = policy.quote(city, subtotal);
        Self {
            id,
            items: cart.items().to_vec(),
            item_count: cart.unit_count(),
            city: city.map(str::to_string),
            subtotal,
            shipping_status: quote.status(),
            shipping_cost: quote.amount(),
            total: subtotal + quote.amount(),
        }
    }

    pub fn from_session(id: Uuid, session: &CartSession, policy: &ShippingPolicy) -> Self {
        Self::new(id, &session.cart, session.city(), policy)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub channel: CheckoutChannel,
    /// Present once the order has been recorded.
    pub order_id: Option<i64>,
    /// Pre-filled WhatsApp link for the `whatsapp` channel.
    pub whatsapp_url: Option<String>,
    pub payload: CheckoutPayload,
}
