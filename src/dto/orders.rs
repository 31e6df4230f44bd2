use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    cart::checkout::CustomerInfo,
    dto::cart::CheckoutChannel,
    models::{Order, OrderItem},
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub product_id: i64,
    pub quantity: u32,
}

/// Order submitted by a client that kept its cart locally.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub customer: CustomerInfo,
    pub items: Vec<OrderLineRequest>,
    #[serde(default = "backend_channel")]
    pub channel: CheckoutChannel,
}

fn backend_channel() -> CheckoutChannel {
    CheckoutChannel::Backend
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}
