use std::collections::BTreeMap;

use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use sea_orm::ActiveValue::NotSet;

use crate::{
    cart::{
        Cart, MAX_LINE_QUANTITY,
        checkout::{CheckoutPayload, CustomerInfo, build_checkout_payload},
        shipping::ShippingStatus,
        whatsapp::whatsapp_link,
    },
    catalog,
    dto::{
        cart::{CheckoutChannel, CheckoutResponse},
        orders::PlaceOrderRequest,
    },
    entity::{
        order_items::{ActiveModel as OrderItemActive, Model as OrderItemModel},
        orders::{ActiveModel as OrderActive, Model as OrderModel},
    },
    error::{AppError, AppResult},
    models::{Availability, Order, OrderItem},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const INITIAL_STATUS: &str = "pending";

/// Order intake for clients that keep their cart locally. Prices are always
/// re-read from the catalog; the client only names products and quantities.
pub async fn place_order(
    state: &AppState,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    // Merge repeated product ids; BTreeMap keeps the rebuilt cart deterministic.
    let mut quantities: BTreeMap<i64, u32> = BTreeMap::new();
    for line in &payload.items {
        if line.quantity == 0 {
            return Err(AppError::BadRequest(format!(
                "quantity for product {} must be greater than 0",
                line.product_id
            )));
        }
        let entry = quantities.entry(line.product_id).or_default();
        *entry = entry.saturating_add(line.quantity);
    }

    let mut cart = Cart::new();
    for (product_id, quantity) in quantities {
        if quantity > MAX_LINE_QUANTITY {
            return Err(AppError::BadRequest(format!(
                "quantity for product {product_id} exceeds {MAX_LINE_QUANTITY}"
            )));
        }
        let product = catalog::find_product(&state.orm, product_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("product {product_id} not found")))?;
        if product.availability == Availability::SoldOut {
            return Err(AppError::BadRequest(format!(
                "product {product_id} is sold out"
            )));
        }
        cart.add_item(&product);
        for _ in 1..quantity {
            cart.increase_quantity(product_id);
        }
    }

    let response = submit_checkout(state, &cart, payload.customer, payload.channel).await?;
    Ok(ApiResponse::success(
        "Order placed",
        response,
        Some(Meta::empty()),
    ))
}

/// Validates, snapshots and records a checkout. Shared by the stateless
/// order intake and the cart-session checkout.
pub(crate) async fn submit_checkout(
    state: &AppState,
    cart: &Cart,
    customer: CustomerInfo,
    channel: CheckoutChannel,
) -> AppResult<CheckoutResponse> {
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    if let Some(line) = cart.items().iter().find(|l| l.quantity > MAX_LINE_QUANTITY) {
        return Err(AppError::BadRequest(format!(
            "quantity for product {} exceeds {MAX_LINE_QUANTITY}",
            line.product_id
        )));
    }
    let missing = customer.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "missing customer fields: {}",
            missing.join(", ")
        )));
    }

    let payload = build_checkout_payload(cart, customer, &state.config.shipping);
    if payload.shipping_status == ShippingStatus::Pending {
        return Err(AppError::BadRequest("destination city is required".into()));
    }

    let order = record_order(state, &payload, channel).await?;

    let whatsapp_url = match channel {
        CheckoutChannel::Whatsapp => Some(whatsapp_link(&state.config.whatsapp_number, &payload)),
        CheckoutChannel::Backend => None,
    };

    tracing::info!(
        order_id = order.id,
        channel = channel.as_str(),
        total = %payload.total,
        units = payload.unit_count(),
        "order placed"
    );

    Ok(CheckoutResponse {
        channel,
        order_id: Some(order.id),
        whatsapp_url,
        payload,
    })
}

async fn record_order(
    state: &AppState,
    payload: &CheckoutPayload,
    channel: CheckoutChannel,
) -> AppResult<OrderModel> {
    let txn = state.orm.begin().await?;
    let customer = &payload.customer;

    let order = OrderActive {
        id: NotSet,
        customer_name: Set(customer.name.trim().to_string()),
        customer_phone: Set(customer.phone.trim().to_string()),
        customer_email: Set(customer
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)),
        address: Set(customer.address.trim().to_string()),
        city: Set(customer.city.trim().to_string()),
        notes: Set(customer.notes.clone().filter(|n| !n.trim().is_empty())),
        subtotal: Set(payload.subtotal),
        shipping_cost: Set(payload.shipping_cost),
        total: Set(payload.total),
        status: Set(INITIAL_STATUS.into()),
        channel: Set(channel.as_str().into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for line in &payload.lines {
        OrderItemActive {
            id: NotSet,
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            product_name: Set(line.name.clone()),
            unit_price: Set(line.unit_price),
            quantity: Set(i32::try_from(line.quantity).unwrap_or(i32::MAX)),
            line_total: Set(line.line_total),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(order)
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        customer_name: model.customer_name,
        customer_phone: model.customer_phone,
        customer_email: model.customer_email,
        address: model.address,
        city: model.city,
        notes: model.notes,
        subtotal: model.subtotal,
        shipping_cost: model.shipping_cost,
        total: model.total,
        status: model.status,
        channel: model.channel,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        product_name: model.product_name,
        unit_price: model.unit_price,
        quantity: model.quantity,
        line_total: model.line_total,
    }
}
