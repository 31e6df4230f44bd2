use uuid::Uuid;

use crate::{
    catalog,
    cart::store::CartSession,
    dto::cart::{AddToCartRequest, CartCheckoutRequest, CartView, CheckoutResponse, SetCityRequest},
    error::{AppError, AppResult},
    models::Availability,
    response::{ApiResponse, Meta},
    services::order_service,
    state::AppState,
};

pub async fn create_cart(state: &AppState) -> AppResult<ApiResponse<CartView>> {
    let (id, session) = state.carts.create().await;
    tracing::debug!(cart_id = %id, "cart session created");
    Ok(view("Cart created", id, &session, state))
}

pub async fn get_cart(state: &AppState, id: Uuid) -> AppResult<ApiResponse<CartView>> {
    let session = state.carts.get(id).await.ok_or(AppError::NotFound)?;
    Ok(view("OK", id, &session, state))
}

pub async fn set_city(
    state: &AppState,
    id: Uuid,
    payload: SetCityRequest,
) -> AppResult<ApiResponse<CartView>> {
    let city = payload
        .city
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    let session = state
        .carts
        .update(id, |s| {
            s.city = city;
            s.clone()
        })
        .await
        .ok_or(AppError::NotFound)?;
    Ok(view("Destination updated", id, &session, state))
}

pub async fn add_item(
    state: &AppState,
    id: Uuid,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    // Fail fast on unknown sessions before touching the database.
    if state.carts.get(id).await.is_none() {
        return Err(AppError::NotFound);
    }

    let product = catalog::find_product(&state.orm, payload.product_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("product not found".into()))?;
    if product.availability == Availability::SoldOut {
        return Err(AppError::BadRequest("product is sold out".into()));
    }

    let session = state
        .carts
        .update(id, |s| {
            s.cart.add_item(&product);
            s.clone()
        })
        .await
        .ok_or(AppError::NotFound)?;
    Ok(view("Added to cart", id, &session, state))
}

pub async fn increase_quantity(
    state: &AppState,
    id: Uuid,
    product_id: i64,
) -> AppResult<ApiResponse<CartView>> {
    mutate(state, id, |s| s.cart.increase_quantity(product_id)).await
}

pub async fn decrease_quantity(
    state: &AppState,
    id: Uuid,
    product_id: i64,
) -> AppResult<ApiResponse<CartView>> {
    mutate(state, id, |s| s.cart.decrease_quantity(product_id)).await
}

pub async fn remove_item(
    state: &AppState,
    id: Uuid,
    product_id: i64,
) -> AppResult<ApiResponse<CartView>> {
    mutate(state, id, |s| s.cart.remove_item(product_id)).await
}

pub async fn clear_cart(state: &AppState, id: Uuid) -> AppResult<ApiResponse<CartView>> {
    mutate(state, id, |s| {
        s.cart.clear();
        true
    })
    .await
}

/// Submits the session cart. The cart is taken out of the session before the
/// order is recorded, so a second checkout racing this one sees an empty cart.
/// On failure the cart goes back, merged with anything added meanwhile.
pub async fn checkout(
    state: &AppState,
    id: Uuid,
    payload: CartCheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let (cart, city) = state.carts.take_cart(id).await.ok_or(AppError::NotFound)?;
    let mut customer = payload.customer;
    if customer.city.trim().is_empty() {
        if let Some(city) = city {
            customer.city = city;
        }
    }

    let response =
        match order_service::submit_checkout(state, &cart, customer, payload.channel).await {
            Ok(response) => response,
            Err(err) => {
                if !cart.is_empty() && !state.carts.restore_cart(id, cart).await {
                    tracing::warn!(cart_id = %id, "cart session expired during checkout");
                }
                return Err(err);
            }
        };

    Ok(ApiResponse::success(
        "Checkout success",
        response,
        Some(Meta::empty()),
    ))
}

/// Mutations on missing lines leave the cart untouched and still answer 200.
async fn mutate(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&mut CartSession) -> bool,
) -> AppResult<ApiResponse<CartView>> {
    let (changed, session) = state
        .carts
        .update(id, |s| (f(s), s.clone()))
        .await
        .ok_or(AppError::NotFound)?;
    let message = if changed { "Cart updated" } else { "Item not in cart" };
    Ok(view(message, id, &session, state))
}

fn view(message: &str, id: Uuid, session: &CartSession, state: &AppState) -> ApiResponse<CartView> {
    ApiResponse::success(
        message,
        CartView::from_session(id, session, &state.config.shipping),
        Some(Meta::empty()),
    )
}
