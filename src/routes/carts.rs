use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartCheckoutRequest, CartView, CheckoutResponse, SetCityRequest},
    error::AppResult,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_cart))
        .route("/{id}", get(get_cart))
        .route("/{id}/city", put(set_city))
        .route("/{id}/items", post(add_item).delete(clear_cart))
        .route("/{id}/items/{product_id}", delete(remove_item))
        .route("/{id}/items/{product_id}/increase", post(increase_quantity))
        .route("/{id}/items/{product_id}/decrease", post(decrease_quantity))
        .route("/{id}/checkout", post(checkout))
}

#[utoipa::path(
    post,
    path = "/api/carts",
    responses(
        (status = 201, description = "Empty cart session", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn create_cart(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<ApiResponse<CartView>>)> {
    let resp = cart_service::create_cart(&state).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/carts/{id}",
    params(("id" = Uuid, Path, description = "Cart session id")),
    responses(
        (status = 200, description = "Cart with totals", body = ApiResponse<CartView>),
        (status = 404, description = "Unknown or expired cart")
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::get_cart(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/carts/{id}/city",
    params(("id" = Uuid, Path, description = "Cart session id")),
    request_body = SetCityRequest,
    responses(
        (status = 200, description = "Destination set, shipping re-quoted", body = ApiResponse<CartView>),
        (status = 404, description = "Unknown or expired cart")
    ),
    tag = "Cart"
)]
pub async fn set_city(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetCityRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::set_city(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/carts/{id}/items",
    params(("id" = Uuid, Path, description = "Cart session id")),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Product added or its quantity increased", body = ApiResponse<CartView>),
        (status = 400, description = "Unknown or sold-out product"),
        (status = 404, description = "Unknown or expired cart")
    ),
    tag = "Cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::add_item(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/carts/{id}/items/{product_id}/increase",
    params(
        ("id" = Uuid, Path, description = "Cart session id"),
        ("product_id" = i64, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Quantity increased, or unchanged when the line is missing", body = ApiResponse<CartView>),
        (status = 404, description = "Unknown or expired cart")
    ),
    tag = "Cart"
)]
pub async fn increase_quantity(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, i64)>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::increase_quantity(&state, id, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/carts/{id}/items/{product_id}/decrease",
    params(
        ("id" = Uuid, Path, description = "Cart session id"),
        ("product_id" = i64, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Quantity decreased; the line is removed at zero", body = ApiResponse<CartView>),
        (status = 404, description = "Unknown or expired cart")
    ),
    tag = "Cart"
)]
pub async fn decrease_quantity(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, i64)>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::decrease_quantity(&state, id, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/carts/{id}/items/{product_id}",
    params(
        ("id" = Uuid, Path, description = "Cart session id"),
        ("product_id" = i64, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Line removed", body = ApiResponse<CartView>),
        (status = 404, description = "Unknown or expired cart")
    ),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, i64)>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::remove_item(&state, id, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/carts/{id}/items",
    params(("id" = Uuid, Path, description = "Cart session id")),
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<CartView>),
        (status = 404, description = "Unknown or expired cart")
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::clear_cart(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/carts/{id}/checkout",
    params(("id" = Uuid, Path, description = "Cart session id")),
    request_body = CartCheckoutRequest,
    responses(
        (status = 201, description = "Order recorded; WhatsApp link for that channel", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Empty cart, missing customer data or destination city"),
        (status = 404, description = "Unknown or expired cart")
    ),
    tag = "Cart"
)]
pub async fn checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CartCheckoutRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CheckoutResponse>>)> {
    let resp = cart_service::checkout(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
