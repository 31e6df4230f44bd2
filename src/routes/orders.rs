use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::{cart::CheckoutResponse, orders::PlaceOrderRequest},
    error::AppResult,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(place_order))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order recorded", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Empty cart, unknown or sold-out product, missing customer data")
    ),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CheckoutResponse>>)> {
    let resp = order_service::place_order(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
