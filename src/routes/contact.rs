use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::contact::ContactRequest, error::AppResult, response::ApiResponse,
    services::contact_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_message))
}

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message stored", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Missing name, message or invalid email")
    ),
    tag = "Contact"
)]
pub async fn submit_message(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<serde_json::Value>>)> {
    let resp = contact_service::submit_message(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
