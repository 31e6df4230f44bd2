use crate::{
    db::DbPool,
    dto::contact::ContactRequest,
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
};

const MAX_MESSAGE_LEN: usize = 2000;

pub async fn submit_message(
    pool: &DbPool,
    payload: ContactRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let ContactRequest {
        name,
        email,
        phone,
        message,
    } = payload;

    let name = name.trim();
    let email = email.trim();
    let message = message.trim();
    if name.is_empty() || message.is_empty() {
        return Err(AppError::BadRequest("name and message are required".into()));
    }
    if !looks_like_email(email) {
        return Err(AppError::BadRequest("invalid email".into()));
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(AppError::BadRequest(format!(
            "message longer than {MAX_MESSAGE_LEN} characters"
        )));
    }
    let phone = phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());

    let result = sqlx::query(
        r#"
        INSERT INTO contact_messages (name, email, phone, message)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(message)
    .execute(pool)
    .await?;

    let id = result.last_insert_id();
    tracing::info!(message_id = id, "contact message received");

    Ok(ApiResponse::success(
        "Message received",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::looks_like_email;

    #[test]
    fn email_shape_check() {
        assert!(looks_like_email("ventas@tienda.co"));
        assert!(!looks_like_email("ventas@tienda"));
        assert!(!looks_like_email("@tienda.co"));
        assert!(!looks_like_email("ventas.tienda.co"));
    }
}
