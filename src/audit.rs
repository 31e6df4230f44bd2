use serde_json::Value;

use crate::{db::DbPool, error::AppResult, middleware::auth::AdminUser};

/// Record an admin mutation. Callers treat failures as warnings, never as request errors.
pub async fn log_audit(
    pool: &DbPool,
    actor: Option<&AdminUser>,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (user_id, action, resource, metadata)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(actor.map(|a| a.user_id))
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fire-and-log wrapper used by the admin services.
pub async fn record(
    pool: &DbPool,
    actor: &AdminUser,
    action: &str,
    resource: &str,
    metadata: Value,
) {
    if let Err(err) = log_audit(pool, Some(actor), action, Some(resource), Some(metadata)).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
