//! Webhook registration.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;

use crate::api::ApiState;
use crate::http::{response, ApiError, RequestContext};
use crate::store::{NewWebhook, ObjectId, Webhook};

pub async fn register_webhook(state: Arc<ApiState>, ctx: RequestContext) -> Result<Response, ApiError> {
    let request: NewWebhook = ctx.json()?;
    if request.webhook_url.trim().is_empty() {
        return Err(ApiError::BadRequest("Invalid JSON".into()));
    }

    let webhook = Webhook::new(request);
    let id = state.store.insert_webhook(webhook)?;
    tracing::info!(id = %id, "Webhook registered");

    Ok(response::json(
        StatusCode::OK,
        &serde_json::json!({ "id": id.to_hex() }),
    ))
}

fn webhook_id(ctx: &RequestContext) -> Result<ObjectId, ApiError> {
    ctx.params()
        .object_id("id")
        .ok_or_else(|| ApiError::BadRequest("Invalid ID".into()))
}

pub async fn get_webhook(state: Arc<ApiState>, ctx: RequestContext) -> Result<Response, ApiError> {
    let id = webhook_id(&ctx)?;
    let webhook = state
        .store
        .webhook(&id)?
        .ok_or_else(|| ApiError::BadRequest("Invalid ID".into()))?;
    Ok(response::json(StatusCode::OK, &webhook))
}

pub async fn delete_webhook(state: Arc<ApiState>, ctx: RequestContext) -> Result<Response, ApiError> {
    let id = webhook_id(&ctx)?;
    if !state.store.delete_webhook(&id)? {
        return Err(ApiError::BadRequest("Invalid ID".into()));
    }
    tracing::info!(id = %id, "Webhook deleted");
    Ok(response::text(StatusCode::OK, "Webhook deleted"))
}
