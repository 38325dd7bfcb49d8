//! Admin endpoints.
//!
//! When an API key is configured, every admin request must carry
//! `Authorization: Bearer <key>`.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;

use crate::api::ApiState;
use crate::http::{response, ApiError, RequestContext};

fn authorize(state: &ApiState, ctx: &RequestContext) -> Result<(), ApiError> {
    let Some(expected) = state.admin_api_key.as_deref() else {
        return Ok(());
    };

    match ctx.bearer_token() {
        Some(token) if token == expected => Ok(()),
        _ => {
            tracing::warn!(request_id = %ctx.request_id(), "Rejected admin request");
            Err(ApiError::Unauthorized)
        }
    }
}

pub async fn tracks_count(state: Arc<ApiState>, ctx: RequestContext) -> Result<Response, ApiError> {
    authorize(&state, &ctx)?;
    let count = state.store.track_count()?;
    Ok(response::text(StatusCode::OK, count.to_string()))
}

pub async fn delete_tracks(state: Arc<ApiState>, ctx: RequestContext) -> Result<Response, ApiError> {
    authorize(&state, &ctx)?;
    let deleted = state.store.delete_tracks()?;
    tracing::info!(deleted, "Deleted all tracks");
    Ok(response::text(StatusCode::OK, "Everything deleted"))
}
