//! Ticker: paged view over tracks in registration order.

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::Response;
use serde::{Deserialize, Serialize};

use crate::api::ApiState;
use crate::http::{response, ApiError, RequestContext};
use crate::store::Store;

/// One page of the ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerPage {
    /// Timestamp of the newest track overall.
    pub t_latest: i64,
    /// Timestamp of the first track on this page.
    pub t_start: i64,
    /// Timestamp of the last track on this page; the cursor for the next one.
    pub t_stop: i64,
    pub tracks: Vec<String>,
    /// Time spent building the page, in milliseconds.
    pub processing: u64,
}

/// Up to `limit` tracks registered strictly after `after`.
pub fn page(store: &dyn Store, after: i64, limit: usize, start: Instant) -> Result<TickerPage, ApiError> {
    let t_latest = store
        .latest_timestamp()?
        .ok_or_else(|| ApiError::BadRequest("No tracks added yet".into()))?;

    let tracks = store.tracks_after(after, limit)?;
    let (Some(first), Some(last)) = (tracks.first(), tracks.last()) else {
        return Err(ApiError::BadRequest("No more tracks".into()));
    };

    Ok(TickerPage {
        t_latest,
        t_start: first.ts,
        t_stop: last.ts,
        tracks: tracks.iter().map(|t| t.id.to_hex()).collect(),
        processing: start.elapsed().as_millis() as u64,
    })
}

pub async fn get_latest(state: Arc<ApiState>, _ctx: RequestContext) -> Result<Response, ApiError> {
    let latest = state
        .store
        .latest_timestamp()?
        .ok_or_else(|| ApiError::BadRequest("No tracks added yet".into()))?;
    Ok(response::text(StatusCode::OK, latest.to_string()))
}

/// Serves both `ticker` and `ticker/{timestamp}`.
pub async fn get_ticker(state: Arc<ApiState>, ctx: RequestContext) -> Result<Response, ApiError> {
    let start = Instant::now();
    let after = ctx.params().int("timestamp").unwrap_or(0);
    let page = page(state.store.as_ref(), after, state.ticker_limit, start)?;
    Ok(response::json(StatusCode::OK, &page))
}
