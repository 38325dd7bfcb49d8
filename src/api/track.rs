//! Track registration and lookup.
//!
//! # Responsibilities
//! - Accept an IGC URL, fetch and parse it, store the resulting track
//! - List track ids, return a track or one of its fields
//! - Notify webhooks after every successful registration
//!
//! # Design Decisions
//! - Fetching sits behind [`TrackSource`] so tests never touch the network
//! - The stored URL is the one the client sent, not the normalized form

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::Response;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::api::ApiState;
use crate::http::{response, ApiError, RequestContext};
use crate::igc;
use crate::store::{ObjectId, Track};

/// Failure to retrieve an IGC file.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server responded with status {0}")]
    Status(u16),
}

/// Where IGC files come from.
pub trait TrackSource: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<String, FetchError>>;
}

/// Fetches IGC files over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTrackSource {
    client: reqwest::Client,
}

impl HttpTrackSource {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl TrackSource for HttpTrackSource {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<String, FetchError>> {
        async move {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            Ok(response.text().await?)
        }
        .boxed()
    }
}

#[derive(Debug, Deserialize)]
struct NewTrack {
    url: String,
}

/// Absolute URL whose path ends in `.igc` (any case).
pub fn igc_link(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    let is_igc = url
        .path()
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("igc"));
    is_igc.then_some(url)
}

pub async fn list_tracks(state: Arc<ApiState>, _ctx: RequestContext) -> Result<Response, ApiError> {
    let ids: Vec<String> = state
        .store
        .track_ids()?
        .iter()
        .map(ObjectId::to_hex)
        .collect();
    Ok(response::json(StatusCode::OK, &ids))
}

pub async fn register_track(state: Arc<ApiState>, ctx: RequestContext) -> Result<Response, ApiError> {
    let request: NewTrack = ctx.json()?;
    let url = igc_link(&request.url)
        .ok_or_else(|| ApiError::BadRequest("This is not a valid IGC resource".into()))?;

    let parsed = match state.source.fetch(&url).await {
        Ok(content) => igc::parse(&content).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    let parsed = parsed.map_err(|e| {
        tracing::warn!(url = %url, error = %e, "Failed to load IGC file");
        ApiError::BadRequest("Error parsing IGC file".into())
    })?;

    let track = Track {
        id: ObjectId::new(),
        ts: 0,
        h_date: parsed.date.as_ref().map(ToString::to_string).unwrap_or_default(),
        pilot: parsed.pilot.clone(),
        glider: parsed.glider_type.clone(),
        glider_id: parsed.glider_id.clone(),
        track_length: parsed.track_length(),
        track_src_url: request.url,
    };
    let id = state.store.insert_track(track)?.id;
    tracing::info!(id = %id, fixes = parsed.fixes.len(), "Track registered");

    if let Err(e) = state.notifier.notify_new_track() {
        tracing::error!(error = %e, "Failed to update webhook triggers");
    }

    Ok(response::json(
        StatusCode::OK,
        &serde_json::json!({ "id": id.to_hex() }),
    ))
}

fn track_id(ctx: &RequestContext) -> Result<ObjectId, ApiError> {
    ctx.params()
        .object_id("id")
        .ok_or_else(|| ApiError::BadRequest("Invalid ID".into()))
}

fn find_track(state: &ApiState, ctx: &RequestContext) -> Result<Track, ApiError> {
    let id = track_id(ctx)?;
    state
        .store
        .track(&id)?
        .ok_or_else(|| ApiError::BadRequest("Invalid ID".into()))
}

pub async fn get_track(state: Arc<ApiState>, ctx: RequestContext) -> Result<Response, ApiError> {
    let track = find_track(&state, &ctx)?;
    Ok(response::json(StatusCode::OK, &track))
}

pub async fn get_track_field(state: Arc<ApiState>, ctx: RequestContext) -> Result<Response, ApiError> {
    let track = find_track(&state, &ctx)?;
    let field = ctx.params().str("field").unwrap_or_default();
    let value = track
        .field(field)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown field {:?}", field)))?;
    Ok(response::text(StatusCode::OK, value))
}
