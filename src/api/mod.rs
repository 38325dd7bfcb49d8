//! Paragliding track API.
//!
//! # Routes
//! ```text
//! GET    <root>                                → redirect to <root>/api
//! GET    <root>/api                            → service info
//! GET    <root>/api/track                      → all track ids
//! POST   <root>/api/track                      → register a track from an IGC URL
//! GET    <root>/api/track/{id}                 → track metadata
//! GET    <root>/api/track/{id}/{field}         → one field as plain text
//! GET    <root>/api/ticker                     → first ticker page
//! GET    <root>/api/ticker/latest              → newest timestamp
//! GET    <root>/api/ticker/{timestamp}         → ticker page after timestamp
//! POST   <root>/api/webhook/new_track          → register a webhook
//! GET    <root>/api/webhook/new_track/{id}     → webhook
//! DELETE <root>/api/webhook/new_track/{id}     → delete webhook
//! GET    <admin>/api/tracks_count              → number of tracks
//! DELETE <admin>/api/tracks                    → delete every track
//! ```

pub mod admin;
pub mod info;
pub mod ticker;
pub mod track;
pub mod webhook;

use std::sync::Arc;
use std::time::Instant;

use axum::http::Method;

use crate::config::AppConfig;
use crate::http::{handler, response, with_state, Handler};
use crate::notify::WebhookDispatcher;
use crate::routing::{validator, RouteError, Router};
use crate::store::{Store, TRACK_FIELDS};

pub use crate::http::ApiError;
pub use ticker::TickerPage;
pub use track::{FetchError, HttpTrackSource, TrackSource};

/// Shared state of every API handler.
pub struct ApiState {
    pub store: Arc<dyn Store>,
    pub source: Arc<dyn TrackSource>,
    pub notifier: Arc<WebhookDispatcher>,
    pub started: Instant,
    pub ticker_limit: usize,
    pub admin_api_key: Option<String>,
}

impl ApiState {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn Store>,
        source: Arc<dyn TrackSource>,
        notifier: Arc<WebhookDispatcher>,
    ) -> Self {
        Self {
            store,
            source,
            notifier,
            started: Instant::now(),
            ticker_limit: config.api.ticker_limit,
            admin_api_key: config.admin.api_key.clone(),
        }
    }
}

fn mount(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

/// Register every API route and its path validators.
pub fn build_router(config: &AppConfig, state: Arc<ApiState>) -> Result<Router<Handler>, RouteError> {
    let root = mount(&config.api.root_path);
    let api = format!("{}/api", root);
    let admin = format!("{}/api", mount(&config.api.admin_path));

    let mut builder = Router::builder()
        .allow_overwrite(config.router.allow_overwrite)
        .collapse_method_not_allowed(config.router.collapse_method_not_allowed);

    builder
        .validate("id", validator::object_id)
        .validate("field", validator::one_of(TRACK_FIELDS))
        .validate("timestamp", validator::integer);

    let api_location = api.clone();
    let redirect = handler(move |_ctx| {
        let location = api_location.clone();
        async move { response::redirect(&location) }
    });

    let s = &state;
    builder
        .handle(Method::GET, &root, redirect)?
        .handle(Method::GET, &api, with_state(s.clone(), info::get_info))?
        .handle(Method::GET, &format!("{}/track", api), with_state(s.clone(), track::list_tracks))?
        .handle(Method::POST, &format!("{}/track", api), with_state(s.clone(), track::register_track))?
        .handle(Method::GET, &format!("{}/track/{{id}}", api), with_state(s.clone(), track::get_track))?
        .handle(
            Method::GET,
            &format!("{}/track/{{id}}/{{field}}", api),
            with_state(s.clone(), track::get_track_field),
        )?
        .handle(Method::GET, &format!("{}/ticker", api), with_state(s.clone(), ticker::get_ticker))?
        .handle(Method::GET, &format!("{}/ticker/latest", api), with_state(s.clone(), ticker::get_latest))?
        .handle(
            Method::GET,
            &format!("{}/ticker/{{timestamp}}", api),
            with_state(s.clone(), ticker::get_ticker),
        )?
        .handle(
            Method::POST,
            &format!("{}/webhook/new_track", api),
            with_state(s.clone(), webhook::register_webhook),
        )?
        .handle(
            Method::GET,
            &format!("{}/webhook/new_track/{{id}}", api),
            with_state(s.clone(), webhook::get_webhook),
        )?
        .handle(
            Method::DELETE,
            &format!("{}/webhook/new_track/{{id}}", api),
            with_state(s.clone(), webhook::delete_webhook),
        )?
        .handle(Method::GET, &format!("{}/tracks_count", admin), with_state(s.clone(), admin::tracks_count))?
        .handle(Method::DELETE, &format!("{}/tracks", admin), with_state(s.clone(), admin::delete_tracks))?;

    let router = builder.build();
    for (method, pattern) in router.routes() {
        tracing::debug!(method = %method, pattern = %pattern, "Route registered");
    }
    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::track::FetchError;
    use crate::routing::{Dispatch, PathValue};
    use crate::store::{MemoryStore, ObjectId};
    use futures_util::future::{self, BoxFuture};
    use futures_util::FutureExt;
    use url::Url;

    struct NoSource;

    impl TrackSource for NoSource {
        fn fetch<'a>(&'a self, _url: &'a Url) -> BoxFuture<'a, Result<String, FetchError>> {
            future::ready(Err(FetchError::Status(404))).boxed()
        }
    }

    fn router(config: &AppConfig) -> Router<Handler> {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let notifier = Arc::new(WebhookDispatcher::new(store.clone(), &config.webhooks).unwrap());
        let state = Arc::new(ApiState::new(config, store, Arc::new(NoSource), notifier));
        build_router(config, state).unwrap()
    }

    fn pattern_of(router: &Router<Handler>, method: &Method, path: &str) -> Option<String> {
        match router.dispatch(method, path) {
            Dispatch::Matched { pattern, .. } => Some(pattern.to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_routes_are_mounted() {
        let config = AppConfig::default();
        let router = router(&config);
        assert_eq!(router.routes().len(), 14);

        let id = ObjectId::new().to_hex();
        assert_eq!(
            pattern_of(&router, &Method::GET, &format!("/paragliding/api/track/{}/pilot", id)).as_deref(),
            Some("/paragliding/api/track/{id}/{field}")
        );
        assert_eq!(
            pattern_of(&router, &Method::GET, "/paragliding/api/ticker/latest").as_deref(),
            Some("/paragliding/api/ticker/latest")
        );
        assert_eq!(
            pattern_of(&router, &Method::DELETE, "/admin/api/tracks").as_deref(),
            Some("/admin/api/tracks")
        );
    }

    #[test]
    fn test_validators_applied() {
        let router = router(&AppConfig::default());

        assert!(matches!(
            router.dispatch(&Method::GET, "/paragliding/api/track/not-an-id"),
            Dispatch::NotFound
        ));
        let id = ObjectId::new().to_hex();
        assert!(matches!(
            router.dispatch(&Method::GET, &format!("/paragliding/api/track/{}/colour", id)),
            Dispatch::NotFound
        ));

        match router.dispatch(&Method::GET, "/paragliding/api/ticker/1500") {
            Dispatch::Matched { params, .. } => {
                assert_eq!(params.get("timestamp"), Some(&PathValue::Int(1500)))
            }
            _ => panic!("ticker timestamp did not match"),
        }
    }

    #[test]
    fn test_custom_mount_points() {
        let mut config = AppConfig::default();
        config.api.root_path = "/v2/gliding/".into();
        config.api.admin_path = "ops".into();
        let router = router(&config);

        assert!(pattern_of(&router, &Method::GET, "/v2/gliding/api").is_some());
        assert!(pattern_of(&router, &Method::GET, "/ops/api/tracks_count").is_some());
        assert!(pattern_of(&router, &Method::GET, "/paragliding/api").is_none());
    }
}
