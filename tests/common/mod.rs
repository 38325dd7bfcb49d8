//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::{extract::State, routing::post, Json};
use futures_util::future::{self, BoxFuture};
use futures_util::FutureExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use url::Url;

use paragliding_api::api::{FetchError, TrackSource};
use paragliding_api::config::AppConfig;
use paragliding_api::lifecycle::build_server_with;
use paragliding_api::store::MemoryStore;
use paragliding_api::HttpServer;

pub const IGC_URL: &str = "http://flights.example.com/2018-07-02/rush.igc";
pub const OTHER_IGC_URL: &str = "http://flights.example.com/2016-02-19/madrid.IGC";
pub const BROKEN_IGC_URL: &str = "http://flights.example.com/broken.igc";

pub const SAMPLE_IGC: &str = "AXXXABC FLIGHT:1\r\n\
HFDTE020718\r\n\
HFPLTPILOTINCHARGE: Aladin Sane\r\n\
HFGTYGLIDERTYPE: Ozone Rush 5\r\n\
HFGIDGLIDERID: D-1234\r\n\
B1101355206343N00006198WA0058700558\r\n\
B1101455206259N00006295WA0059300556\r\n\
B1101555206300N00006061WA0060300576\r\n";

pub const OTHER_IGC: &str = "AXGD\n\
HFDTEDATE:190216,01\n\
HFPLTPILOTINCHARGE:Miguel Angel Gordillo\n\
HFGTYGLIDERTYPE:RV8\n\
HFGIDGLIDERID:EC-XLL\n\
B0948104024210N00342233WA0067500713\n\
B1413083636633N00607450WA0002000042\n";

/// Serves IGC files from memory, keyed by URL.
pub struct MockSource {
    files: HashMap<String, String>,
}

impl MockSource {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        files.insert(IGC_URL.to_string(), SAMPLE_IGC.to_string());
        files.insert(OTHER_IGC_URL.to_string(), OTHER_IGC.to_string());
        files.insert(BROKEN_IGC_URL.to_string(), "<html>moved</html>".to_string());
        Self { files }
    }
}

impl TrackSource for MockSource {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<String, FetchError>> {
        let result = self
            .files
            .get(url.as_str())
            .cloned()
            .ok_or(FetchError::Status(404));
        future::ready(result).boxed()
    }
}

/// Server wired to an in-memory store and [`MockSource`].
pub fn test_server(config: AppConfig) -> (HttpServer, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let server = build_server_with(config, store.clone(), Arc::new(MockSource::new()))
        .expect("route table should compile");
    (server, store)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// Start an HTTP endpoint that forwards every JSON body posted to `/hook`.
pub async fn start_webhook_receiver() -> (String, mpsc::UnboundedReceiver<serde_json::Value>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = axum::Router::new()
        .route(
            "/hook",
            post(
                |State(tx): State<mpsc::UnboundedSender<serde_json::Value>>,
                 Json(body): Json<serde_json::Value>| async move {
                    let _ = tx.send(body);
                    "ok"
                },
            ),
        )
        .with_state(tx);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}/hook", addr), rx)
}

/// Wait for the next webhook body, failing the test after two seconds.
pub async fn next_delivery(rx: &mut mpsc::UnboundedReceiver<serde_json::Value>) -> serde_json::Value {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("webhook was not invoked in time")
        .expect("receiver closed")
}
