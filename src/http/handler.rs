//! Type-erased request handlers stored in the route trie.

use std::future::Future;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::http::request::RequestContext;

/// A handler bound to a (method, pattern) pair.
pub type Handler = Arc<dyn Fn(RequestContext) -> BoxFuture<'static, Response> + Send + Sync>;

/// Wrap an async function into a [`Handler`].
pub fn handler<F, Fut, R>(f: F) -> Handler
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + 'static,
{
    Arc::new(move |ctx| f(ctx).map(IntoResponse::into_response).boxed())
}

/// Wrap an async function that needs shared state.
pub fn with_state<S, F, Fut, R>(state: Arc<S>, f: F) -> Handler
where
    S: Send + Sync + 'static + ?Sized,
    F: Fn(Arc<S>, RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + 'static,
{
    Arc::new(move |ctx| {
        f(Arc::clone(&state), ctx)
            .map(IntoResponse::into_response)
            .boxed()
    })
}
