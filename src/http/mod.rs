//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all route)
//!     → routing::Router::dispatch (handler + typed path variables)
//!     → request.rs (RequestContext with buffered body and request ID)
//!     → handler.rs (type-erased async handler)
//!     → response.rs (JSON / text / error bodies)
//!     → Send to client
//! ```

pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use handler::{handler, with_state, Handler};
pub use request::{MakeRequestUuid, RequestContext, X_REQUEST_ID};
pub use response::ApiError;
pub use server::HttpServer;
