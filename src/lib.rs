//! Paragliding track service.
//!
//! Registers IGC flight tracks by URL, serves their metadata, pages through
//! them with a ticker and notifies webhooks as new tracks arrive. Requests are
//! routed by a method-aware path trie with typed, validated path variables.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ routing::Router ──▶ api handler ──▶ store
//!                     (axum + tower     (trie dispatch,        │            (MemoryStore)
//!                      middleware)       validators)           │
//!                                                              ├──▶ igc (parse + length)
//!                                                              └──▶ notify (webhooks)
//!
//!     Cross-cutting: config, observability, resilience, lifecycle
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;

// Application
pub mod api;
pub mod igc;
pub mod notify;
pub mod store;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
