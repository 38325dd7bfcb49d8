//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, path from PARAGLIDING_CONFIG)
//!     → loader.rs (parse & deserialize, apply PORT)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → consumed once at startup to build the router and server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; routes are compiled from it at startup
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{from_env, load_config, ConfigError};
pub use schema::{
    AdminConfig, ApiConfig, AppConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    RouterConfig, SecurityConfig, TimeoutConfig, WebhookConfig,
};
