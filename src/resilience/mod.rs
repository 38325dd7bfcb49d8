//! Resilience patterns for outgoing calls.
//!
//! # Design Decisions
//! - Only webhook delivery retries; inbound requests are never retried
//! - Backoff is exponential with jitter so simultaneous failures spread out

pub mod backoff;

pub use backoff::Backoff;
