//! Document store boundary.
//!
//! # Data Flow
//! ```text
//! api handlers
//!     → Store trait (typed collection operations)
//!     → memory.rs (DashMap collections)
//!
//! Collections:
//!     tracks   → Track   (ordered by registration timestamp)
//!     webhooks → Webhook (trigger counters)
//! ```
//!
//! # Design Decisions
//! - Operations are synchronous; a networked backend would sit behind the same trait
//! - Ids are generated by the caller, the store only rejects collisions
//! - Track timestamps are assigned by the store on insert
//! - Trigger bookkeeping happens inside the store so the decrement and reset are atomic

pub mod id;
pub mod memory;
pub mod model;

use thiserror::Error;

pub use id::ObjectId;
pub use memory::MemoryStore;
pub use model::{NewWebhook, Track, Webhook, TRACK_FIELDS};

/// Errors raised by a store backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document {0} already exists")]
    DuplicateId(ObjectId),
}

/// Typed operations on the `tracks` and `webhooks` collections.
pub trait Store: Send + Sync {
    /// Stamp the track with the next registration timestamp and store it.
    ///
    /// Stamping and inserting are one step, so tracks become visible in
    /// timestamp order and a reader paging on `ts` never skips one.
    fn insert_track(&self, track: Track) -> Result<Track, StoreError>;

    fn track(&self, id: &ObjectId) -> Result<Option<Track>, StoreError>;

    /// Ids of all tracks, oldest first.
    fn track_ids(&self) -> Result<Vec<ObjectId>, StoreError>;

    fn track_count(&self) -> Result<u64, StoreError>;

    /// Up to `limit` tracks with a timestamp strictly greater than `ts`, oldest first.
    fn tracks_after(&self, ts: i64, limit: usize) -> Result<Vec<Track>, StoreError>;

    fn latest_timestamp(&self) -> Result<Option<i64>, StoreError>;

    /// Delete every track, returning how many were removed.
    fn delete_tracks(&self) -> Result<u64, StoreError>;

    fn insert_webhook(&self, webhook: Webhook) -> Result<ObjectId, StoreError>;

    fn webhook(&self, id: &ObjectId) -> Result<Option<Webhook>, StoreError>;

    /// Returns whether a webhook was removed.
    fn delete_webhook(&self, id: &ObjectId) -> Result<bool, StoreError>;

    /// Count a new track against every webhook.
    ///
    /// Webhooks whose counter reaches zero are returned as they were before
    /// the call (so `last_invoked` still marks the previous notification),
    /// then reset in the store with `last_invoked = now`.
    fn record_new_track(&self, now: i64) -> Result<Vec<Webhook>, StoreError>;
}
