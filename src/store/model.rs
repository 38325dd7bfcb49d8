//! Stored documents.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::store::ObjectId;

/// Fields of a track that can be requested individually.
pub const TRACK_FIELDS: &[&str] = &[
    "pilot",
    "glider",
    "glider_id",
    "track_length",
    "H_date",
    "track_src_url",
];

/// Current unix time in milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

static LAST_TIMESTAMP: AtomicI64 = AtomicI64::new(0);

/// Millisecond timestamp that is strictly greater than every previous one
/// handed out by this process. The ticker pages on `ts > t`, so two tracks
/// must never share a timestamp.
pub fn next_timestamp() -> i64 {
    let now = now_millis();
    let mut last = LAST_TIMESTAMP.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_TIMESTAMP.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// A registered flight track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    #[serde(skip)]
    pub id: ObjectId,
    /// Registration time, milliseconds since the epoch. Assigned by the store.
    #[serde(skip)]
    pub ts: i64,
    #[serde(rename = "H_date")]
    pub h_date: String,
    pub pilot: String,
    pub glider: String,
    pub glider_id: String,
    pub track_length: String,
    pub track_src_url: String,
}

impl Track {
    /// Value of one of the [`TRACK_FIELDS`].
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "pilot" => &self.pilot,
            "glider" => &self.glider,
            "glider_id" => &self.glider_id,
            "track_length" => &self.track_length,
            "H_date" => &self.h_date,
            "track_src_url" => &self.track_src_url,
            _ => return None,
        };
        Some(value)
    }
}

/// Body of a webhook registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWebhook {
    #[serde(rename = "webhookURL", default)]
    pub webhook_url: String,
    #[serde(rename = "minTriggerValue", default)]
    pub min_trigger_value: i64,
}

/// A webhook notified every `min_trigger_value` new tracks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Webhook {
    #[serde(skip)]
    pub id: ObjectId,
    #[serde(rename = "webhookURL")]
    pub webhook_url: String,
    #[serde(rename = "minTriggerValue")]
    pub min_trigger_value: i64,
    /// New tracks left before the next invocation.
    #[serde(skip)]
    pub trigger_count: i64,
    /// Time of the last invocation; only tracks after it are reported.
    #[serde(skip)]
    pub last_invoked: i64,
}

impl Webhook {
    /// Create a webhook from a registration. A missing or non-positive trigger
    /// value means "notify on every track".
    pub fn new(request: NewWebhook) -> Self {
        let min_trigger_value = if request.min_trigger_value > 0 {
            request.min_trigger_value
        } else {
            1
        };

        Self {
            id: ObjectId::new(),
            webhook_url: request.webhook_url,
            min_trigger_value,
            trigger_count: min_trigger_value,
            last_invoked: next_timestamp(),
        }
    }
}
