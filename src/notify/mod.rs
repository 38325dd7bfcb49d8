//! Outgoing webhook notifications.
//!
//! # Data Flow
//! ```text
//! track registered
//!     → WebhookDispatcher::notify_new_track
//!     → Store::record_new_track (decrement counters, collect due webhooks)
//!     → ticker page of tracks since each webhook's last invocation
//!     → tokio::spawn(deliver) with retries and exponential backoff
//! ```
//!
//! # Design Decisions
//! - Delivery never blocks the request that registered the track
//! - Counters are reset before delivery; a failed delivery is logged, not retried later
//! - Only 5xx responses and transport errors are retried

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::api::ticker::{self, TickerPage};
use crate::config::WebhookConfig;
use crate::observability::metrics;
use crate::resilience::Backoff;
use crate::store::model::next_timestamp;
use crate::store::{Store, StoreError, Webhook};

/// Failure of a single delivery attempt.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("webhook responded with status {0}")]
    Status(reqwest::StatusCode),
}

impl DeliveryError {
    fn is_retryable(&self) -> bool {
        match self {
            DeliveryError::Request(_) => true,
            DeliveryError::Status(status) => status.is_server_error(),
        }
    }
}

/// Decides which webhooks are due and delivers to them in the background.
pub struct WebhookDispatcher {
    client: reqwest::Client,
    store: Arc<dyn Store>,
    enabled: bool,
    max_attempts: u32,
    backoff: Backoff,
}

impl WebhookDispatcher {
    pub fn new(store: Arc<dyn Store>, config: &WebhookConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            store,
            enabled: config.enabled,
            max_attempts: config.max_attempts.max(1),
            backoff: Backoff::from(config),
        })
    }

    /// Count one new track against every webhook and spawn a delivery for each
    /// webhook that became due. Returns the number of deliveries started.
    pub fn notify_new_track(&self) -> Result<usize, StoreError> {
        if !self.enabled {
            return Ok(0);
        }

        let due = self.store.record_new_track(next_timestamp())?;
        let mut started = 0;
        for webhook in due {
            let Some(payload) = self.payload(&webhook) else {
                continue;
            };

            let client = self.client.clone();
            let (max_attempts, backoff) = (self.max_attempts, self.backoff);
            tokio::spawn(async move {
                deliver(&client, &webhook, &payload, max_attempts, backoff).await;
            });
            started += 1;
        }
        Ok(started)
    }

    fn payload(&self, webhook: &Webhook) -> Option<TickerPage> {
        match ticker::page(self.store.as_ref(), webhook.last_invoked, usize::MAX, Instant::now()) {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::debug!(webhook = %webhook.id, error = %e, "Nothing to report");
                None
            }
        }
    }
}

async fn post(client: &reqwest::Client, url: &str, payload: &TickerPage) -> Result<(), DeliveryError> {
    let response = client.post(url).json(payload).send().await?;
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(DeliveryError::Status(status))
    }
}

/// POST `payload` to the webhook, retrying transient failures.
pub async fn deliver(
    client: &reqwest::Client,
    webhook: &Webhook,
    payload: &TickerPage,
    max_attempts: u32,
    backoff: Backoff,
) -> bool {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match post(client, &webhook.webhook_url, payload).await {
            Ok(()) => {
                tracing::info!(
                    webhook = %webhook.id,
                    url = %webhook.webhook_url,
                    tracks = payload.tracks.len(),
                    attempt,
                    "Webhook invoked"
                );
                metrics::record_webhook_delivery("success");
                return true;
            }
            Err(e) if attempt < max_attempts && e.is_retryable() => {
                let delay = backoff.delay(attempt);
                tracing::info!(
                    webhook = %webhook.id,
                    attempt,
                    delay = ?delay,
                    error = %e,
                    "Retrying webhook delivery"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                tracing::warn!(
                    webhook = %webhook.id,
                    url = %webhook.webhook_url,
                    attempt,
                    error = %e,
                    "Webhook delivery failed"
                );
                metrics::record_webhook_delivery("failure");
                return false;
            }
        }
    }
}
