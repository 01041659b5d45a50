//! Push notification delivery with exponential-backoff retry.
//!
//! [`PushDelivery`] hands a [`PushMessage`] to the configured push gateway
//! via HTTP POST. Failed attempts are retried three times with exponential
//! backoff (1 s, 2 s, 4 s). Without a gateway URL delivery is a no-op, which
//! is the normal state for local development and tests.

use std::time::Duration;

use challenge_core::types::DbId;
use serde::Serialize;

use crate::bus::{PlatformEvent, PROMPT_ACTIVATED, PROMPT_COMPLETED, PROMPT_VOTING_OPENED};

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for push delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("Push gateway returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// PushMessage
// ---------------------------------------------------------------------------

/// A notification addressed to a set of users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub user_ids: Vec<DbId>,
    pub title: String,
    pub body: String,
    /// Deep-link data for the client (event type, league, prompt).
    pub data: serde_json::Value,
}

impl PushMessage {
    /// Build the member-facing message for a prompt lifecycle event.
    ///
    /// Returns `None` for event types that do not notify anyone.
    pub fn for_event(event: &PlatformEvent, user_ids: Vec<DbId>) -> Option<Self> {
        let text = event
            .payload
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let (title, body) = match event.event_type.as_str() {
            PROMPT_ACTIVATED => ("New challenge", format!("This week's prompt: {text}")),
            PROMPT_VOTING_OPENED => ("Voting is open", format!("Rank the entries for \"{text}\"")),
            PROMPT_COMPLETED => ("Results are in", format!("See who won \"{text}\"")),
            _ => return None,
        };

        Some(Self {
            user_ids,
            title: title.to_string(),
            body,
            data: serde_json::json!({
                "event_type": event.event_type,
                "league_id": event.league_id,
                "prompt_id": event.source_entity_id,
            }),
        })
    }
}

// ---------------------------------------------------------------------------
// PushDelivery
// ---------------------------------------------------------------------------

/// Delivers push messages to an external gateway.
pub struct PushDelivery {
    client: reqwest::Client,
    gateway_url: Option<String>,
}

impl PushDelivery {
    /// Create a delivery service. `gateway_url = None` disables sending.
    pub fn new(gateway_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self {
            client,
            gateway_url,
        }
    }

    /// Whether a gateway is configured.
    pub fn is_enabled(&self) -> bool {
        self.gateway_url.is_some()
    }

    /// Deliver a message with retry.
    ///
    /// Retries up to 3 times with exponential backoff before giving up.
    /// Returns `Ok(())` on the first successful attempt, or immediately when
    /// no gateway is configured or the message has no recipients.
    pub async fn deliver(&self, message: &PushMessage) -> Result<(), PushError> {
        let Some(url) = self.gateway_url.as_deref() else {
            tracing::debug!(title = %message.title, "Push gateway not configured, skipping");
            return Ok(());
        };
        if message.user_ids.is_empty() {
            return Ok(());
        }

        let mut last_err: Option<PushError> = None;

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(url, message).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url,
                        error = %e,
                        "Push delivery attempt failed, retrying"
                    );
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        match self.try_send(url, message).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(url, error = %e, "Push delivery failed after all retries");
                Err(last_err.unwrap_or(e))
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, url: &str, message: &PushMessage) -> Result<(), PushError> {
        let response = self.client.post(url).json(message).send().await?;
        if !response.status().is_success() {
            return Err(PushError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

impl Default for PushDelivery {
    fn default() -> Self {
        Self::new(None)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
