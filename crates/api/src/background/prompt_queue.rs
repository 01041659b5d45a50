//! Periodic prompt queue sweep.
//!
//! Runs [`process_prompt_queue`] on a fixed interval so phase transitions
//! happen on time without depending on user traffic. The cron endpoint
//! triggers the same sweep; both are safe to overlap.

use std::sync::Arc;
use std::time::Duration;

use challenge_db::DbPool;
use challenge_events::EventBus;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::engine::cycle::process_prompt_queue;

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(pool: DbPool, bus: Arc<EventBus>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Prompt queue job started");

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Prompt queue job stopping");
                break;
            }
            _ = interval.tick() => {
                match process_prompt_queue(&pool, &bus, Utc::now()).await {
                    Ok(report) => {
                        tracing::debug!(
                            leagues = report.leagues_processed,
                            failures = report.failures,
                            "Prompt queue: sweep complete"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Prompt queue: sweep failed");
                    }
                }
            }
        }
    }
}
