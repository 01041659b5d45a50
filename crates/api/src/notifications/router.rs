//! Event-to-notification routing.
//!
//! [`NotificationRouter`] subscribes to the event bus and turns each prompt
//! lifecycle event into one push message addressed to the league's active
//! members.

use std::sync::Arc;

use challenge_core::types::DbId;
use challenge_db::repositories::MembershipRepo;
use challenge_db::DbPool;
use challenge_events::{PlatformEvent, PushDelivery, PushMessage};
use tokio::sync::broadcast;

/// Routes platform events to push notifications.
pub struct NotificationRouter {
    pool: DbPool,
    delivery: Arc<PushDelivery>,
}

impl NotificationRouter {
    /// Create a new router with the given database pool and delivery client.
    pub fn new(pool: DbPool, delivery: Arc<PushDelivery>) -> Self {
        Self { pool, delivery }
    }

    /// Run the main routing loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](challenge_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Build and hand off the push message for one event.
    ///
    /// Delivery runs on its own task so retries never stall the loop.
    async fn route_event(&self, event: &PlatformEvent) -> Result<(), sqlx::Error> {
        let targets = self.determine_targets(event).await?;
        let Some(message) = PushMessage::for_event(event, targets) else {
            tracing::debug!(event_type = %event.event_type, "No notification for event");
            return Ok(());
        };
        if message.user_ids.is_empty() {
            return Ok(());
        }

        let delivery = Arc::clone(&self.delivery);
        let league_id = event.league_id;
        tokio::spawn(async move {
            if let Err(e) = delivery.deliver(&message).await {
                tracing::warn!(?league_id, error = %e, "Push notification dropped");
            }
        });
        Ok(())
    }

    /// Active members of the event's league.
    async fn determine_targets(&self, event: &PlatformEvent) -> Result<Vec<DbId>, sqlx::Error> {
        match event.league_id {
            Some(league_id) if event.event_type.starts_with("prompt.") => {
                MembershipRepo::active_member_ids(&self.pool, league_id).await
            }
            _ => Ok(vec![]),
        }
    }
}
