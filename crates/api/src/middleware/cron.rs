//! Shared-secret authentication for the scheduler endpoint.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use challenge_core::error::CoreError;

use super::auth::bearer_token;
use crate::auth::jwt::sha256_hex;
use crate::error::AppError;
use crate::state::AppState;

/// An external scheduler presenting `Authorization: Bearer <CRON_SECRET>`.
///
/// Rejects every request with 401 when no secret is configured.
#[derive(Debug, Clone, Copy)]
pub struct CronCaller;

impl FromRequestParts<AppState> for CronCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.cron_secret.as_deref() else {
            tracing::warn!("Cron call rejected: CRON_SECRET is not configured");
            return Err(AppError::Core(CoreError::Unauthorized(
                "Cron endpoint is disabled".into(),
            )));
        };

        let presented = bearer_token(parts)?;

        // Compare digests so the comparison time does not depend on the secret.
        if sha256_hex(presented) != sha256_hex(expected) {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid cron secret".into(),
            )));
        }

        Ok(CronCaller)
    }
}
