//! Authentication and authorization extractors and guards.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`cron::CronCaller`] -- Requires the shared cron secret.
//! - [`league_access`] -- League membership and ownership checks.

pub mod auth;
pub mod cron;
pub mod league_access;
