//! Event-driven member notifications.

pub mod router;
