//! External delivery channels for platform notifications.
//!
//! The push gateway owns device subscriptions and the actual web-push
//! protocol; this crate only hands it recipients and a message.

pub mod push;
