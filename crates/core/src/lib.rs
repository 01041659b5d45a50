//! Domain logic for Challenge League.
//!
//! This crate has zero internal dependencies so that the database layer,
//! the HTTP API and any future tooling can share the same rules:
//!
//! - [`phase`] -- prompt lifecycle state machine and phase calculator.
//! - [`scoring`] -- vote point curve and response ranking.
//! - [`queue`] -- queue-order validation for scheduled prompts.
//! - [`league`] -- league settings bounds and invite codes.

pub mod error;
pub mod league;
pub mod phase;
pub mod queue;
pub mod scoring;
pub mod types;
