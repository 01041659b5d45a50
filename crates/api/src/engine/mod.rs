//! Prompt-cycle engine.
//!
//! - [`cycle`] -- phase transitions per league (scheduled sweep and manual step).
//! - [`queue`] -- queue mutations for scheduled prompts.
//! - [`voting`] -- transactional vote casting.
//!
//! Every league-level mutation runs in one transaction that first takes the
//! league row lock, so sweeps, owner actions and queue edits of a league are
//! applied one at a time. Status writes are additionally guarded by the
//! expected current status.

pub mod cycle;
pub mod queue;
pub mod voting;
