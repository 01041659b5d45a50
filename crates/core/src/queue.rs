//! Queue-order rules for scheduled prompts.
//!
//! Scheduled prompts of a league carry 1-based, contiguous `queue_order`
//! positions. A reorder request must name every scheduled prompt of the
//! league exactly once.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::types::DbId;

/// Validate a reorder request against the league's current scheduled prompts.
pub fn validate_reorder(requested: &[DbId], scheduled: &[DbId]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(requested.len());
    for id in requested {
        if !seen.insert(*id) {
            return Err(CoreError::Validation(format!(
                "Prompt {id} appears more than once in the queue"
            )));
        }
    }

    let scheduled_set: HashSet<DbId> = scheduled.iter().copied().collect();

    if let Some(id) = requested.iter().find(|id| !scheduled_set.contains(id)) {
        return Err(CoreError::Validation(format!(
            "Prompt {id} is not a scheduled prompt of this league"
        )));
    }

    let mut missing: Vec<DbId> = scheduled_set.difference(&seen).copied().collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        let list: Vec<String> = missing.iter().map(ToString::to_string).collect();
        return Err(CoreError::Validation(format!(
            "Queue is missing scheduled prompts: {}",
            list.join(", ")
        )));
    }

    Ok(())
}

/// Pair each prompt with its new 1-based queue position.
pub fn queue_positions(ordered: &[DbId]) -> Vec<(DbId, i32)> {
    ordered
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i as i32 + 1))
        .collect()
}
