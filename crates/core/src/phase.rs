//! Prompt lifecycle state machine and phase calculator.
//!
//! A prompt moves strictly forward through
//! `Scheduled -> Active -> Voting -> Completed`. Status IDs match the
//! `prompt_statuses` seed data (1-based SMALLSERIAL) and are duplicated from
//! the `db` crate's `PromptStatus` enum because `core` has zero internal deps.

use chrono::Duration;
use serde::Serialize;

use crate::types::Timestamp;

/// Waiting in the league queue.
pub const STATUS_SCHEDULED: i16 = 1;
/// Accepting responses.
pub const STATUS_ACTIVE: i16 = 2;
/// Responses published, members voting.
pub const STATUS_VOTING: i16 = 3;
/// Scored and closed.
pub const STATUS_COMPLETED: i16 = 4;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

pub mod state_machine {
    use super::{STATUS_ACTIVE, STATUS_COMPLETED, STATUS_SCHEDULED, STATUS_VOTING};

    /// Returns the set of valid target status IDs reachable from `from_status`.
    ///
    /// Every state has at most one successor; `Completed` is terminal.
    pub fn valid_transitions(from_status: i16) -> &'static [i16] {
        match from_status {
            STATUS_SCHEDULED => &[STATUS_ACTIVE],
            STATUS_ACTIVE => &[STATUS_VOTING],
            STATUS_VOTING => &[STATUS_COMPLETED],
            _ => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: i16, to: i16) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a state transition, returning an error message for invalid ones.
    pub fn validate_transition(from: i16, to: i16) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(format!(
                "Invalid transition: {} ({from}) -> {} ({to})",
                status_name(from),
                status_name(to)
            ))
        }
    }

    /// Human-readable name for a status ID.
    pub fn status_name(id: i16) -> &'static str {
        match id {
            STATUS_SCHEDULED => "Scheduled",
            STATUS_ACTIVE => "Active",
            STATUS_VOTING => "Voting",
            STATUS_COMPLETED => "Completed",
            _ => "Unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Phase calculator
// ---------------------------------------------------------------------------

/// League-configured phase durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseSettings {
    pub submission_days: i32,
    pub voting_days: i32,
    pub votes_per_player: i32,
}

impl PhaseSettings {
    /// Length of the phase a prompt in `status_id` is currently in.
    ///
    /// `None` for statuses without a timed phase (scheduled, completed).
    pub fn phase_duration(&self, status_id: i16) -> Option<Duration> {
        match status_id {
            STATUS_ACTIVE => Some(Duration::days(i64::from(self.submission_days))),
            STATUS_VOTING => Some(Duration::days(i64::from(self.voting_days))),
            _ => None,
        }
    }
}

/// End of a phase of `status_id` that starts at `phase_started_at`.
///
/// Used when a phase begins, to compute the deadline stored on the prompt
/// (`week_end` or `vote_end`). Returns `None` when the status has no timed
/// phase or there is no start time.
pub fn phase_end(
    status_id: i16,
    phase_started_at: Option<Timestamp>,
    settings: &PhaseSettings,
) -> Option<Timestamp> {
    let started = phase_started_at?;
    let duration = settings.phase_duration(status_id)?;
    started.checked_add_signed(duration)
}

/// The stored deadline of the phase a prompt in `status_id` is in:
/// `week_end` while active, `vote_end` while voting.
pub fn current_deadline(
    status_id: i16,
    week_end: Option<Timestamp>,
    vote_end: Option<Timestamp>,
) -> Option<Timestamp> {
    match status_id {
        STATUS_ACTIVE => week_end,
        STATUS_VOTING => vote_end,
        _ => None,
    }
}

/// Whether `deadline` is at or before `now`. A missing deadline never passes.
pub fn is_deadline_passed(deadline: Option<Timestamp>, now: Timestamp) -> bool {
    deadline.is_some_and(|end| now >= end)
}

#[cfg(test)]
mod tests {
    use super::state_machine::*;
    use super::*;
    use chrono::{TimeZone, Utc};

    fn settings() -> PhaseSettings {
        PhaseSettings {
            submission_days: 7,
            voting_days: 2,
            votes_per_player: 3,
        }
    }

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    // -----------------------------------------------------------------------
    // State machine
    // -----------------------------------------------------------------------

    #[test]
    fn forward_transitions_are_valid() {
        assert!(can_transition(STATUS_SCHEDULED, STATUS_ACTIVE));
        assert!(can_transition(STATUS_ACTIVE, STATUS_VOTING));
        assert!(can_transition(STATUS_VOTING, STATUS_COMPLETED));
    }

    #[test]
    fn no_backward_or_skipping_transitions() {
        for from in 1..=4 {
            for to in 1..=from {
                assert!(!can_transition(from, to), "{from} -> {to} must be invalid");
            }
        }
        assert!(!can_transition(STATUS_SCHEDULED, STATUS_VOTING));
        assert!(!can_transition(STATUS_ACTIVE, STATUS_COMPLETED));
    }

    #[test]
    fn completed_is_terminal() {
        assert!(valid_transitions(STATUS_COMPLETED).is_empty());
        assert!(valid_transitions(99).is_empty());
    }

    #[test]
    fn validate_transition_err_names_both_states() {
        let err = validate_transition(STATUS_COMPLETED, STATUS_ACTIVE).unwrap_err();
        assert!(err.contains("Completed"));
        assert!(err.contains("Active"));
    }

    // -----------------------------------------------------------------------
    // Phase calculator
    // -----------------------------------------------------------------------

    #[test]
    fn active_phase_ends_after_submission_days() {
        let end = phase_end(STATUS_ACTIVE, Some(t0()), &settings()).unwrap();
        assert_eq!(end, t0() + Duration::days(7));
    }

    #[test]
    fn voting_phase_ends_after_voting_days() {
        let end = phase_end(STATUS_VOTING, Some(t0()), &settings()).unwrap();
        assert_eq!(end, t0() + Duration::days(2));
    }

    #[test]
    fn untimed_statuses_have_no_end() {
        assert!(phase_end(STATUS_SCHEDULED, Some(t0()), &settings()).is_none());
        assert!(phase_end(STATUS_COMPLETED, Some(t0()), &settings()).is_none());
    }

    #[test]
    fn missing_start_has_no_end() {
        assert!(phase_end(STATUS_ACTIVE, None, &settings()).is_none());
    }

    #[test]
    fn deadline_follows_status() {
        let week_end = Some(t0() + Duration::days(7));
        let vote_end = Some(t0() + Duration::days(9));
        assert_eq!(current_deadline(STATUS_ACTIVE, week_end, vote_end), week_end);
        assert_eq!(current_deadline(STATUS_VOTING, week_end, vote_end), vote_end);
        assert_eq!(current_deadline(STATUS_SCHEDULED, week_end, vote_end), None);
        assert_eq!(current_deadline(STATUS_COMPLETED, week_end, vote_end), None);
    }

    #[test]
    fn deadline_is_inclusive_of_the_end_instant() {
        let end = t0() + Duration::days(7);
        assert!(!is_deadline_passed(Some(end), end - Duration::milliseconds(1)));
        assert!(is_deadline_passed(Some(end), end));
    }

    #[test]
    fn missing_deadline_never_passes() {
        assert!(!is_deadline_passed(None, t0() + Duration::days(365)));
    }
}
