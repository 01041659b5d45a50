//! Phase transitions for a league's prompts.
//!
//! One step of a league looks at its open prompt (at most one is `Active`
//! or `Voting`) and:
//!
//! 1. `Active` past its stored `week_end`: publish every response and open
//!    voting.
//! 2. `Voting` past its stored `vote_end`: score the responses and mark the
//!    prompt completed.
//! 3. No open prompt (or one that just completed) in a started league:
//!    activate the lowest-positioned scheduled prompt.
//!
//! Scoring and the status flip commit together, and events are published
//! only after the commit.

use std::sync::Arc;

use challenge_core::error::CoreError;
use challenge_core::phase::{self, state_machine, PhaseSettings};
use challenge_core::scoring::{rank_responses, RankedResponse, ResponseTally};
use challenge_core::types::{DbId, Timestamp};
use challenge_db::models::prompt::Prompt;
use challenge_db::models::status::PromptStatus;
use challenge_db::repositories::{LeagueRepo, PromptRepo, ResponseRepo, VoteRepo};
use challenge_db::DbPool;
use challenge_events::bus::{PROMPT_ACTIVATED, PROMPT_COMPLETED, PROMPT_VOTING_OPENED};
use challenge_events::{EventBus, PlatformEvent};
use serde::Serialize;
use sqlx::PgConnection;

use crate::error::{AppError, AppResult};

/// How a step decides whether the open prompt's phase is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Only transition phases whose end time has passed.
    Due,
    /// Owner override: close the open phase now.
    Forced,
}

/// A transition applied to one prompt.
#[derive(Debug, Clone)]
pub enum Transition {
    Activated(Prompt),
    VotingOpened { prompt: Prompt, published: u64 },
    Completed {
        prompt: Prompt,
        ranked: Vec<RankedResponse>,
    },
}

impl Transition {
    /// The prompt after the transition.
    pub fn prompt(&self) -> &Prompt {
        match self {
            Transition::Activated(prompt) => prompt,
            Transition::VotingOpened { prompt, .. } => prompt,
            Transition::Completed { prompt, .. } => prompt,
        }
    }

    /// Event name published for this transition.
    pub fn event_type(&self) -> &'static str {
        match self {
            Transition::Activated(_) => PROMPT_ACTIVATED,
            Transition::VotingOpened { .. } => PROMPT_VOTING_OPENED,
            Transition::Completed { .. } => PROMPT_COMPLETED,
        }
    }

    fn to_event(&self, actor: Option<DbId>) -> PlatformEvent {
        let prompt = self.prompt();
        let mut event = PlatformEvent::new(self.event_type())
            .with_source("prompt", prompt.id)
            .with_league(prompt.league_id)
            .with_payload(serde_json::json!({
                "text": prompt.text,
                "week_end": prompt.week_end,
                "vote_end": prompt.vote_end,
            }));
        if let Some(user_id) = actor {
            event = event.with_actor(user_id);
        }
        event
    }
}

/// Summary of one queue sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueReport {
    pub leagues_processed: usize,
    pub activated: usize,
    pub voting_opened: usize,
    pub completed: usize,
    pub failures: usize,
}

impl QueueReport {
    fn record(&mut self, transitions: &[Transition]) {
        for t in transitions {
            match t {
                Transition::Activated(_) => self.activated += 1,
                Transition::VotingOpened { .. } => self.voting_opened += 1,
                Transition::Completed { .. } => self.completed += 1,
            }
        }
    }

    /// Whether the sweep changed anything.
    pub fn has_changes(&self) -> bool {
        self.activated + self.voting_opened + self.completed > 0
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Apply every due transition in every league.
///
/// Leagues are processed independently: a failure is logged and counted and
/// the sweep moves on. Nothing is retried within the sweep; state is left
/// unchanged, so the next sweep picks the league up again.
pub async fn process_prompt_queue(
    pool: &DbPool,
    bus: &EventBus,
    now: Timestamp,
) -> Result<QueueReport, sqlx::Error> {
    let league_ids = LeagueRepo::list_ids(pool).await?;
    let mut report = QueueReport::default();

    for league_id in league_ids {
        report.leagues_processed += 1;
        match step_league(pool, league_id, now, StepMode::Due).await {
            Ok(transitions) => {
                report.record(&transitions);
                publish(bus, &transitions, None);
            }
            Err(e) => {
                report.failures += 1;
                tracing::error!(league_id, error = %e, "Prompt queue: league step failed");
            }
        }
    }

    if report.has_changes() || report.failures > 0 {
        tracing::info!(
            leagues = report.leagues_processed,
            activated = report.activated,
            voting_opened = report.voting_opened,
            completed = report.completed,
            failures = report.failures,
            "Prompt queue sweep finished"
        );
    }
    Ok(report)
}

/// Owner-triggered single step that closes the open phase immediately.
///
/// Follows the same transition rules as the sweep. Fails with 400 when the
/// league has neither an open prompt nor a scheduled one.
pub async fn advance_league(
    pool: &DbPool,
    bus: &Arc<EventBus>,
    league_id: DbId,
    actor: DbId,
    now: Timestamp,
) -> AppResult<Vec<Transition>> {
    let transitions = step_league(pool, league_id, now, StepMode::Forced).await?;
    if transitions.is_empty() {
        return Err(AppError::BadRequest(
            "Nothing to transition: no open prompt and the queue is empty".into(),
        ));
    }
    tracing::info!(
        league_id,
        user_id = actor,
        steps = transitions.len(),
        "Manual prompt transition"
    );
    publish(bus, &transitions, Some(actor));
    Ok(transitions)
}

/// Mark a league started and run one regular step so its first prompt
/// activates right away.
pub async fn start_league(
    pool: &DbPool,
    bus: &Arc<EventBus>,
    league_id: DbId,
    actor: DbId,
    now: Timestamp,
) -> AppResult<Vec<Transition>> {
    if !LeagueRepo::mark_started(pool, league_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "League has already been started".into(),
        )));
    }
    tracing::info!(league_id, user_id = actor, "League started");

    let transitions = step_league(pool, league_id, now, StepMode::Due).await?;
    publish(bus, &transitions, Some(actor));
    Ok(transitions)
}

/// Run one step for a league inside its own transaction.
pub async fn step_league(
    pool: &DbPool,
    league_id: DbId,
    now: Timestamp,
    mode: StepMode,
) -> AppResult<Vec<Transition>> {
    let mut tx = pool.begin().await?;

    let league = LeagueRepo::lock(&mut *tx, league_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "League",
            id: league_id,
        }))?;
    let settings = league.phase_settings();
    let mut transitions = Vec::new();

    let open = PromptRepo::find_open_in(&mut *tx, league.id).await?;
    let may_activate = match open {
        None => league.is_started || mode == StepMode::Forced,
        Some(prompt) => {
            let due = mode == StepMode::Forced
                || phase::is_deadline_passed(prompt.phase_deadline(), now);
            match PromptStatus::from_id(prompt.status_id) {
                Some(PromptStatus::Active) if due => {
                    transitions.push(open_voting(&mut *tx, &prompt, &settings, now).await?);
                    false
                }
                Some(PromptStatus::Voting) if due => {
                    transitions.push(complete(&mut *tx, &prompt, &settings).await?);
                    league.is_started
                }
                _ => false,
            }
        }
    };

    if may_activate {
        if let Some(prompt) = activate_next(&mut *tx, league.id, &settings, now).await? {
            transitions.push(Transition::Activated(prompt));
        }
    }

    tx.commit().await?;

    for t in &transitions {
        tracing::info!(
            league_id,
            prompt_id = t.prompt().id,
            event = t.event_type(),
            "Prompt transitioned"
        );
    }
    Ok(transitions)
}

/// Publish one event per transition.
pub fn publish(bus: &EventBus, transitions: &[Transition], actor: Option<DbId>) {
    for t in transitions {
        bus.publish(t.to_event(actor));
    }
}

// ---------------------------------------------------------------------------
// Steps (run inside the league transaction)
// ---------------------------------------------------------------------------

async fn activate_next(
    conn: &mut PgConnection,
    league_id: DbId,
    settings: &PhaseSettings,
    now: Timestamp,
) -> AppResult<Option<Prompt>> {
    let week_end = window_end(PromptStatus::Active, settings, now)?;
    Ok(PromptRepo::activate_next(conn, league_id, now, week_end).await?)
}

async fn open_voting(
    conn: &mut PgConnection,
    prompt: &Prompt,
    settings: &PhaseSettings,
    now: Timestamp,
) -> AppResult<Transition> {
    ensure_transition(prompt, PromptStatus::Voting)?;
    let vote_end = window_end(PromptStatus::Voting, settings, now)?;

    let published = ResponseRepo::publish_all(conn, prompt.id, now).await?;
    let updated = PromptRepo::open_voting(conn, prompt.id, now, vote_end)
        .await?
        .ok_or_else(|| lost_race(prompt))?;

    Ok(Transition::VotingOpened {
        prompt: updated,
        published,
    })
}

async fn complete(
    conn: &mut PgConnection,
    prompt: &Prompt,
    settings: &PhaseSettings,
) -> AppResult<Transition> {
    ensure_transition(prompt, PromptStatus::Completed)?;

    let tallies: Vec<ResponseTally> = VoteRepo::tallies(conn, prompt.id)
        .await?
        .into_iter()
        .map(|t| ResponseTally {
            response_id: t.response_id,
            total_points: t.total_points,
            first_place_votes: t.first_place_votes,
        })
        .collect();
    let ranked = rank_responses(&tallies);

    ResponseRepo::apply_scores(conn, prompt.id, &ranked).await?;
    let updated = PromptRepo::complete(conn, prompt.id)
        .await?
        .ok_or_else(|| lost_race(prompt))?;

    tracing::debug!(
        prompt_id = prompt.id,
        responses = ranked.len(),
        votes_per_player = settings.votes_per_player,
        "Prompt scored"
    );
    Ok(Transition::Completed {
        prompt: updated,
        ranked,
    })
}

fn ensure_transition(prompt: &Prompt, to: PromptStatus) -> AppResult<()> {
    state_machine::validate_transition(prompt.status_id, to.id())
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))
}

/// End of a phase that starts at `now`.
fn window_end(
    status: PromptStatus,
    settings: &PhaseSettings,
    now: Timestamp,
) -> AppResult<Timestamp> {
    phase::phase_end(status.id(), Some(now), settings).ok_or_else(|| {
        AppError::InternalError(format!("No phase length for status {}", status.name()))
    })
}

/// The guarded update matched no row: someone else moved the prompt first.
fn lost_race(prompt: &Prompt) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "Prompt {} changed status concurrently",
        prompt.id
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_each_transition_kind() {
        let mut report = QueueReport::default();
        assert!(!report.has_changes());

        report.voting_opened += 1;
        assert!(report.has_changes());
    }

    #[test]
    fn voting_window_starts_at_now() {
        let settings = PhaseSettings {
            submission_days: 7,
            voting_days: 2,
            votes_per_player: 3,
        };
        let now = chrono::Utc::now();
        assert_eq!(
            window_end(PromptStatus::Voting, &settings, now).unwrap(),
            now + chrono::Duration::days(2)
        );
        assert_eq!(
            window_end(PromptStatus::Active, &settings, now).unwrap(),
            now + chrono::Duration::days(7)
        );
        assert!(window_end(PromptStatus::Completed, &settings, now).is_err());
    }
}
