//! Handlers for the `/leagues` resource and memberships.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use challenge_core::error::CoreError;
use challenge_core::league::{generate_invite_code, normalize_invite_code};
use challenge_core::types::DbId;
use challenge_db::models::league::{CreateLeague, JoinLeague, League, UpdateLeague};
use challenge_db::models::membership::LeagueMember;
use challenge_db::repositories::{LeagueRepo, MembershipRepo, PromptRepo};
use validator::Validate;

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::league_access::{ensure_owner, find_league, member_league, owned_league};
use crate::state::AppState;

/// Attempts at finding an unused invite code before giving up.
const INVITE_CODE_ATTEMPTS: usize = 5;

/// POST /api/v1/leagues
///
/// The caller becomes owner and first member.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateLeague>,
) -> AppResult<(StatusCode, Json<League>)> {
    input.validate()?;

    for _ in 0..INVITE_CODE_ATTEMPTS {
        let code = generate_invite_code();
        match LeagueRepo::create(&state.pool, auth.user_id, &code, &input).await {
            Ok(league) => {
                tracing::info!(league_id = league.id, user_id = auth.user_id, "League created");
                return Ok((StatusCode::CREATED, Json(league)));
            }
            Err(e) if is_unique_violation(&e, "uq_leagues_invite_code") => {
                tracing::debug!("Invite code collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(AppError::InternalError(
        "Could not allocate a unique invite code".into(),
    ))
}

/// GET /api/v1/leagues
pub async fn list(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Vec<League>>> {
    let leagues = LeagueRepo::list_for_member(&state.pool, auth.user_id).await?;
    Ok(Json(leagues))
}

/// GET /api/v1/leagues/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<League>> {
    let league = member_league(&state.pool, id, auth.user_id).await?;
    Ok(Json(league))
}

/// PUT /api/v1/leagues/{id}
///
/// Phase lengths and the vote allowance are frozen while a prompt is open.
/// The name can change at any time.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLeague>,
) -> AppResult<Json<League>> {
    owned_league(&state.pool, id, auth.user_id).await?;
    input.validate()?;

    let mut tx = state.pool.begin().await?;
    LeagueRepo::lock(&mut *tx, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "League",
            id,
        }))?;

    if input.changes_phase_settings() {
        if let Some(open) = PromptRepo::find_open_in(&mut *tx, id).await? {
            return Err(AppError::Core(CoreError::Validation(format!(
                "League settings cannot change while prompt {} is open",
                open.id
            ))));
        }
    }

    let league = LeagueRepo::update(&mut *tx, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "League",
            id,
        }))?;
    tx.commit().await?;

    tracing::info!(league_id = id, user_id = auth.user_id, "League updated");
    Ok(Json(league))
}

/// POST /api/v1/leagues/join
pub async fn join(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<JoinLeague>,
) -> AppResult<Json<League>> {
    let code = normalize_invite_code(&input.invite_code);
    let league = LeagueRepo::find_by_invite_code(&state.pool, &code)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Validation("Invalid invite code".into())))?;

    MembershipRepo::join(&state.pool, league.id, auth.user_id).await?;
    tracing::info!(league_id = league.id, user_id = auth.user_id, "Member joined league");
    Ok(Json(league))
}

/// POST /api/v1/leagues/{id}/leave
pub async fn leave(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let league = find_league(&state.pool, id).await?;
    if ensure_owner(&league, auth.user_id).is_ok() {
        return Err(AppError::Core(CoreError::Validation(
            "The league owner cannot leave the league".into(),
        )));
    }

    if MembershipRepo::leave(&state.pool, id, auth.user_id).await? {
        tracing::info!(league_id = id, user_id = auth.user_id, "Member left league");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "You are not a member of this league".into(),
        )))
    }
}

/// GET /api/v1/leagues/{id}/members
pub async fn members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<LeagueMember>>> {
    member_league(&state.pool, id, auth.user_id).await?;
    let members = MembershipRepo::list_members(&state.pool, id).await?;
    Ok(Json(members))
}
