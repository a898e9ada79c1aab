//! Tournament lifecycle API handlers.
//!
//! A typical run:
//!
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/tournaments -d '{"name": "Friday Cup"}' \
//!   -H "Content-Type: application/json"
//! curl -X POST http://localhost:8000/api/v1/tournaments/1/participants -d '{"player_id": 1}' \
//!   -H "Content-Type: application/json"
//! curl -X POST http://localhost:8000/api/v1/tournaments/1/generate
//! curl -X POST http://localhost:8000/api/v1/tournaments/1/next-round
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use knockout::matches::Match;
use knockout::players::{Player, PlayerId};
use knockout::tournament::{Tournament, TournamentId};
use serde::Deserialize;

use super::AppState;
use super::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct CreateTournamentRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub player_id: PlayerId,
}

/// List tournaments, newest first
pub async fn list_tournaments(State(state): State<AppState>) -> ApiResult<Json<Vec<Tournament>>> {
    Ok(Json(state.tournaments.list_tournaments().await?))
}

pub async fn create_tournament(
    State(state): State<AppState>,
    Json(request): Json<CreateTournamentRequest>,
) -> ApiResult<(StatusCode, Json<Tournament>)> {
    let tournament = state.tournaments.create_tournament(&request.name).await?;
    Ok((StatusCode::CREATED, Json(tournament)))
}

pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Tournament>> {
    Ok(Json(state.tournaments.get_tournament(tournament_id).await?))
}

/// Enrolled players in enrollment order
pub async fn list_participants(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Vec<Player>>> {
    Ok(Json(state.tournaments.participants(tournament_id).await?))
}

/// Enroll a player in a DRAFT tournament
pub async fn enroll_participant(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<EnrollRequest>,
) -> ApiResult<(StatusCode, Json<Player>)> {
    let player = state
        .tournaments
        .enroll_player(tournament_id, request.player_id)
        .await?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// Generate the bracket and return round one
pub async fn generate_bracket(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<(StatusCode, Json<Vec<Match>>)> {
    let round_one = state.tournaments.generate_bracket(tournament_id).await?;
    Ok((StatusCode::CREATED, Json(round_one)))
}

/// Advance one round
///
/// Returns the matches of the new round, or an empty list once the final is
/// decided and the tournament is FINISHED.
pub async fn next_round(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Vec<Match>>> {
    let advancement = state
        .tournaments
        .advance_to_next_round(tournament_id)
        .await?;
    Ok(Json(advancement.into_matches()))
}

/// Every match ordered by (round, position)
pub async fn get_bracket(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Vec<Match>>> {
    Ok(Json(state.tournaments.bracket(tournament_id).await?))
}
