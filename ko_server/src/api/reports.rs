//! Report API handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use knockout::reports::{LeaderboardEntry, MatchHistoryEntry};
use knockout::tournament::TournamentId;

use super::AppState;
use super::error::ApiResult;

pub async fn leaderboard(State(state): State<AppState>) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    Ok(Json(state.reports.leaderboard().await?))
}

pub async fn tournament_matches(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Vec<MatchHistoryEntry>>> {
    Ok(Json(state.reports.tournament_history(tournament_id).await?))
}
