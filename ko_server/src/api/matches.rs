//! Match API handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use knockout::matches::{Match, MatchId};
use knockout::players::PlayerId;
use serde::Deserialize;

use super::AppState;
use super::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct SetWinnerRequest {
    pub winner_id: PlayerId,
}

pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Json<Match>> {
    Ok(Json(state.matches.get_match(match_id).await?))
}

/// Record the winner of a pending match
///
/// `409` if the match is already resolved, `422` if the winner is not one
/// of its players.
pub async fn set_winner(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
    Json(request): Json<SetWinnerRequest>,
) -> ApiResult<Json<Match>> {
    Ok(Json(
        state.matches.set_winner(match_id, request.winner_id).await?,
    ))
}
