//! Player API handlers.
//!
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/players \
//!   -H "Content-Type: application/json" \
//!   -d '{"nick": "ryu", "logo_url": null}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use knockout::players::{NewPlayer, Player, PlayerId, PlayerUpdate};

use super::AppState;
use super::error::ApiResult;

/// List all players ordered by ID
pub async fn list_players(State(state): State<AppState>) -> ApiResult<Json<Vec<Player>>> {
    Ok(Json(state.players.list_players().await?))
}

/// Register a player
///
/// Returns `201 Created`; `409` if the nick is taken, `422` if it is blank.
pub async fn create_player(
    State(state): State<AppState>,
    Json(request): Json<NewPlayer>,
) -> ApiResult<(StatusCode, Json<Player>)> {
    let player = state.players.create_player(request).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> ApiResult<Json<Player>> {
    Ok(Json(state.players.get_player(player_id).await?))
}

/// Partial update; omitted fields are kept and `"logo_url": null` clears the logo
pub async fn update_player(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
    Json(changes): Json<PlayerUpdate>,
) -> ApiResult<Json<Player>> {
    Ok(Json(state.players.update_player(player_id, changes).await?))
}

/// Flip the active flag
pub async fn toggle_player(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> ApiResult<Json<Player>> {
    Ok(Json(state.players.toggle_active(player_id).await?))
}
