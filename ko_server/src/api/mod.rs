//! HTTP API for the tournament server.
//!
//! # Modules
//!
//! - [`players`]: Player registry (create, update, toggle active)
//! - [`tournaments`]: Lifecycle (enroll, generate bracket, advance rounds)
//! - [`matches`]: Winner recording
//! - [`reports`]: Leaderboard and match history
//! - [`error`]: Domain error to HTTP status mapping
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use ko_server::api::{AppState, create_router};
//! use knockout::db::{MemoryStore, SharedStore};
//! use knockout::tournament::RandomShuffler;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store: SharedStore = Arc::new(MemoryStore::new());
//! let app = create_router(AppState::new(store, Arc::new(RandomShuffler)));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development.

pub mod error;
pub mod matches;
pub mod players;
pub mod reports;
pub mod request_id;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
};
use knockout::db::SharedStore;
use knockout::tournament::Shuffler;
use knockout::{MatchManager, PlayerManager, ReportsManager, TournamentManager};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every manager shares the same store.
#[derive(Clone)]
pub struct AppState {
    pub players: Arc<PlayerManager>,
    pub tournaments: Arc<TournamentManager>,
    pub matches: Arc<MatchManager>,
    pub reports: Arc<ReportsManager>,
    pub store: SharedStore,
}

impl AppState {
    /// Build every manager on top of `store`
    pub fn new(store: SharedStore, shuffler: Arc<dyn Shuffler>) -> Self {
        Self {
            players: Arc::new(PlayerManager::new(store.clone())),
            tournaments: Arc::new(TournamentManager::with_shuffler(store.clone(), shuffler)),
            matches: Arc::new(MatchManager::new(store.clone())),
            reports: Arc::new(ReportsManager::new(store.clone())),
            store,
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// ```text
/// GET   /api/v1/health
/// GET   /api/v1/players                          POST /api/v1/players
/// GET   /api/v1/players/{id}                     PUT  /api/v1/players/{id}
/// PATCH /api/v1/players/{id}/toggle
/// GET   /api/v1/tournaments                      POST /api/v1/tournaments
/// GET   /api/v1/tournaments/{id}
/// GET   /api/v1/tournaments/{id}/participants    POST /api/v1/tournaments/{id}/participants
/// POST  /api/v1/tournaments/{id}/generate
/// POST  /api/v1/tournaments/{id}/next-round
/// GET   /api/v1/tournaments/{id}/bracket
/// GET   /api/v1/matches/{id}
/// POST  /api/v1/matches/{id}/winner
/// GET   /api/v1/reports/leaderboard
/// GET   /api/v1/reports/tournaments/{id}/matches
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    let player_routes = Router::new()
        .route("/players", get(players::list_players).post(players::create_player))
        .route(
            "/players/{player_id}",
            get(players::get_player).put(players::update_player),
        )
        .route("/players/{player_id}/toggle", patch(players::toggle_player));

    let tournament_routes = Router::new()
        .route(
            "/tournaments",
            get(tournaments::list_tournaments).post(tournaments::create_tournament),
        )
        .route("/tournaments/{tournament_id}", get(tournaments::get_tournament))
        .route(
            "/tournaments/{tournament_id}/participants",
            get(tournaments::list_participants).post(tournaments::enroll_participant),
        )
        .route(
            "/tournaments/{tournament_id}/generate",
            post(tournaments::generate_bracket),
        )
        .route(
            "/tournaments/{tournament_id}/next-round",
            post(tournaments::next_round),
        )
        .route(
            "/tournaments/{tournament_id}/bracket",
            get(tournaments::get_bracket),
        );

    let match_routes = Router::new()
        .route("/matches/{match_id}", get(matches::get_match))
        .route("/matches/{match_id}/winner", post(matches::set_winner));

    let report_routes = Router::new()
        .route("/reports/leaderboard", get(reports::leaderboard))
        .route(
            "/reports/tournaments/{tournament_id}/matches",
            get(reports::tournament_matches),
        );

    Router::new()
        .route("/health", get(health_check))
        .merge(player_routes)
        .merge(tournament_routes)
        .merge(match_routes)
        .merge(report_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8000/api/v1/health
/// # {"status":"healthy","version":"0.1.0","store":true,"timestamp":"2026-10-14T10:30:00+00:00"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = match state.store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            false
        }
    };

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
