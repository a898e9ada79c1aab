//! Conversion of domain errors into HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use knockout::{MatchError, PlayerError, ReportError, TournamentError};
use serde::{Deserialize, Serialize};

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// A domain error with its HTTP status
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    fn new(
        status: StatusCode,
        code: &'static str,
        message: String,
        detail: &dyn std::fmt::Display,
    ) -> Self {
        if status.is_server_error() {
            tracing::error!(code = code, error = %detail, "Request failed");
        } else {
            tracing::debug!(code = code, error = %detail, "Request rejected");
        }
        Self {
            status,
            code,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.code.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<TournamentError> for ApiError {
    fn from(err: TournamentError) -> Self {
        let status = match &err {
            TournamentError::TournamentNotFound(_) | TournamentError::PlayerNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            TournamentError::InvalidState { .. }
            | TournamentError::DuplicateEnrollment { .. }
            | TournamentError::NoBracket(_)
            | TournamentError::RoundIncomplete { .. }
            | TournamentError::ConcurrentModification(_) => StatusCode::CONFLICT,
            TournamentError::InvalidName(_)
            | TournamentError::InsufficientParticipants { .. }
            | TournamentError::InactivePlayer(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TournamentError::Integrity(_) | TournamentError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        ApiError::new(status, err.error_code(), err.client_message(), &err)
    }
}

impl From<MatchError> for ApiError {
    fn from(err: MatchError) -> Self {
        let status = match &err {
            MatchError::NotFound(_) => StatusCode::NOT_FOUND,
            MatchError::AlreadyResolved(_) => StatusCode::CONFLICT,
            MatchError::InvalidWinner { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            MatchError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.error_code(), err.client_message(), &err)
    }
}

impl From<PlayerError> for ApiError {
    fn from(err: PlayerError) -> Self {
        let status = match &err {
            PlayerError::NotFound(_) => StatusCode::NOT_FOUND,
            PlayerError::NickTaken(_) => StatusCode::CONFLICT,
            PlayerError::InvalidNick(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PlayerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.error_code(), err.client_message(), &err)
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        let status = match &err {
            ReportError::TournamentNotFound(_) => StatusCode::NOT_FOUND,
            ReportError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.error_code(), err.client_message(), &err)
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use knockout::bracket::BracketError;
    use knockout::tournament::TournamentStatus;

    #[test]
    fn test_tournament_status_mapping() {
        let cases = [
            (TournamentError::TournamentNotFound(1), StatusCode::NOT_FOUND),
            (
                TournamentError::InvalidState {
                    expected: TournamentStatus::Draft,
                    actual: TournamentStatus::Finished,
                },
                StatusCode::CONFLICT,
            ),
            (
                TournamentError::InsufficientParticipants {
                    needed: 2,
                    current: 0,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (TournamentError::NoBracket(1), StatusCode::CONFLICT),
            (
                TournamentError::InvalidName("name must not be blank".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                TournamentError::Integrity(BracketError::EmptyRound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let api = ApiError::from(TournamentError::Integrity(BracketError::OddMatchCount {
            round: 2,
            count: 3,
        }));
        assert_eq!(api.message, "Internal server error");
        assert_eq!(api.code, "INTEGRITY_VIOLATION");
    }

    #[test]
    fn test_match_and_player_mapping() {
        assert_eq!(
            ApiError::from(MatchError::AlreadyResolved(3)).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(MatchError::InvalidWinner {
                match_id: 3,
                winner_id: 9
            })
            .status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(PlayerError::NickTaken("ryu".to_string())).status,
            StatusCode::CONFLICT
        );
    }
}
