//! Tournament lifecycle controller.

use std::sync::Arc;

use super::errors::{TournamentError, TournamentResult};
use super::models::{Advancement, Tournament, TournamentId, TournamentStatus};
use super::shuffle::{RandomShuffler, Shuffler};
use crate::bracket::{self, BracketError, MIN_PARTICIPANTS, RoundOutcome};
use crate::db::{
    MatchRepository, PlayerRepository, SharedStore, StoreError, TournamentRepository,
};
use crate::matches::Match;
use crate::players::{Player, PlayerId};

/// Longest tournament name accepted
pub const MAX_NAME_LEN: usize = 128;

/// Tournament manager
///
/// Drives a tournament through DRAFT, GENERATED and FINISHED. Every
/// state-changing call re-checks its precondition inside the store write, so
/// a lost race surfaces as an error instead of a second write.
#[derive(Clone)]
pub struct TournamentManager {
    store: SharedStore,
    shuffler: Arc<dyn Shuffler>,
}

impl TournamentManager {
    /// Create a new tournament manager with random seeding
    pub fn new(store: SharedStore) -> Self {
        Self::with_shuffler(store, Arc::new(RandomShuffler))
    }

    /// Create a tournament manager with a specific seeding order
    pub fn with_shuffler(store: SharedStore, shuffler: Arc<dyn Shuffler>) -> Self {
        Self { store, shuffler }
    }

    /// Create a new DRAFT tournament
    ///
    /// The name is trimmed; blank or longer than [`MAX_NAME_LEN`] characters is `InvalidName`.
    pub async fn create_tournament(&self, name: &str) -> TournamentResult<Tournament> {
        let tournament = self.store.insert_tournament(validate_name(name)?).await?;
        log::info!("Created tournament {} ({})", tournament.id, tournament.name);
        Ok(tournament)
    }

    /// Get a tournament by ID
    pub async fn get_tournament(&self, tournament_id: TournamentId) -> TournamentResult<Tournament> {
        self.store
            .find_tournament(tournament_id)
            .await?
            .ok_or(TournamentError::TournamentNotFound(tournament_id))
    }

    /// All tournaments, newest first
    pub async fn list_tournaments(&self) -> TournamentResult<Vec<Tournament>> {
        Ok(self.store.list_tournaments().await?)
    }

    /// Enroll an active player in a DRAFT tournament
    ///
    /// # Errors
    ///
    /// * `TournamentNotFound` / `PlayerNotFound` - Unknown ID
    /// * `InvalidState` - Tournament is no longer DRAFT
    /// * `InactivePlayer` - Player is deactivated
    /// * `DuplicateEnrollment` - Player is already enrolled
    pub async fn enroll_player(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> TournamentResult<Player> {
        let tournament = self.get_tournament(tournament_id).await?;
        expect_status(&tournament, TournamentStatus::Draft)?;

        let player = self
            .store
            .find_player(player_id)
            .await?
            .ok_or(TournamentError::PlayerNotFound(player_id))?;

        if !player.active {
            return Err(TournamentError::InactivePlayer(player_id));
        }

        let duplicate = TournamentError::DuplicateEnrollment {
            tournament_id,
            player_id,
        };
        if self.store.is_enrolled(tournament_id, player_id).await? {
            return Err(duplicate);
        }

        match self.store.insert_enrollment(tournament_id, player_id).await {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => return Err(duplicate),
            Err(StoreError::Conflict(_)) => {
                return Err(self
                    .lost_race(tournament_id, TournamentStatus::Draft)
                    .await);
            }
            Err(e) => return Err(e.into()),
        }

        log::debug!("Player {} enrolled in tournament {}", player_id, tournament_id);
        Ok(player)
    }

    /// Enrolled players in enrollment order
    pub async fn participants(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Player>> {
        self.get_tournament(tournament_id).await?;
        Ok(self.store.enrolled_players(tournament_id).await?)
    }

    /// Shuffle the participants, seed round one and mark the tournament GENERATED
    ///
    /// Returns the round-one matches ordered by position, byes included. An
    /// enrollment that commits after the participants were read makes the
    /// store reject the bracket; that surfaces as `ConcurrentModification`
    /// and the tournament stays DRAFT.
    pub async fn generate_bracket(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Match>> {
        let tournament = self.get_tournament(tournament_id).await?;
        expect_status(&tournament, TournamentStatus::Draft)?;

        let mut order: Vec<PlayerId> = self
            .store
            .enrolled_players(tournament_id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        if order.len() < MIN_PARTICIPANTS {
            return Err(TournamentError::InsufficientParticipants {
                needed: MIN_PARTICIPANTS,
                current: order.len(),
            });
        }

        self.shuffler.shuffle(&mut order);
        let round_one = bracket::seed_round_one(tournament_id, &order)?;

        let created = match self.store.create_bracket(tournament_id, &round_one).await {
            Ok(created) => created,
            Err(StoreError::Conflict(_)) => {
                return Err(self
                    .lost_race(tournament_id, TournamentStatus::Draft)
                    .await);
            }
            Err(StoreError::Duplicate(_)) => {
                return Err(TournamentError::ConcurrentModification(tournament_id));
            }
            Err(e) => return Err(e.into()),
        };

        let byes = created.iter().filter(|m| m.is_bye()).count();
        log::info!(
            "Generated bracket for tournament {}: {} participants, {} matches, {} byes, {} rounds",
            tournament_id,
            order.len(),
            created.len(),
            byes,
            bracket::total_rounds(order.len())
        );
        Ok(created)
    }

    /// Close the current round and either create the next one or crown the champion
    ///
    /// # Errors
    ///
    /// * `TournamentNotFound` - Unknown ID
    /// * `InvalidState` - Tournament already FINISHED
    /// * `NoBracket` - No bracket has been generated
    /// * `RoundIncomplete` - The current round has pending matches
    /// * `Integrity` - The stored round is malformed; nothing is written
    /// * `ConcurrentModification` - Another caller advanced the same round first
    pub async fn advance_to_next_round(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Advancement> {
        let tournament = self.get_tournament(tournament_id).await?;
        if tournament.is_finished() {
            return Err(TournamentError::InvalidState {
                expected: TournamentStatus::Generated,
                actual: tournament.status,
            });
        }

        let round = self
            .store
            .latest_round(tournament_id)
            .await?
            .ok_or(TournamentError::NoBracket(tournament_id))?;

        let pending = self.store.count_pending(tournament_id, round).await?;
        if pending > 0 {
            return Err(TournamentError::RoundIncomplete { round, pending });
        }

        let current = self.store.list_matches(tournament_id, Some(round)).await?;
        let round_one_size = if round == 1 {
            current.len()
        } else {
            self.store.list_matches(tournament_id, Some(1)).await?.len()
        };

        let outcome = bracket::validate_round_size(round_one_size, round, current.len())
            .and_then(|()| bracket::advance_round(&current))
            .map_err(|e| integrity_violation(tournament_id, e))?;

        match outcome {
            RoundOutcome::Champion(winner_id) => {
                match self.store.finish_tournament(tournament_id, winner_id).await {
                    Ok(_) => {}
                    Err(StoreError::Conflict(_)) => {
                        return Err(self
                            .lost_race(tournament_id, TournamentStatus::Generated)
                            .await);
                    }
                    Err(e) => return Err(e.into()),
                }
                log::info!("Tournament {} finished, champion {}", tournament_id, winner_id);
                Ok(Advancement::Champion(winner_id))
            }
            RoundOutcome::NextRound(next) => {
                let created = match self.store.append_round(tournament_id, &next).await {
                    Ok(created) => created,
                    Err(StoreError::Duplicate(_)) => {
                        log::warn!(
                            "Round {} of tournament {} was created concurrently",
                            round + 1,
                            tournament_id
                        );
                        return Err(TournamentError::ConcurrentModification(tournament_id));
                    }
                    Err(StoreError::Conflict(_)) => {
                        return Err(self
                            .lost_race(tournament_id, TournamentStatus::Generated)
                            .await);
                    }
                    Err(e) => return Err(e.into()),
                };
                log::info!(
                    "Tournament {} advanced to round {} with {} matches",
                    tournament_id,
                    round + 1,
                    created.len()
                );
                Ok(Advancement::NextRound(created))
            }
        }
    }

    /// Every match of the tournament ordered by (round, position)
    pub async fn bracket(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Match>> {
        self.get_tournament(tournament_id).await?;
        Ok(self.store.list_matches(tournament_id, None).await?)
    }

    /// Explain a conditional write rejected by the store
    async fn lost_race(
        &self,
        tournament_id: TournamentId,
        expected: TournamentStatus,
    ) -> TournamentError {
        match self.store.find_tournament(tournament_id).await {
            Ok(Some(t)) if t.status != expected => TournamentError::InvalidState {
                expected,
                actual: t.status,
            },
            Ok(None) => TournamentError::TournamentNotFound(tournament_id),
            Ok(Some(_)) => TournamentError::ConcurrentModification(tournament_id),
            Err(e) => e.into(),
        }
    }
}

fn validate_name(name: &str) -> TournamentResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::InvalidName("name must not be blank".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(TournamentError::InvalidName(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

fn expect_status(tournament: &Tournament, expected: TournamentStatus) -> TournamentResult<()> {
    if tournament.status != expected {
        return Err(TournamentError::InvalidState {
            expected,
            actual: tournament.status,
        });
    }
    Ok(())
}

fn integrity_violation(tournament_id: TournamentId, err: BracketError) -> TournamentError {
    log::error!("Bracket integrity violation in tournament {}: {}", tournament_id, err);
    TournamentError::Integrity(err)
}
