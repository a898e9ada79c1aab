//! Enrollment landing while a bracket is being generated.
//!
//! `LateEnrollment` wraps the in-memory store and enrolls one extra player
//! right after the participant list has been read, the window between the
//! controller's read and its bracket write.

use async_trait::async_trait;
use knockout::db::{
    MatchRepository, MemoryStore, PlayerRepository, SharedStore, Store, StoreResult,
    TournamentRepository,
};
use knockout::matches::{Match, MatchId, NewMatch};
use knockout::players::{NewPlayer, Player, PlayerId, PlayerUpdate};
use knockout::tournament::{
    KeepOrder, Tournament, TournamentError, TournamentId, TournamentManager, TournamentStatus,
};
use std::sync::{Arc, Mutex};

struct LateEnrollment {
    inner: MemoryStore,
    late: Mutex<Option<(TournamentId, PlayerId)>>,
}

#[async_trait]
impl PlayerRepository for LateEnrollment {
    async fn insert_player(&self, player: &NewPlayer) -> StoreResult<Player> {
        self.inner.insert_player(player).await
    }

    async fn find_player(&self, player_id: PlayerId) -> StoreResult<Option<Player>> {
        self.inner.find_player(player_id).await
    }

    async fn list_players(&self) -> StoreResult<Vec<Player>> {
        self.inner.list_players().await
    }

    async fn update_player(
        &self,
        player_id: PlayerId,
        changes: &PlayerUpdate,
    ) -> StoreResult<Option<Player>> {
        self.inner.update_player(player_id, changes).await
    }

    async fn toggle_player_active(&self, player_id: PlayerId) -> StoreResult<Option<Player>> {
        self.inner.toggle_player_active(player_id).await
    }
}

#[async_trait]
impl TournamentRepository for LateEnrollment {
    async fn insert_tournament(&self, name: &str) -> StoreResult<Tournament> {
        self.inner.insert_tournament(name).await
    }

    async fn find_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> StoreResult<Option<Tournament>> {
        self.inner.find_tournament(tournament_id).await
    }

    async fn list_tournaments(&self) -> StoreResult<Vec<Tournament>> {
        self.inner.list_tournaments().await
    }

    async fn insert_enrollment(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> StoreResult<()> {
        self.inner.insert_enrollment(tournament_id, player_id).await
    }

    async fn is_enrolled(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> StoreResult<bool> {
        self.inner.is_enrolled(tournament_id, player_id).await
    }

    async fn enrolled_players(&self, tournament_id: TournamentId) -> StoreResult<Vec<Player>> {
        let snapshot = self.inner.enrolled_players(tournament_id).await?;
        let late = self.late.lock().unwrap().take();
        if let Some((tid, pid)) = late {
            self.inner.insert_enrollment(tid, pid).await?;
        }
        Ok(snapshot)
    }

    async fn create_bracket(
        &self,
        tournament_id: TournamentId,
        matches: &[NewMatch],
    ) -> StoreResult<Vec<Match>> {
        self.inner.create_bracket(tournament_id, matches).await
    }

    async fn append_round(
        &self,
        tournament_id: TournamentId,
        matches: &[NewMatch],
    ) -> StoreResult<Vec<Match>> {
        self.inner.append_round(tournament_id, matches).await
    }

    async fn finish_tournament(
        &self,
        tournament_id: TournamentId,
        winner_id: PlayerId,
    ) -> StoreResult<Tournament> {
        self.inner.finish_tournament(tournament_id, winner_id).await
    }
}

#[async_trait]
impl MatchRepository for LateEnrollment {
    async fn find_match(&self, match_id: MatchId) -> StoreResult<Option<Match>> {
        self.inner.find_match(match_id).await
    }

    async fn list_matches(
        &self,
        tournament_id: TournamentId,
        round: Option<u32>,
    ) -> StoreResult<Vec<Match>> {
        self.inner.list_matches(tournament_id, round).await
    }

    async fn latest_round(&self, tournament_id: TournamentId) -> StoreResult<Option<u32>> {
        self.inner.latest_round(tournament_id).await
    }

    async fn count_pending(&self, tournament_id: TournamentId, round: u32) -> StoreResult<usize> {
        self.inner.count_pending(tournament_id, round).await
    }

    async fn resolve_match(
        &self,
        match_id: MatchId,
        winner_id: PlayerId,
    ) -> StoreResult<Option<Match>> {
        self.inner.resolve_match(match_id, winner_id).await
    }

    async fn resolved_matches(&self) -> StoreResult<Vec<Match>> {
        self.inner.resolved_matches().await
    }
}

#[async_trait]
impl Store for LateEnrollment {
    async fn health_check(&self) -> StoreResult<()> {
        self.inner.health_check().await
    }
}

#[tokio::test]
async fn test_enrollment_during_generation_is_not_dropped() {
    let store = Arc::new(LateEnrollment {
        inner: MemoryStore::new(),
        late: Mutex::new(None),
    });
    let shared: SharedStore = store.clone();
    let tournaments = TournamentManager::with_shuffler(shared.clone(), Arc::new(KeepOrder));

    let cup = tournaments.create_tournament("Late Cup").await.unwrap();
    for nick in ["a", "b", "c"] {
        let player = shared.insert_player(&NewPlayer::new(nick)).await.unwrap();
        tournaments.enroll_player(cup.id, player.id).await.unwrap();
    }
    let latecomer = shared.insert_player(&NewPlayer::new("d")).await.unwrap();
    *store.late.lock().unwrap() = Some((cup.id, latecomer.id));

    // The bracket seeded from three players no longer matches the four enrolled
    let err = tournaments.generate_bracket(cup.id).await.unwrap_err();
    assert!(matches!(err, TournamentError::ConcurrentModification(id) if id == cup.id));

    let tournament = tournaments.get_tournament(cup.id).await.unwrap();
    assert_eq!(tournament.status, TournamentStatus::Draft);
    assert!(tournaments.bracket(cup.id).await.unwrap().is_empty());
    assert_eq!(tournaments.participants(cup.id).await.unwrap().len(), 4);

    // Retrying seeds everyone, the latecomer included
    let round_one = tournaments.generate_bracket(cup.id).await.unwrap();
    assert_eq!(round_one.len(), 2);
    assert!(round_one.iter().all(|m| !m.is_bye()));
    assert!(round_one.iter().any(|m| m.has_participant(latecomer.id)));
}
