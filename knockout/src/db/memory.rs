//! In-process store.
//!
//! All state sits behind one async mutex, so every method is atomic and
//! lifecycle writes re-check their preconditions under the lock. Used by the
//! test suites and by the server's `--memory` mode.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;

use super::errors::{StoreError, StoreResult};
use super::repository::{
    MatchRepository, PlayerRepository, Store, TournamentRepository, seeded_players,
};
use crate::matches::{Match, MatchId, MatchStatus, NewMatch};
use crate::players::{NewPlayer, Player, PlayerId, PlayerUpdate};
use crate::tournament::{Tournament, TournamentId, TournamentStatus};

#[derive(Debug, Default)]
struct State {
    players: BTreeMap<PlayerId, Player>,
    tournaments: BTreeMap<TournamentId, Tournament>,
    enrollments: Vec<(TournamentId, PlayerId)>,
    matches: BTreeMap<MatchId, Match>,
    player_seq: i64,
    tournament_seq: i64,
    match_seq: i64,
}

impl State {
    fn nick_taken(&self, nick: &str, except: Option<PlayerId>) -> bool {
        self.players
            .values()
            .any(|p| p.nick == nick && Some(p.id) != except)
    }

    fn tournament_in(
        &self,
        tournament_id: TournamentId,
        status: TournamentStatus,
    ) -> StoreResult<&Tournament> {
        let tournament = self
            .tournaments
            .get(&tournament_id)
            .ok_or_else(|| StoreError::Conflict(format!("tournament {tournament_id} missing")))?;
        if tournament.status != status {
            return Err(StoreError::Conflict(format!(
                "tournament {tournament_id} is {}, expected {status}",
                tournament.status
            )));
        }
        Ok(tournament)
    }

    fn slot_taken(&self, m: &NewMatch) -> bool {
        self.matches.values().any(|existing| {
            existing.tournament_id == m.tournament_id
                && existing.round == m.round
                && existing.position == m.position
        })
    }

    fn insert_matches(&mut self, matches: &[NewMatch]) -> StoreResult<Vec<Match>> {
        for (i, m) in matches.iter().enumerate() {
            let repeated = matches[..i]
                .iter()
                .any(|other| other.round == m.round && other.position == m.position);
            if repeated || self.slot_taken(m) {
                return Err(StoreError::Duplicate(format!(
                    "match slot round {} position {}",
                    m.round, m.position
                )));
            }
        }

        let mut created = Vec::with_capacity(matches.len());
        for m in matches {
            self.match_seq += 1;
            let stored = m.clone().into_match(self.match_seq);
            self.matches.insert(stored.id, stored.clone());
            created.push(stored);
        }
        Ok(created)
    }

    fn sorted_matches(&self, filter: impl Fn(&Match) -> bool) -> Vec<Match> {
        let mut found: Vec<Match> = self.matches.values().filter(|m| filter(m)).cloned().collect();
        found.sort_by_key(|m| (m.tournament_id, m.round, m.position));
        found
    }
}

/// Store keeping every record in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlayerRepository for MemoryStore {
    async fn insert_player(&self, player: &NewPlayer) -> StoreResult<Player> {
        let mut state = self.state.lock().await;
        if state.nick_taken(&player.nick, None) {
            return Err(StoreError::Duplicate(format!("nick {}", player.nick)));
        }

        state.player_seq += 1;
        let created = Player {
            id: state.player_seq,
            nick: player.nick.clone(),
            logo_url: player.logo_url.clone(),
            active: player.active,
        };
        state.players.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_player(&self, player_id: PlayerId) -> StoreResult<Option<Player>> {
        Ok(self.state.lock().await.players.get(&player_id).cloned())
    }

    async fn list_players(&self) -> StoreResult<Vec<Player>> {
        Ok(self.state.lock().await.players.values().cloned().collect())
    }

    async fn update_player(
        &self,
        player_id: PlayerId,
        changes: &PlayerUpdate,
    ) -> StoreResult<Option<Player>> {
        let mut state = self.state.lock().await;
        if let Some(nick) = &changes.nick {
            if state.nick_taken(nick, Some(player_id)) {
                return Err(StoreError::Duplicate(format!("nick {nick}")));
            }
        }

        Ok(state.players.get_mut(&player_id).map(|player| {
            changes.apply(player);
            player.clone()
        }))
    }

    async fn toggle_player_active(&self, player_id: PlayerId) -> StoreResult<Option<Player>> {
        let mut state = self.state.lock().await;
        Ok(state.players.get_mut(&player_id).map(|player| {
            player.active = !player.active;
            player.clone()
        }))
    }
}

#[async_trait]
impl TournamentRepository for MemoryStore {
    async fn insert_tournament(&self, name: &str) -> StoreResult<Tournament> {
        let mut state = self.state.lock().await;
        state.tournament_seq += 1;
        let created = Tournament {
            id: state.tournament_seq,
            name: name.to_string(),
            status: TournamentStatus::Draft,
            winner_id: None,
            created_at: Utc::now(),
        };
        state.tournaments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> StoreResult<Option<Tournament>> {
        Ok(self.state.lock().await.tournaments.get(&tournament_id).cloned())
    }

    async fn list_tournaments(&self) -> StoreResult<Vec<Tournament>> {
        let state = self.state.lock().await;
        Ok(state.tournaments.values().rev().cloned().collect())
    }

    async fn insert_enrollment(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state.tournament_in(tournament_id, TournamentStatus::Draft)?;
        if !state.players.contains_key(&player_id) {
            return Err(StoreError::Conflict(format!("player {player_id} missing")));
        }
        if state.enrollments.contains(&(tournament_id, player_id)) {
            return Err(StoreError::Duplicate(format!(
                "enrollment of player {player_id} in tournament {tournament_id}"
            )));
        }
        state.enrollments.push((tournament_id, player_id));
        Ok(())
    }

    async fn is_enrolled(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> StoreResult<bool> {
        let state = self.state.lock().await;
        Ok(state.enrollments.contains(&(tournament_id, player_id)))
    }

    async fn enrolled_players(&self, tournament_id: TournamentId) -> StoreResult<Vec<Player>> {
        let state = self.state.lock().await;
        Ok(state
            .enrollments
            .iter()
            .filter(|(t, _)| *t == tournament_id)
            .filter_map(|(_, p)| state.players.get(p).cloned())
            .collect())
    }

    async fn create_bracket(
        &self,
        tournament_id: TournamentId,
        matches: &[NewMatch],
    ) -> StoreResult<Vec<Match>> {
        let mut state = self.state.lock().await;
        state.tournament_in(tournament_id, TournamentStatus::Draft)?;

        let enrolled: BTreeSet<PlayerId> = state
            .enrollments
            .iter()
            .filter(|(t, _)| *t == tournament_id)
            .map(|(_, p)| *p)
            .collect();
        if enrolled != seeded_players(matches) {
            return Err(StoreError::Conflict(format!(
                "enrollment of tournament {tournament_id} changed during seeding"
            )));
        }

        let created = state.insert_matches(matches)?;
        if let Some(tournament) = state.tournaments.get_mut(&tournament_id) {
            tournament.status = TournamentStatus::Generated;
        }
        Ok(created)
    }

    async fn append_round(
        &self,
        tournament_id: TournamentId,
        matches: &[NewMatch],
    ) -> StoreResult<Vec<Match>> {
        let mut state = self.state.lock().await;
        state.tournament_in(tournament_id, TournamentStatus::Generated)?;
        state.insert_matches(matches)
    }

    async fn finish_tournament(
        &self,
        tournament_id: TournamentId,
        winner_id: PlayerId,
    ) -> StoreResult<Tournament> {
        let mut state = self.state.lock().await;
        state.tournament_in(tournament_id, TournamentStatus::Generated)?;
        let tournament = state
            .tournaments
            .get_mut(&tournament_id)
            .ok_or_else(|| StoreError::Conflict(format!("tournament {tournament_id} missing")))?;
        tournament.status = TournamentStatus::Finished;
        tournament.winner_id = Some(winner_id);
        Ok(tournament.clone())
    }
}

#[async_trait]
impl MatchRepository for MemoryStore {
    async fn find_match(&self, match_id: MatchId) -> StoreResult<Option<Match>> {
        Ok(self.state.lock().await.matches.get(&match_id).cloned())
    }

    async fn list_matches(
        &self,
        tournament_id: TournamentId,
        round: Option<u32>,
    ) -> StoreResult<Vec<Match>> {
        let state = self.state.lock().await;
        Ok(state.sorted_matches(|m| {
            m.tournament_id == tournament_id && round.is_none_or(|r| m.round == r)
        }))
    }

    async fn latest_round(&self, tournament_id: TournamentId) -> StoreResult<Option<u32>> {
        let state = self.state.lock().await;
        Ok(state
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .map(|m| m.round)
            .max())
    }

    async fn count_pending(&self, tournament_id: TournamentId, round: u32) -> StoreResult<usize> {
        let state = self.state.lock().await;
        Ok(state
            .matches
            .values()
            .filter(|m| {
                m.tournament_id == tournament_id
                    && m.round == round
                    && m.status == MatchStatus::Pending
            })
            .count())
    }

    async fn resolve_match(
        &self,
        match_id: MatchId,
        winner_id: PlayerId,
    ) -> StoreResult<Option<Match>> {
        let mut state = self.state.lock().await;
        let Some(m) = state.matches.get_mut(&match_id) else {
            return Ok(None);
        };
        if m.status != MatchStatus::Pending || !m.has_participant(winner_id) {
            return Ok(None);
        }
        m.winner_id = Some(winner_id);
        m.status = MatchStatus::Resolved;
        Ok(Some(m.clone()))
    }

    async fn resolved_matches(&self) -> StoreResult<Vec<Match>> {
        let state = self.state.lock().await;
        Ok(state.sorted_matches(|m| m.status == MatchStatus::Resolved))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_draft() -> (MemoryStore, TournamentId, Vec<PlayerId>) {
        let store = MemoryStore::new();
        let tournament = store.insert_tournament("Spring Cup").await.unwrap();
        let mut ids = Vec::new();
        for nick in ["a", "b", "c", "d"] {
            let player = store.insert_player(&NewPlayer::new(nick)).await.unwrap();
            store
                .insert_enrollment(tournament.id, player.id)
                .await
                .unwrap();
            ids.push(player.id);
        }
        (store, tournament.id, ids)
    }

    #[tokio::test]
    async fn test_ids_are_assigned_by_the_store() {
        let store = MemoryStore::new();
        let first = store.insert_player(&NewPlayer::new("a")).await.unwrap();
        let second = store.insert_player(&NewPlayer::new("b")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_duplicate_nick_rejected() {
        let store = MemoryStore::new();
        store.insert_player(&NewPlayer::new("ryu")).await.unwrap();
        let err = store.insert_player(&NewPlayer::new("ryu")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_rename_to_taken_nick_rejected() {
        let store = MemoryStore::new();
        store.insert_player(&NewPlayer::new("ryu")).await.unwrap();
        let ken = store.insert_player(&NewPlayer::new("ken")).await.unwrap();

        let rename = PlayerUpdate {
            nick: Some("ryu".to_string()),
            ..PlayerUpdate::default()
        };
        let err = store.update_player(ken.id, &rename).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        let keep_own = PlayerUpdate {
            nick: Some("ken".to_string()),
            ..PlayerUpdate::default()
        };
        assert!(store.update_player(ken.id, &keep_own).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_enrollment_rejected() {
        let (store, tournament_id, ids) = store_with_draft().await;
        let err = store
            .insert_enrollment(tournament_id, ids[0])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(store.enrolled_players(tournament_id).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_bracket_creation_requires_draft() {
        let (store, tournament_id, ids) = store_with_draft().await;
        let round = vec![
            NewMatch::pairing(tournament_id, 1, 1, ids[0], ids[1]),
            NewMatch::pairing(tournament_id, 1, 2, ids[2], ids[3]),
        ];
        store.create_bracket(tournament_id, &round).await.unwrap();

        let err = store.create_bracket(tournament_id, &round).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.list_matches(tournament_id, None).await.unwrap().len(), 2);

        let tournament = store.find_tournament(tournament_id).await.unwrap().unwrap();
        assert_eq!(tournament.status, TournamentStatus::Generated);
    }

    #[tokio::test]
    async fn test_bracket_must_seed_every_enrolled_player() {
        let (store, tournament_id, ids) = store_with_draft().await;
        let missing_one = vec![
            NewMatch::pairing(tournament_id, 1, 1, ids[0], ids[1]),
            NewMatch::bye(tournament_id, 2, ids[2]),
        ];
        let err = store
            .create_bracket(tournament_id, &missing_one)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let outsider = store.insert_player(&NewPlayer::new("outsider")).await.unwrap();
        let with_outsider = vec![
            NewMatch::pairing(tournament_id, 1, 1, ids[0], ids[1]),
            NewMatch::pairing(tournament_id, 1, 2, ids[2], outsider.id),
        ];
        let err = store
            .create_bracket(tournament_id, &with_outsider)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        assert!(store.list_matches(tournament_id, None).await.unwrap().is_empty());
        let tournament = store.find_tournament(tournament_id).await.unwrap().unwrap();
        assert_eq!(tournament.status, TournamentStatus::Draft);
    }

    #[tokio::test]
    async fn test_enrollment_closed_after_generation() {
        let (store, tournament_id, ids) = store_with_draft().await;
        let round = vec![
            NewMatch::pairing(tournament_id, 1, 1, ids[0], ids[1]),
            NewMatch::pairing(tournament_id, 1, 2, ids[2], ids[3]),
        ];
        store.create_bracket(tournament_id, &round).await.unwrap();

        let late = store.insert_player(&NewPlayer::new("late")).await.unwrap();
        let err = store
            .insert_enrollment(tournament_id, late.id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_second_append_of_same_round_rejected() {
        let (store, tournament_id, ids) = store_with_draft().await;
        store
            .create_bracket(
                tournament_id,
                &[
                    NewMatch::pairing(tournament_id, 1, 1, ids[0], ids[1]),
                    NewMatch::pairing(tournament_id, 1, 2, ids[2], ids[3]),
                ],
            )
            .await
            .unwrap();

        let next = [NewMatch::pairing(tournament_id, 2, 1, ids[0], ids[2])];
        store.append_round(tournament_id, &next).await.unwrap();
        let err = store.append_round(tournament_id, &next).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(
            store.list_matches(tournament_id, Some(2)).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_resolve_only_once_and_only_participants() {
        let (store, tournament_id, ids) = store_with_draft().await;
        let created = store
            .create_bracket(
                tournament_id,
                &[
                    NewMatch::pairing(tournament_id, 1, 1, ids[0], ids[1]),
                    NewMatch::pairing(tournament_id, 1, 2, ids[2], ids[3]),
                ],
            )
            .await
            .unwrap();
        let match_id = created[0].id;

        assert!(store.resolve_match(match_id, ids[2]).await.unwrap().is_none());
        let resolved = store.resolve_match(match_id, ids[1]).await.unwrap().unwrap();
        assert_eq!(resolved.winner_id, Some(ids[1]));
        assert!(store.resolve_match(match_id, ids[0]).await.unwrap().is_none());

        let stored = store.find_match(match_id).await.unwrap().unwrap();
        assert_eq!(stored.winner_id, Some(ids[1]));
        assert_eq!(store.count_pending(tournament_id, 1).await.unwrap(), 1);
        assert_eq!(store.latest_round(tournament_id).await.unwrap(), Some(1));
    }
}
