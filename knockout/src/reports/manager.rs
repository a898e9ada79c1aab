//! Leaderboard and match history.

use std::collections::HashMap;

use super::errors::{ReportError, ReportResult};
use super::models::{LeaderboardEntry, MatchHistoryEntry};
use crate::db::{MatchRepository, PlayerRepository, SharedStore, TournamentRepository};
use crate::matches::Match;
use crate::players::{Player, PlayerId};
use crate::tournament::TournamentId;

/// Read-only reports over the stored matches
#[derive(Clone)]
pub struct ReportsManager {
    store: SharedStore,
}

impl ReportsManager {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Wins and losses of every player who has played a resolved match
    pub async fn leaderboard(&self) -> ReportResult<Vec<LeaderboardEntry>> {
        let players = self.store.list_players().await?;
        let resolved = self.store.resolved_matches().await?;
        Ok(build_leaderboard(&players, &resolved))
    }

    /// Every match of a tournament ordered by (round, position)
    pub async fn tournament_history(
        &self,
        tournament_id: TournamentId,
    ) -> ReportResult<Vec<MatchHistoryEntry>> {
        self.store
            .find_tournament(tournament_id)
            .await?
            .ok_or(ReportError::TournamentNotFound(tournament_id))?;

        let matches = self.store.list_matches(tournament_id, None).await?;
        let nicks: HashMap<PlayerId, String> = self
            .store
            .list_players()
            .await?
            .into_iter()
            .map(|p| (p.id, p.nick))
            .collect();
        let nick_of = |id: Option<PlayerId>| id.and_then(|id| nicks.get(&id).cloned());

        Ok(matches
            .into_iter()
            .map(|m| MatchHistoryEntry {
                match_id: m.id,
                round: m.round,
                position: m.position,
                player1_nick: nick_of(m.player1_id),
                player1_id: m.player1_id,
                player2_nick: nick_of(m.player2_id),
                player2_id: m.player2_id,
                winner_nick: nick_of(m.winner_id),
                winner_id: m.winner_id,
                status: m.status,
            })
            .collect())
    }
}

/// Tally resolved matches per player.
///
/// Sorted by wins descending, then losses ascending, then player ID.
pub fn build_leaderboard(players: &[Player], resolved: &[Match]) -> Vec<LeaderboardEntry> {
    let mut tally: HashMap<PlayerId, (u32, u32)> = HashMap::new();
    for m in resolved.iter().filter(|m| m.is_resolved()) {
        if let Some(winner) = m.winner_id {
            tally.entry(winner).or_default().0 += 1;
        }
        if let Some(loser) = m.loser_id() {
            tally.entry(loser).or_default().1 += 1;
        }
    }

    let mut board: Vec<LeaderboardEntry> = players
        .iter()
        .filter_map(|p| {
            tally.get(&p.id).map(|&(wins, losses)| LeaderboardEntry {
                player_id: p.id,
                nick: p.nick.clone(),
                wins,
                losses,
            })
        })
        .collect();

    board.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(a.losses.cmp(&b.losses))
            .then(a.player_id.cmp(&b.player_id))
    });
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::NewMatch;

    fn player(id: PlayerId, nick: &str) -> Player {
        Player {
            id,
            nick: nick.to_string(),
            logo_url: None,
            active: true,
        }
    }

    fn won(id: i64, p1: PlayerId, p2: PlayerId, winner: PlayerId) -> Match {
        let mut m = NewMatch::pairing(1, 1, id as u32, p1, p2).into_match(id);
        m.winner_id = Some(winner);
        m.status = crate::matches::MatchStatus::Resolved;
        m
    }

    #[test]
    fn test_bye_counts_as_win_but_never_as_loss() {
        let players = [player(1, "a"), player(2, "b"), player(3, "c")];
        let bye = NewMatch::bye(1, 2, 3).into_match(10);
        let board = build_leaderboard(&players, &[won(1, 1, 2, 1), bye]);

        assert_eq!(board.len(), 3);
        let c = board.iter().find(|e| e.player_id == 3).unwrap();
        assert_eq!((c.wins, c.losses), (1, 0));
        let b = board.iter().find(|e| e.player_id == 2).unwrap();
        assert_eq!((b.wins, b.losses), (0, 1));
    }

    #[test]
    fn test_ordering_and_idle_players_excluded() {
        let players = [player(1, "a"), player(2, "b"), player(3, "c"), player(4, "idle")];
        let matches = [won(1, 1, 2, 2), won(2, 3, 1, 3), won(3, 2, 3, 2)];
        let board = build_leaderboard(&players, &matches);

        let order: Vec<PlayerId> = board.iter().map(|e| e.player_id).collect();
        // b: 2-0, c: 1-1, a: 0-2
        assert_eq!(order, vec![2, 3, 1]);
        assert!(board.iter().all(|e| e.player_id != 4));
    }

    #[test]
    fn test_ties_break_on_player_id() {
        let players = [player(5, "e"), player(2, "b")];
        let board = build_leaderboard(&players, &[won(1, 5, 9, 5), won(2, 2, 9, 2)]);
        let order: Vec<PlayerId> = board.iter().map(|e| e.player_id).collect();
        assert_eq!(order, vec![2, 5]);
    }
}
