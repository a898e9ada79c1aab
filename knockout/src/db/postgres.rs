//! PostgreSQL store.
#![allow(clippy::needless_raw_string_hashes)]

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use std::collections::BTreeSet;
use sqlx::{PgPool, Postgres, Row, Transaction};

use super::errors::{StoreError, StoreResult};
use super::repository::{
    MatchRepository, PlayerRepository, Store, TournamentRepository, seeded_players,
};
use super::timeouts::{DEFAULT_QUERY_TIMEOUT, with_timeout, with_transaction_timeout};
use crate::matches::{Match, MatchId, MatchStatus, NewMatch};
use crate::players::{NewPlayer, Player, PlayerId, PlayerUpdate};
use crate::tournament::{Tournament, TournamentId, TournamentStatus};

const MATCH_COLUMNS: &str =
    "id, tournament_id, round, position, player1_id, player2_id, winner_id, status";

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock the tournament row and check it is in `expected` status
    async fn lock_tournament(
        tx: &mut Transaction<'_, Postgres>,
        tournament_id: TournamentId,
        expected: TournamentStatus,
    ) -> StoreResult<()> {
        let row = sqlx::query("SELECT status FROM tournaments WHERE id = $1 FOR UPDATE")
            .bind(tournament_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| StoreError::Conflict(format!("tournament {tournament_id} missing")))?;

        let status = decode_tournament_status(row.get("status"))?;
        if status != expected {
            return Err(StoreError::Conflict(format!(
                "tournament {tournament_id} is {status}, expected {expected}"
            )));
        }
        Ok(())
    }

    async fn insert_matches(
        tx: &mut Transaction<'_, Postgres>,
        matches: &[NewMatch],
    ) -> StoreResult<Vec<Match>> {
        let mut created = Vec::with_capacity(matches.len());
        for m in matches {
            let row = sqlx::query(
                r#"
                INSERT INTO matches (tournament_id, round, position, player1_id, player2_id, winner_id, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(m.tournament_id)
            .bind(m.round as i32)
            .bind(m.position as i32)
            .bind(m.player1_id)
            .bind(m.player2_id)
            .bind(m.winner_id)
            .bind(m.status.as_str())
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| {
                StoreError::from_write(
                    e,
                    &format!("match slot round {} position {}", m.round, m.position),
                )
            })?;

            created.push(m.clone().into_match(row.get("id")));
        }
        Ok(created)
    }
}

fn decode_tournament_status(value: String) -> StoreResult<TournamentStatus> {
    TournamentStatus::from_db(&value)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown tournament status {value}")))
}

fn player_from_row(row: &PgRow) -> Player {
    Player {
        id: row.get("id"),
        nick: row.get("nick"),
        logo_url: row.get("logo_url"),
        active: row.get("active"),
    }
}

fn tournament_from_row(row: &PgRow) -> StoreResult<Tournament> {
    Ok(Tournament {
        id: row.get("id"),
        name: row.get("name"),
        status: decode_tournament_status(row.get("status"))?,
        winner_id: row.get("winner_id"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    })
}

fn match_from_row(row: &PgRow) -> StoreResult<Match> {
    let status: String = row.get("status");
    let status = MatchStatus::from_db(&status)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown match status {status}")))?;

    Ok(Match {
        id: row.get("id"),
        tournament_id: row.get("tournament_id"),
        round: row.get::<i32, _>("round") as u32,
        position: row.get::<i32, _>("position") as u32,
        player1_id: row.get("player1_id"),
        player2_id: row.get("player2_id"),
        winner_id: row.get("winner_id"),
        status,
    })
}

#[async_trait]
impl PlayerRepository for PgStore {
    async fn insert_player(&self, player: &NewPlayer) -> StoreResult<Player> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            let row = sqlx::query(
                r#"
                INSERT INTO players (nick, logo_url, active)
                VALUES ($1, $2, $3)
                RETURNING id, nick, logo_url, active
                "#,
            )
            .bind(&player.nick)
            .bind(&player.logo_url)
            .bind(player.active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::from_write(e, &format!("nick {}", player.nick)))?;

            Ok(player_from_row(&row))
        })
        .await
    }

    async fn find_player(&self, player_id: PlayerId) -> StoreResult<Option<Player>> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            let row = sqlx::query("SELECT id, nick, logo_url, active FROM players WHERE id = $1")
                .bind(player_id)
                .fetch_optional(&self.pool)
                .await?;

            Ok(row.as_ref().map(player_from_row))
        })
        .await
    }

    async fn list_players(&self) -> StoreResult<Vec<Player>> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            let rows = sqlx::query("SELECT id, nick, logo_url, active FROM players ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

            Ok(rows.iter().map(player_from_row).collect())
        })
        .await
    }

    async fn update_player(
        &self,
        player_id: PlayerId,
        changes: &PlayerUpdate,
    ) -> StoreResult<Option<Player>> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            let row = sqlx::query(
                r#"
                UPDATE players
                SET nick = COALESCE($2, nick),
                    logo_url = CASE WHEN $3 THEN $4 ELSE logo_url END,
                    active = COALESCE($5, active)
                WHERE id = $1
                RETURNING id, nick, logo_url, active
                "#,
            )
            .bind(player_id)
            .bind(&changes.nick)
            .bind(changes.logo_url.is_some())
            .bind(changes.logo_url.clone().flatten())
            .bind(changes.active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                StoreError::from_write(e, &format!("nick {}", changes.nick.as_deref().unwrap_or("")))
            })?;

            Ok(row.as_ref().map(player_from_row))
        })
        .await
    }

    async fn toggle_player_active(&self, player_id: PlayerId) -> StoreResult<Option<Player>> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            let row = sqlx::query(
                r#"
                UPDATE players SET active = NOT active
                WHERE id = $1
                RETURNING id, nick, logo_url, active
                "#,
            )
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await?;

            Ok(row.as_ref().map(player_from_row))
        })
        .await
    }
}

#[async_trait]
impl TournamentRepository for PgStore {
    async fn insert_tournament(&self, name: &str) -> StoreResult<Tournament> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            let row = sqlx::query(
                r#"
                INSERT INTO tournaments (name, status)
                VALUES ($1, 'DRAFT')
                RETURNING id, name, status, winner_id, created_at
                "#,
            )
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

            tournament_from_row(&row)
        })
        .await
    }

    async fn find_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> StoreResult<Option<Tournament>> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            let row = sqlx::query(
                "SELECT id, name, status, winner_id, created_at FROM tournaments WHERE id = $1",
            )
            .bind(tournament_id)
            .fetch_optional(&self.pool)
            .await?;

            row.as_ref().map(tournament_from_row).transpose()
        })
        .await
    }

    async fn list_tournaments(&self) -> StoreResult<Vec<Tournament>> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            let rows = sqlx::query(
                r#"
                SELECT id, name, status, winner_id, created_at
                FROM tournaments
                ORDER BY created_at DESC, id DESC
                "#,
            )
            .fetch_all(&self.pool)
            .await?;

            rows.iter().map(tournament_from_row).collect()
        })
        .await
    }

    async fn insert_enrollment(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> StoreResult<()> {
        with_transaction_timeout(async {
            let mut tx = self.pool.begin().await?;
            Self::lock_tournament(&mut tx, tournament_id, TournamentStatus::Draft).await?;

            sqlx::query("INSERT INTO tournament_players (tournament_id, player_id) VALUES ($1, $2)")
                .bind(tournament_id)
                .bind(player_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    StoreError::from_write(
                        e,
                        &format!("enrollment of player {player_id} in tournament {tournament_id}"),
                    )
                })?;

            tx.commit().await?;
            Ok(())
        })
        .await
    }

    async fn is_enrolled(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> StoreResult<bool> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            let row = sqlx::query(
                "SELECT 1 AS found FROM tournament_players WHERE tournament_id = $1 AND player_id = $2",
            )
            .bind(tournament_id)
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await?;

            Ok(row.is_some())
        })
        .await
    }

    async fn enrolled_players(&self, tournament_id: TournamentId) -> StoreResult<Vec<Player>> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            let rows = sqlx::query(
                r#"
                SELECT p.id, p.nick, p.logo_url, p.active
                FROM tournament_players tp
                JOIN players p ON p.id = tp.player_id
                WHERE tp.tournament_id = $1
                ORDER BY tp.enrolled_at, tp.id
                "#,
            )
            .bind(tournament_id)
            .fetch_all(&self.pool)
            .await?;

            Ok(rows.iter().map(player_from_row).collect())
        })
        .await
    }

    async fn create_bracket(
        &self,
        tournament_id: TournamentId,
        matches: &[NewMatch],
    ) -> StoreResult<Vec<Match>> {
        with_transaction_timeout(async {
            let mut tx = self.pool.begin().await?;
            Self::lock_tournament(&mut tx, tournament_id, TournamentStatus::Draft).await?;

            // Enrollments take the same row lock, so this set is final
            let enrolled: BTreeSet<PlayerId> =
                sqlx::query("SELECT player_id FROM tournament_players WHERE tournament_id = $1")
                    .bind(tournament_id)
                    .fetch_all(&mut *tx)
                    .await?
                    .iter()
                    .map(|row| row.get("player_id"))
                    .collect();
            if enrolled != seeded_players(matches) {
                return Err(StoreError::Conflict(format!(
                    "enrollment of tournament {tournament_id} changed during seeding"
                )));
            }

            let created = Self::insert_matches(&mut tx, matches).await?;

            sqlx::query("UPDATE tournaments SET status = 'GENERATED' WHERE id = $1")
                .bind(tournament_id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok(created)
        })
        .await
    }

    async fn append_round(
        &self,
        tournament_id: TournamentId,
        matches: &[NewMatch],
    ) -> StoreResult<Vec<Match>> {
        with_transaction_timeout(async {
            let mut tx = self.pool.begin().await?;
            Self::lock_tournament(&mut tx, tournament_id, TournamentStatus::Generated).await?;

            let created = Self::insert_matches(&mut tx, matches).await?;

            tx.commit().await?;
            Ok(created)
        })
        .await
    }

    async fn finish_tournament(
        &self,
        tournament_id: TournamentId,
        winner_id: PlayerId,
    ) -> StoreResult<Tournament> {
        with_transaction_timeout(async {
            let mut tx = self.pool.begin().await?;
            Self::lock_tournament(&mut tx, tournament_id, TournamentStatus::Generated).await?;

            let row = sqlx::query(
                r#"
                UPDATE tournaments
                SET status = 'FINISHED', winner_id = $2
                WHERE id = $1
                RETURNING id, name, status, winner_id, created_at
                "#,
            )
            .bind(tournament_id)
            .bind(winner_id)
            .fetch_one(&mut *tx)
            .await?;

            let tournament = tournament_from_row(&row)?;
            tx.commit().await?;
            Ok(tournament)
        })
        .await
    }
}

#[async_trait]
impl MatchRepository for PgStore {
    async fn find_match(&self, match_id: MatchId) -> StoreResult<Option<Match>> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            let row = sqlx::query(&format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1"))
                .bind(match_id)
                .fetch_optional(&self.pool)
                .await?;

            row.as_ref().map(match_from_row).transpose()
        })
        .await
    }

    async fn list_matches(
        &self,
        tournament_id: TournamentId,
        round: Option<u32>,
    ) -> StoreResult<Vec<Match>> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            let rows = sqlx::query(&format!(
                r#"
                SELECT {MATCH_COLUMNS}
                FROM matches
                WHERE tournament_id = $1 AND ($2::INTEGER IS NULL OR round = $2)
                ORDER BY round, position
                "#
            ))
            .bind(tournament_id)
            .bind(round.map(|r| r as i32))
            .fetch_all(&self.pool)
            .await?;

            rows.iter().map(match_from_row).collect()
        })
        .await
    }

    async fn latest_round(&self, tournament_id: TournamentId) -> StoreResult<Option<u32>> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            let row = sqlx::query("SELECT MAX(round) AS round FROM matches WHERE tournament_id = $1")
                .bind(tournament_id)
                .fetch_one(&self.pool)
                .await?;

            Ok(row.get::<Option<i32>, _>("round").map(|r| r as u32))
        })
        .await
    }

    async fn count_pending(&self, tournament_id: TournamentId, round: u32) -> StoreResult<usize> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            let row = sqlx::query(
                r#"
                SELECT COUNT(*) AS pending
                FROM matches
                WHERE tournament_id = $1 AND round = $2 AND status = 'PENDING'
                "#,
            )
            .bind(tournament_id)
            .bind(round as i32)
            .fetch_one(&self.pool)
            .await?;

            Ok(row.get::<i64, _>("pending") as usize)
        })
        .await
    }

    async fn resolve_match(
        &self,
        match_id: MatchId,
        winner_id: PlayerId,
    ) -> StoreResult<Option<Match>> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            // Conditional on PENDING so a concurrent resolution cannot overwrite
            let row = sqlx::query(&format!(
                r#"
                UPDATE matches
                SET winner_id = $2, status = 'RESOLVED'
                WHERE id = $1
                  AND status = 'PENDING'
                  AND ($2 = player1_id OR $2 = player2_id)
                RETURNING {MATCH_COLUMNS}
                "#
            ))
            .bind(match_id)
            .bind(winner_id)
            .fetch_optional(&self.pool)
            .await?;

            row.as_ref().map(match_from_row).transpose()
        })
        .await
    }

    async fn resolved_matches(&self) -> StoreResult<Vec<Match>> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            let rows = sqlx::query(&format!(
                r#"
                SELECT {MATCH_COLUMNS}
                FROM matches
                WHERE status = 'RESOLVED'
                ORDER BY tournament_id, round, position
                "#
            ))
            .fetch_all(&self.pool)
            .await?;

            rows.iter().map(match_from_row).collect()
        })
        .await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
        .await
    }
}
