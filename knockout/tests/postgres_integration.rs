//! Integration tests against a real PostgreSQL database
//!
//! Ignored by default. Run with a reachable `DATABASE_URL`:
//! `cargo test -p knockout --test postgres_integration -- --ignored`

use knockout::db::{
    Database, DatabaseConfig, MatchRepository, PlayerRepository, SharedStore, Store, StoreError,
    TournamentRepository,
};
use knockout::db::timeouts::DEFAULT_QUERY_TIMEOUT;
use knockout::matches::{MatchError, MatchManager, NewMatch};
use knockout::players::{NewPlayer, PlayerError, PlayerManager};
use knockout::tournament::{Advancement, KeepOrder, TournamentManager, TournamentStatus};
use serial_test::serial;
use std::sync::Arc;

async fn setup() -> (Database, SharedStore) {
    let config = DatabaseConfig {
        max_connections: 5,
        min_connections: 1,
        ..DatabaseConfig::from_env()
    };
    let db = Database::new(&config)
        .await
        .expect("Failed to connect to database");
    db.init_schema().await.expect("Schema bootstrap failed");

    sqlx::query(
        "TRUNCATE matches, tournament_players, tournaments, players RESTART IDENTITY CASCADE",
    )
    .execute(db.pool())
    .await
    .expect("Failed to reset tables");

    let store: SharedStore = Arc::new(db.store());
    (db, store)
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_pg_full_tournament() {
    let (db, store) = setup().await;
    store.health_check().await.unwrap();

    let players = PlayerManager::new(store.clone());
    let tournaments = TournamentManager::with_shuffler(store.clone(), Arc::new(KeepOrder));
    let matches = MatchManager::new(store.clone());

    let cup = tournaments.create_tournament("PG Cup").await.unwrap();
    let mut ids = Vec::new();
    for nick in ["a", "b", "c", "d", "e"] {
        let id = players.create_player(NewPlayer::new(nick)).await.unwrap().id;
        tournaments.enroll_player(cup.id, id).await.unwrap();
        ids.push(id);
    }

    let round_one = tournaments.generate_bracket(cup.id).await.unwrap();
    assert_eq!(round_one.len(), 4);
    assert_eq!(round_one.iter().filter(|m| m.is_bye()).count(), 3);

    let champion = loop {
        for m in store.list_matches(cup.id, None).await.unwrap() {
            if !m.is_resolved() {
                matches.set_winner(m.id, m.player1_id.unwrap()).await.unwrap();
            }
        }
        let outcome = tournaments.advance_to_next_round(cup.id).await.unwrap();
        if let Advancement::Champion(winner) = outcome {
            break winner;
        }
    };

    let finished = tournaments.get_tournament(cup.id).await.unwrap();
    assert_eq!(finished.status, TournamentStatus::Finished);
    assert_eq!(finished.winner_id, Some(champion));
    assert!(ids.contains(&champion));

    db.close().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_pg_constraints_map_to_store_errors() {
    let (db, store) = setup().await;
    let players = PlayerManager::new(store.clone());

    players.create_player(NewPlayer::new("dup")).await.unwrap();
    let err = players.create_player(NewPlayer::new("dup")).await.unwrap_err();
    assert!(matches!(err, PlayerError::NickTaken(_)));

    let cup = store.insert_tournament("Constraint Cup").await.unwrap();
    let a = store.insert_player(&NewPlayer::new("a")).await.unwrap();
    let b = store.insert_player(&NewPlayer::new("b")).await.unwrap();
    store.insert_enrollment(cup.id, a.id).await.unwrap();
    let err = store.insert_enrollment(cup.id, a.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));

    // Round one must seed every enrolled player
    let round = [NewMatch::pairing(cup.id, 1, 1, a.id, b.id)];
    let err = store.create_bracket(cup.id, &round).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert!(store.list_matches(cup.id, None).await.unwrap().is_empty());

    store.insert_enrollment(cup.id, b.id).await.unwrap();
    let created = store.create_bracket(cup.id, &round).await.unwrap();
    let err = store.create_bracket(cup.id, &round).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    let err = store.append_round(cup.id, &round).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));

    let matches = MatchManager::new(store.clone());
    matches.set_winner(created[0].id, b.id).await.unwrap();
    let err = matches.set_winner(created[0].id, a.id).await.unwrap_err();
    assert!(matches!(err, MatchError::AlreadyResolved(_)));

    db.close().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_pg_blocked_write_times_out() {
    let (db, store) = setup().await;

    let cup = store.insert_tournament("Locked Cup").await.unwrap();
    let a = store.insert_player(&NewPlayer::new("a")).await.unwrap();
    let b = store.insert_player(&NewPlayer::new("b")).await.unwrap();
    store.insert_enrollment(cup.id, a.id).await.unwrap();
    store.insert_enrollment(cup.id, b.id).await.unwrap();
    let created = store
        .create_bracket(cup.id, &[NewMatch::pairing(cup.id, 1, 1, a.id, b.id)])
        .await
        .unwrap();

    // Another connection holds the match row until it rolls back
    let mut blocker = db.pool().begin().await.unwrap();
    sqlx::query("SELECT id FROM matches WHERE id = $1 FOR UPDATE")
        .bind(created[0].id)
        .execute(&mut *blocker)
        .await
        .unwrap();

    let started = std::time::Instant::now();
    let err = store.resolve_match(created[0].id, a.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Timeout(d) if d == DEFAULT_QUERY_TIMEOUT));
    assert!(started.elapsed() >= DEFAULT_QUERY_TIMEOUT);

    blocker.rollback().await.unwrap();

    db.close().await;
}
