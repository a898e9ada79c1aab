//! Tournament lifecycle.
//!
//! This module provides:
//! - Tournament creation and the DRAFT, GENERATED, FINISHED state machine
//! - Participant enrollment
//! - Bracket generation with an injectable seeding order
//! - Round advancement until a champion is crowned
//!
//! ## Example
//!
//! ```no_run
//! use knockout::db::{MemoryStore, PlayerRepository, SharedStore};
//! use knockout::players::NewPlayer;
//! use knockout::tournament::TournamentManager;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store: SharedStore = Arc::new(MemoryStore::new());
//!     let manager = TournamentManager::new(store.clone());
//!
//!     let cup = manager.create_tournament("Friday Cup").await?;
//!     for nick in ["ana", "ben", "cai"] {
//!         let player = store.insert_player(&NewPlayer::new(nick)).await?;
//!         manager.enroll_player(cup.id, player.id).await?;
//!     }
//!
//!     let round_one = manager.generate_bracket(cup.id).await?;
//!     println!("Round one has {} matches", round_one.len());
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod shuffle;

pub use errors::{TournamentError, TournamentResult};
pub use manager::{MAX_NAME_LEN, TournamentManager};
pub use models::{Advancement, Tournament, TournamentId, TournamentStatus};
pub use shuffle::{KeepOrder, RandomShuffler, SeededShuffler, Shuffler};
