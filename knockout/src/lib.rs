//! # Knockout
//!
//! Single-elimination tournament management: players, enrollment, bracket
//! generation with byes, match resolution and round advancement until a
//! champion is crowned.
//!
//! ## Architecture
//!
//! A tournament moves through three states:
//!
//! - **DRAFT**: Created, accepting participants
//! - **GENERATED**: Round one seeded, matches being resolved round by round
//! - **FINISHED**: Final resolved, champion recorded
//!
//! The bracket engine is pure and synchronous. The managers are async and
//! talk to a [`db::Store`], either PostgreSQL ([`db::PgStore`]) or in-memory
//! ([`db::MemoryStore`]).
//!
//! ## Core Modules
//!
//! - [`bracket`]: Round-one seeding and winner pairing
//! - [`tournament`]: Lifecycle controller
//! - [`matches`]: Winner recording
//! - [`players`]: Player records
//! - [`reports`]: Leaderboard and match history
//! - [`db`]: Repository traits and stores
//!
//! ## Example
//!
//! ```
//! use knockout::bracket::{bracket_size, seed_round_one};
//!
//! assert_eq!(bracket_size(5), 8);
//! let round_one = seed_round_one(1, &[10, 11, 12, 13, 14]).unwrap();
//! assert_eq!(round_one.len(), 4);
//! assert_eq!(round_one.iter().filter(|m| m.is_bye()).count(), 3);
//! ```

/// Pure bracket algorithms.
pub mod bracket;

/// Storage layer.
pub mod db;

/// Matches and winner recording.
pub mod matches;

/// Player records.
pub mod players;

/// Leaderboard and match history.
pub mod reports;

/// Tournament lifecycle.
pub mod tournament;

pub use bracket::{BracketError, RoundOutcome};
pub use db::{Database, DatabaseConfig, MemoryStore, PgStore, SharedStore, Store, StoreError};
pub use matches::{Match, MatchError, MatchManager, MatchStatus};
pub use players::{Player, PlayerError, PlayerManager};
pub use reports::{ReportError, ReportsManager};
pub use tournament::{Advancement, Tournament, TournamentError, TournamentManager, TournamentStatus};
