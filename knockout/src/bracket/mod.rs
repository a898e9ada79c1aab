//! Single-elimination bracket engine.
//!
//! - Seeding round one from any participant count, with byes up to the
//!   next power of two
//! - Pairing winners of a completed round into the next one
//! - Detecting the champion once the final is resolved
//! - Round size checks used to reject a corrupted bracket

pub mod engine;
pub mod errors;

pub use engine::{
    MIN_PARTICIPANTS, RoundOutcome, advance_round, bracket_size, expected_round_size,
    seed_round_one, total_rounds, validate_round_size,
};
pub use errors::{BracketError, BracketResult};
