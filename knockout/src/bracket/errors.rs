//! Bracket engine error types.

use thiserror::Error;

/// Violations detected while seeding or advancing a bracket.
///
/// Apart from `TooFewParticipants` these all mean the stored bracket is
/// corrupted; they are never retried or patched over.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BracketError {
    /// Seeding needs at least two participants
    #[error("At least 2 participants are required, got {0}")]
    TooFewParticipants(usize),

    /// Advance was given no matches
    #[error("Round contains no matches")]
    EmptyRound,

    /// A match of the completed round has no winner
    #[error("Match at round {round} position {position} is not resolved")]
    UnresolvedMatch { round: u32, position: u32 },

    /// Matches from different rounds were mixed together
    #[error("Expected only round {expected} matches, found round {found}")]
    MixedRounds { expected: u32, found: u32 },

    /// Positions are not the contiguous sequence 1..=k
    #[error("Round {round} expected position {expected}, found {found}")]
    PositionGap { round: u32, expected: u32, found: u32 },

    /// More than one match but an odd count cannot be paired
    #[error("Round {round} has an odd number of matches ({count})")]
    OddMatchCount { round: u32, count: usize },

    /// The round does not have the size implied by the first round
    #[error("Round {round} should have {expected} matches, found {actual}")]
    RoundSizeMismatch {
        round: u32,
        expected: usize,
        actual: usize,
    },
}

/// Result type for bracket operations
pub type BracketResult<T> = Result<T, BracketError>;
