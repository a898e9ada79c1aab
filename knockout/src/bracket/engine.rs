//! Pure single-elimination bracket algorithms.
//!
//! Nothing here touches the store: the lifecycle controller feeds the
//! engine participants or a completed round and persists what comes back.

use super::errors::{BracketError, BracketResult};
use crate::matches::{Match, NewMatch};
use crate::players::PlayerId;
use crate::tournament::TournamentId;

/// Minimum number of participants for a bracket
pub const MIN_PARTICIPANTS: usize = 2;

/// What advancing a completed round produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Pairings for the following round
    NextRound(Vec<NewMatch>),
    /// The completed round was the final
    Champion(PlayerId),
}

/// Smallest power of two that fits `participants`
pub fn bracket_size(participants: usize) -> usize {
    participants.max(1).next_power_of_two()
}

/// Number of rounds needed to reduce `participants` to a champion
pub fn total_rounds(participants: usize) -> u32 {
    bracket_size(participants).trailing_zeros()
}

/// Number of matches round `round` must contain given the first round's size
pub fn expected_round_size(round_one_matches: usize, round: u32) -> usize {
    if round == 0 {
        return 0;
    }
    round_one_matches.checked_shr(round - 1).unwrap_or(0)
}

/// Check that `actual` matches the size round `round` must have.
///
/// The first round must be a power of two and every later round half the
/// one before it.
pub fn validate_round_size(
    round_one_matches: usize,
    round: u32,
    actual: usize,
) -> BracketResult<()> {
    let expected = if round_one_matches.is_power_of_two() {
        expected_round_size(round_one_matches, round)
    } else {
        0
    };

    if expected == 0 || expected != actual {
        return Err(BracketError::RoundSizeMismatch {
            round,
            expected,
            actual,
        });
    }

    Ok(())
}

/// Build round one from an already shuffled participant list.
///
/// With `k = bracket_size(n) / 2` slots, the first `n - k` slots pair
/// consecutive participants and every remaining slot is a bye for the next
/// participant in line. That yields exactly `bracket_size(n) - n` byes and
/// never leaves a slot without a first player.
pub fn seed_round_one(
    tournament_id: TournamentId,
    participants: &[PlayerId],
) -> BracketResult<Vec<NewMatch>> {
    let n = participants.len();
    if n < MIN_PARTICIPANTS {
        return Err(BracketError::TooFewParticipants(n));
    }

    let slots = bracket_size(n) / 2;
    let pairings = n - slots;
    let (paired, byes) = participants.split_at(pairings * 2);

    let mut matches = Vec::with_capacity(slots);
    for pair in paired.chunks_exact(2) {
        let position = matches.len() as u32 + 1;
        matches.push(NewMatch::pairing(
            tournament_id,
            1,
            position,
            pair[0],
            pair[1],
        ));
    }
    for &player_id in byes {
        let position = matches.len() as u32 + 1;
        matches.push(NewMatch::bye(tournament_id, position, player_id));
    }

    debug_assert_eq!(matches.len(), slots);
    Ok(matches)
}

/// Turn a fully resolved round (ordered by position) into the next round,
/// or into a champion when only the final was played.
pub fn advance_round(completed: &[Match]) -> BracketResult<RoundOutcome> {
    let first = completed.first().ok_or(BracketError::EmptyRound)?;
    let round = first.round;

    let mut winners = Vec::with_capacity(completed.len());
    for (index, m) in completed.iter().enumerate() {
        if m.round != round {
            return Err(BracketError::MixedRounds {
                expected: round,
                found: m.round,
            });
        }
        let expected_position = index as u32 + 1;
        if m.position != expected_position {
            return Err(BracketError::PositionGap {
                round,
                expected: expected_position,
                found: m.position,
            });
        }
        winners.push(winner_of(m)?);
    }

    if let [champion] = winners.as_slice() {
        return Ok(RoundOutcome::Champion(*champion));
    }

    if winners.len() % 2 != 0 {
        return Err(BracketError::OddMatchCount {
            round,
            count: winners.len(),
        });
    }

    let next_round = winners
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            NewMatch::pairing(first.tournament_id, round + 1, i as u32 + 1, pair[0], pair[1])
        })
        .collect();

    Ok(RoundOutcome::NextRound(next_round))
}

fn winner_of(m: &Match) -> BracketResult<PlayerId> {
    match m.winner_id {
        Some(winner) if m.is_resolved() => Ok(winner),
        _ => Err(BracketError::UnresolvedMatch {
            round: m.round,
            position: m.position,
        }),
    }
}
