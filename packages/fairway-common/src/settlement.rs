use std::collections::{BTreeMap, BTreeSet};

use cosmwasm_std::Uint128;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::types::{Allocation, DrawSettings, PrizeTier, TierResult};

/// Every draw settles exactly five winning numbers.
pub const WINNING_NUMBER_COUNT: usize = 5;

/// Upper bound on `range_max - range_min + 1`. Keeps the selection pool a
/// small in-memory vector; real score ranges are two orders of magnitude
/// below this.
pub const MAX_RANGE_SPAN: u32 = 4096;

/// How many least/most popular numbers to report for operator display.
pub const POPULARITY_DISPLAY_COUNT: usize = 5;

#[derive(Error, Debug, PartialEq)]
pub enum SettlementError {
    #[error("invalid range: min {min} exceeds max {max}")]
    InvalidRange { min: u16, max: u16 },

    #[error("range [{min}, {max}] cannot yield {need} unique numbers")]
    RangeTooNarrow { min: u16, max: u16, need: usize },

    #[error("range span {span} exceeds maximum {max_span}")]
    RangeTooWide { span: u32, max_span: u32 },

    #[error("expected {expected} winning numbers, got {got}")]
    WrongNumberCount { expected: usize, got: usize },

    #[error("duplicate winning number {number}")]
    DuplicateNumber { number: u16 },

    #[error("winning number {number} outside range [{min}, {max}]")]
    NumberOutOfRange { number: u16, min: u16, max: u16 },

    #[error("tier percentages sum to {sum}, must be 100")]
    InvalidTierSplit { sum: u32 },

    #[error("invalid month label {label:?}, expected \"YYYY-MM\"")]
    InvalidMonthYear { label: String },
}

fn validate_range(range_min: u16, range_max: u16) -> Result<u32, SettlementError> {
    if range_max < range_min {
        return Err(SettlementError::InvalidRange {
            min: range_min,
            max: range_max,
        });
    }
    let span = u32::from(range_max) - u32::from(range_min) + 1;
    if (span as usize) < WINNING_NUMBER_COUNT {
        return Err(SettlementError::RangeTooNarrow {
            min: range_min,
            max: range_max,
            need: WINNING_NUMBER_COUNT,
        });
    }
    if span > MAX_RANGE_SPAN {
        return Err(SettlementError::RangeTooWide {
            span,
            max_span: MAX_RANGE_SPAN,
        });
    }
    Ok(span)
}

/// Counter-mode sha256 stream: block_i = sha256(seed || i), consumed as
/// big-endian u64 words.
struct SeedStream {
    seed: [u8; 32],
    counter: u32,
    block: [u8; 32],
    offset: usize,
}

impl SeedStream {
    fn new(seed: [u8; 32]) -> Self {
        let mut stream = SeedStream {
            seed,
            counter: 0,
            block: [0u8; 32],
            offset: 32,
        };
        stream.refill();
        stream
    }

    fn refill(&mut self) {
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(self.counter.to_be_bytes());
        self.block = hasher.finalize().into();
        self.counter += 1;
        self.offset = 0;
    }

    fn next_u64(&mut self) -> u64 {
        if self.offset + 8 > 32 {
            self.refill();
        }
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.block[self.offset..self.offset + 8]);
        self.offset += 8;
        u64::from_be_bytes(word)
    }
}

/// Draw five unique winning numbers from `[range_min, range_max]`,
/// uniformly without replacement, deterministic per seed.
///
/// Partial Fisher-Yates over the span: the first five slots of the
/// candidate vector are swapped with hash-stream-selected positions.
pub fn draw_numbers(
    seed: [u8; 32],
    range_min: u16,
    range_max: u16,
) -> Result<Vec<u16>, SettlementError> {
    let span = validate_range(range_min, range_max)? as u64;

    let mut pool: Vec<u16> = (range_min..=range_max).collect();
    let mut stream = SeedStream::new(seed);

    for i in 0..WINNING_NUMBER_COUNT as u64 {
        let j = i + stream.next_u64() % (span - i);
        pool.swap(i as usize, j as usize);
    }

    Ok(pool[..WINNING_NUMBER_COUNT].to_vec())
}

/// Validate an operator-supplied winning-number set: exactly five unique
/// numbers, each within the range. Used at publish so the committed set is
/// exactly the reviewed one.
pub fn validate_winning_numbers(
    numbers: &[u16],
    range_min: u16,
    range_max: u16,
) -> Result<(), SettlementError> {
    validate_range(range_min, range_max)?;

    if numbers.len() != WINNING_NUMBER_COUNT {
        return Err(SettlementError::WrongNumberCount {
            expected: WINNING_NUMBER_COUNT,
            got: numbers.len(),
        });
    }

    let mut seen = BTreeSet::new();
    for &number in numbers {
        if number < range_min || number > range_max {
            return Err(SettlementError::NumberOutOfRange {
                number,
                min: range_min,
                max: range_max,
            });
        }
        if !seen.insert(number) {
            return Err(SettlementError::DuplicateNumber { number });
        }
    }
    Ok(())
}

/// Least/most frequently submitted scores within the drawn range, up to
/// five each, ties broken toward the smaller number. Numbers in range that
/// nobody submitted count as frequency zero. Purely for operator display.
///
/// Returns empty vectors when no submitted score falls in the range.
pub fn score_popularity(
    submitted: &[u16],
    range_min: u16,
    range_max: u16,
) -> (Vec<u16>, Vec<u16>) {
    let mut freq: BTreeMap<u16, u32> = (range_min..=range_max).map(|n| (n, 0)).collect();
    let mut any_in_range = false;
    for &score in submitted {
        if let Some(count) = freq.get_mut(&score) {
            *count += 1;
            any_in_range = true;
        }
    }
    if !any_in_range {
        return (Vec::new(), Vec::new());
    }

    let mut ranked: Vec<(u16, u32)> = freq.into_iter().collect();
    // BTreeMap order gives the smaller-number tiebreak for free.
    ranked.sort_by_key(|&(_, count)| count);

    let least: Vec<u16> = ranked
        .iter()
        .take(POPULARITY_DISPLAY_COUNT)
        .map(|&(n, _)| n)
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let most: Vec<u16> = ranked
        .iter()
        .take(POPULARITY_DISPLAY_COUNT)
        .map(|&(n, _)| n)
        .collect();

    (least, most)
}

/// Number of a participant's scores that hit the winning set.
///
/// Both sides are treated as sets: duplicate scores never double-count,
/// so the result is always in `0..=5`.
pub fn count_matches(scores: &[u16], winning: &[u16]) -> u32 {
    let winning: BTreeSet<u16> = winning.iter().copied().collect();
    let scores: BTreeSet<u16> = scores.iter().copied().collect();
    scores.intersection(&winning).count() as u32
}

/// Tier assignment by exact match count; fewer than three matches wins
/// nothing.
pub fn tier_for_matches(matches: u32) -> Option<PrizeTier> {
    match matches {
        5 => Some(PrizeTier::Tier1),
        4 => Some(PrizeTier::Tier2),
        3 => Some(PrizeTier::Tier3),
        _ => None,
    }
}

/// Tier percentages must sum to exactly 100. Enforced at the settings
/// write boundary so `allocate` can assume it.
pub fn validate_tier_split(t1: u16, t2: u16, t3: u16) -> Result<(), SettlementError> {
    let sum = u32::from(t1) + u32::from(t2) + u32::from(t3);
    if sum != 100 {
        return Err(SettlementError::InvalidTierSplit { sum });
    }
    Ok(())
}

fn split_tier(pool: Uint128, winners: u32) -> TierResult {
    let payout = if winners > 0 {
        pool / Uint128::from(winners)
    } else {
        Uint128::zero()
    };
    TierResult {
        pool,
        winners,
        payout,
    }
}

/// Allocate one cycle's prize money.
///
/// `prize_pool = eligible_count * base_amount_per_sub`. The jackpot
/// carryover is folded into the tier-1 pool before the cap is applied;
/// whatever the cap shaves off overflows into tier 2. A tier-1 pool that
/// lands exactly on the cap is capped with zero overflow. When nobody hit
/// five matches the entire capped tier-1 pool becomes next cycle's
/// jackpot; empty tier-2/tier-3 pools are simply unspent and do not carry.
pub fn allocate(
    eligible_count: u32,
    settings: &DrawSettings,
    jackpot_in: Uint128,
    winner_counts: [u32; 3],
) -> Allocation {
    let prize_pool = Uint128::from(eligible_count) * settings.base_amount_per_sub;

    let tier1_raw =
        prize_pool.multiply_ratio(settings.tier1_percent, 100u128) + jackpot_in;
    let tier1_pool = tier1_raw.min(settings.jackpot_cap);
    let overflow = tier1_raw - tier1_pool;

    let tier2_pool = prize_pool.multiply_ratio(settings.tier2_percent, 100u128) + overflow;
    let tier3_pool = prize_pool.multiply_ratio(settings.tier3_percent, 100u128);

    let tier1 = split_tier(tier1_pool, winner_counts[0]);
    let tier2 = split_tier(tier2_pool, winner_counts[1]);
    let tier3 = split_tier(tier3_pool, winner_counts[2]);

    let jackpot_rollover = if winner_counts[0] == 0 {
        tier1_pool
    } else {
        Uint128::zero()
    };

    Allocation {
        prize_pool,
        tier1,
        tier2,
        tier3,
        jackpot_in,
        jackpot_rollover,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base: u128, t1: u16, t2: u16, t3: u16, cap: u128) -> DrawSettings {
        DrawSettings {
            base_amount_per_sub: Uint128::from(base),
            tier1_percent: t1,
            tier2_percent: t2,
            tier3_percent: t3,
            jackpot_cap: Uint128::from(cap),
        }
    }

    #[test]
    fn test_draw_numbers_unique_in_range() {
        for salt in 0u8..20 {
            let numbers = draw_numbers([salt; 32], 50, 130).unwrap();
            assert_eq!(numbers.len(), 5);
            let distinct: BTreeSet<u16> = numbers.iter().copied().collect();
            assert_eq!(distinct.len(), 5, "duplicates for salt {salt}");
            assert!(numbers.iter().all(|&n| (50..=130).contains(&n)));
        }
    }

    #[test]
    fn test_draw_numbers_deterministic_per_seed() {
        let a = draw_numbers([7u8; 32], 1, 100).unwrap();
        let b = draw_numbers([7u8; 32], 1, 100).unwrap();
        assert_eq!(a, b);

        let c = draw_numbers([8u8; 32], 1, 100).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_draw_numbers_exact_span() {
        // Span of exactly five must return the full range.
        let numbers = draw_numbers([3u8; 32], 10, 14).unwrap();
        let distinct: BTreeSet<u16> = numbers.iter().copied().collect();
        assert_eq!(distinct, (10..=14).collect::<BTreeSet<u16>>());
    }

    #[test]
    fn test_draw_numbers_rejects_narrow_range() {
        let err = draw_numbers([0u8; 32], 10, 13).unwrap_err();
        assert_eq!(
            err,
            SettlementError::RangeTooNarrow {
                min: 10,
                max: 13,
                need: 5
            }
        );
    }

    #[test]
    fn test_draw_numbers_rejects_inverted_range() {
        let err = draw_numbers([0u8; 32], 20, 10).unwrap_err();
        assert_eq!(err, SettlementError::InvalidRange { min: 20, max: 10 });
    }

    #[test]
    fn test_draw_numbers_rejects_huge_span() {
        let err = draw_numbers([0u8; 32], 0, 9999).unwrap_err();
        assert!(matches!(err, SettlementError::RangeTooWide { .. }));
    }

    #[test]
    fn test_validate_winning_numbers() {
        validate_winning_numbers(&[50, 61, 72, 83, 94], 50, 130).unwrap();

        let err = validate_winning_numbers(&[50, 61, 72, 83], 50, 130).unwrap_err();
        assert_eq!(
            err,
            SettlementError::WrongNumberCount {
                expected: 5,
                got: 4
            }
        );

        let err = validate_winning_numbers(&[50, 61, 61, 83, 94], 50, 130).unwrap_err();
        assert_eq!(err, SettlementError::DuplicateNumber { number: 61 });

        let err = validate_winning_numbers(&[50, 61, 72, 83, 131], 50, 130).unwrap_err();
        assert_eq!(
            err,
            SettlementError::NumberOutOfRange {
                number: 131,
                min: 50,
                max: 130
            }
        );
    }

    #[test]
    fn test_count_matches() {
        assert_eq!(count_matches(&[1, 2, 3, 4, 5], &[1, 2, 3, 4, 5]), 5);
        assert_eq!(count_matches(&[1, 2, 3, 4, 5], &[6, 7, 8, 9, 10]), 0);
        assert_eq!(count_matches(&[1, 2, 3, 4, 5], &[3, 4, 5, 6, 7]), 3);
        // Duplicate scores never double-count.
        assert_eq!(count_matches(&[3, 3, 3, 3, 3], &[3, 4, 5, 6, 7]), 1);
        assert_eq!(count_matches(&[], &[1, 2, 3, 4, 5]), 0);
    }

    #[test]
    fn test_tier_for_matches() {
        assert_eq!(tier_for_matches(5), Some(PrizeTier::Tier1));
        assert_eq!(tier_for_matches(4), Some(PrizeTier::Tier2));
        assert_eq!(tier_for_matches(3), Some(PrizeTier::Tier3));
        assert_eq!(tier_for_matches(2), None);
        assert_eq!(tier_for_matches(0), None);
    }

    #[test]
    fn test_validate_tier_split() {
        validate_tier_split(40, 35, 25).unwrap();
        let err = validate_tier_split(40, 35, 26).unwrap_err();
        assert_eq!(err, SettlementError::InvalidTierSplit { sum: 101 });
    }

    #[test]
    fn test_allocate_reference_figures() {
        // 100 subscribers at 10/sub, 40/35/25 split, no carryover.
        let alloc = allocate(
            100,
            &settings(10, 40, 35, 25, 250_000),
            Uint128::zero(),
            [1, 2, 4],
        );
        assert_eq!(alloc.prize_pool, Uint128::from(1000u128));
        assert_eq!(alloc.tier1.pool, Uint128::from(400u128));
        assert_eq!(alloc.tier2.pool, Uint128::from(350u128));
        assert_eq!(alloc.tier3.pool, Uint128::from(250u128));
        assert_eq!(alloc.tier1.payout, Uint128::from(400u128));
        assert_eq!(alloc.tier2.payout, Uint128::from(175u128));
        assert_eq!(alloc.tier3.payout, Uint128::from(62u128));
        assert_eq!(alloc.jackpot_rollover, Uint128::zero());
    }

    #[test]
    fn test_allocate_cap_boundary_no_overflow() {
        // tier1_raw == cap exactly: capped branch, zero overflow.
        // prize_pool = 1000, tier1 = 400 + 600 carryover = 1000 == cap.
        let alloc = allocate(
            100,
            &settings(10, 40, 35, 25, 1000),
            Uint128::from(600u128),
            [0, 0, 0],
        );
        assert_eq!(alloc.tier1.pool, Uint128::from(1000u128));
        assert_eq!(alloc.tier2.pool, Uint128::from(350u128));
        assert_eq!(alloc.jackpot_rollover, Uint128::from(1000u128));
    }

    #[test]
    fn test_allocate_overflow_routes_to_tier2() {
        // tier1_raw = 400 + 700 = 1100, cap 1000 -> 100 overflows to tier2.
        let alloc = allocate(
            100,
            &settings(10, 40, 35, 25, 1000),
            Uint128::from(700u128),
            [1, 0, 0],
        );
        assert_eq!(alloc.tier1.pool, Uint128::from(1000u128));
        assert_eq!(alloc.tier2.pool, Uint128::from(450u128));
        assert_eq!(alloc.tier3.pool, Uint128::from(250u128));
        // Tier 1 has a winner: jackpot is consumed, nothing rolls.
        assert_eq!(alloc.jackpot_rollover, Uint128::zero());
    }

    #[test]
    fn test_allocate_rollover_on_no_tier1_winner() {
        let alloc = allocate(
            200,
            &settings(10, 40, 35, 25, 250_000),
            Uint128::from(500u128),
            [0, 3, 10],
        );
        // tier1 pool = 800 + 500 = 1300, nobody hit it.
        assert_eq!(alloc.tier1.pool, Uint128::from(1300u128));
        assert_eq!(alloc.tier1.payout, Uint128::zero());
        assert_eq!(alloc.jackpot_rollover, Uint128::from(1300u128));
        // Empty tier2/tier3 pools would not roll; non-empty ones pay out.
        assert_eq!(alloc.tier2.payout, Uint128::from(233u128));
        assert_eq!(alloc.tier3.payout, Uint128::from(50u128));
    }

    #[test]
    fn test_allocate_unspent_lower_tiers_do_not_roll() {
        let alloc = allocate(
            100,
            &settings(10, 40, 35, 25, 250_000),
            Uint128::zero(),
            [1, 0, 0],
        );
        assert_eq!(alloc.jackpot_rollover, Uint128::zero());
        assert_eq!(alloc.tier2.payout, Uint128::zero());
        assert_eq!(alloc.tier3.payout, Uint128::zero());
        assert_eq!(alloc.total_awarded(), Uint128::from(400u128));
    }

    #[test]
    fn test_allocate_zero_eligible() {
        let alloc = allocate(
            0,
            &settings(10, 40, 35, 25, 250_000),
            Uint128::zero(),
            [0, 0, 0],
        );
        assert_eq!(alloc.prize_pool, Uint128::zero());
        assert_eq!(alloc.tier1.pool, Uint128::zero());
        assert_eq!(alloc.tier2.pool, Uint128::zero());
        assert_eq!(alloc.tier3.pool, Uint128::zero());
        assert_eq!(alloc.jackpot_rollover, Uint128::zero());
    }

    #[test]
    fn test_score_popularity() {
        // 72 submitted three times, 80 twice, 90 once.
        let submitted = [72, 72, 72, 80, 80, 90];
        let (least, most) = score_popularity(&submitted, 70, 75);
        // Only the 70..=75 window counts; 72 is the lone submitted number.
        assert_eq!(most[0], 72);
        assert_eq!(least, vec![70, 71, 73, 74, 75]);
    }

    #[test]
    fn test_score_popularity_empty() {
        let (least, most) = score_popularity(&[], 50, 130);
        assert!(least.is_empty());
        assert!(most.is_empty());

        // Submitted scores entirely outside the range count as none.
        let (least, most) = score_popularity(&[10, 20], 50, 130);
        assert!(least.is_empty());
        assert!(most.is_empty());
    }

    #[test]
    fn test_status_transition_table() {
        use crate::types::DrawStatus::*;
        assert!(Open.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Published));
        assert!(Published.can_transition_to(Open));
        assert!(!Open.can_transition_to(Published));
        assert!(!Processing.can_transition_to(Open));
        assert!(!Published.can_transition_to(Processing));
        assert!(!Open.can_transition_to(Open));
    }
}
