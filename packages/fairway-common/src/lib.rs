pub mod month;
pub mod settlement;
pub mod types;

pub use month::{next_month_year, validate_month_year};
pub use settlement::{
    allocate, count_matches, draw_numbers, score_popularity, tier_for_matches,
    validate_tier_split, validate_winning_numbers, SettlementError, MAX_RANGE_SPAN,
    WINNING_NUMBER_COUNT,
};
pub use types::{
    Allocation, DrawSettings, DrawStatus, Plan, PrizeTier, SubscriptionStatus, TierResult,
};
