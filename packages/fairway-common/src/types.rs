use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;

/// Billing plan of a participant. Monthly-plan entries are consumed by the
/// draw they win in; annual-plan entries carry across cycles.
#[cw_serde]
pub enum Plan {
    Monthly,
    Annual,
}

/// Subscription standing as reported by the billing platform.
/// Only `Active` and `Trialing` participants enter the draw.
#[cw_serde]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    pub fn is_entered(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }
}

/// The lifecycle status of a monthly draw.
///
/// Normal flow is `Open -> Processing -> Published`, walked inside a single
/// publish transaction. `Published -> Open` exists only for the
/// administrative reset and is the compensating path, not a normal
/// transition.
#[cw_serde]
#[derive(Copy)]
pub enum DrawStatus {
    Open,
    Processing,
    Published,
}

impl DrawStatus {
    pub fn can_transition_to(self, next: DrawStatus) -> bool {
        matches!(
            (self, next),
            (DrawStatus::Open, DrawStatus::Processing)
                | (DrawStatus::Processing, DrawStatus::Published)
                | (DrawStatus::Published, DrawStatus::Open)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DrawStatus::Open => "open",
            DrawStatus::Processing => "processing",
            DrawStatus::Published => "published",
        }
    }
}

/// Prize bracket keyed by exact match count: 5 matches pays tier 1
/// (the jackpot tier), 4 pays tier 2, 3 pays tier 3.
#[cw_serde]
#[derive(Copy)]
pub enum PrizeTier {
    Tier1,
    Tier2,
    Tier3,
}

impl PrizeTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrizeTier::Tier1 => "tier1",
            PrizeTier::Tier2 => "tier2",
            PrizeTier::Tier3 => "tier3",
        }
    }
}

/// Admin-tuned draw economics, read by the allocator on every
/// analysis/publish. The tier split must sum to exactly 100 percent;
/// writes violating that are rejected at the boundary so allocation can
/// assume the invariant.
#[cw_serde]
pub struct DrawSettings {
    /// Prize pool contribution per eligible subscriber, in the smallest
    /// currency unit (e.g. cents).
    pub base_amount_per_sub: Uint128,
    pub tier1_percent: u16,
    pub tier2_percent: u16,
    pub tier3_percent: u16,
    /// Hard ceiling on the tier-1 (jackpot) pool. Anything above it
    /// overflows into tier 2.
    pub jackpot_cap: Uint128,
}

/// One tier's share of a settled draw.
#[cw_serde]
pub struct TierResult {
    pub pool: Uint128,
    pub winners: u32,
    /// Equal split of `pool` among `winners`; zero when the tier is empty.
    pub payout: Uint128,
}

impl TierResult {
    pub fn empty() -> Self {
        TierResult {
            pool: Uint128::zero(),
            winners: 0,
            payout: Uint128::zero(),
        }
    }
}

/// Full allocation of one cycle's prize money across the three tiers.
#[cw_serde]
pub struct Allocation {
    /// `eligible_count * base_amount_per_sub`
    pub prize_pool: Uint128,
    pub tier1: TierResult,
    pub tier2: TierResult,
    pub tier3: TierResult,
    /// Jackpot balance that was folded into the tier-1 pool.
    pub jackpot_in: Uint128,
    /// Next cycle's jackpot: the full capped tier-1 pool when nobody hit
    /// five matches, zero otherwise.
    pub jackpot_rollover: Uint128,
}

impl Allocation {
    /// Total actually owed to winners across all tiers.
    pub fn total_awarded(&self) -> Uint128 {
        let mut total = Uint128::zero();
        for tier in [&self.tier1, &self.tier2, &self.tier3] {
            total += tier.payout * Uint128::from(tier.winners);
        }
        total
    }
}
