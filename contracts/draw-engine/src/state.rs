use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};
use fairway_common::types::{
    DrawSettings, DrawStatus, Plan, PrizeTier, SubscriptionStatus, TierResult,
};

pub const CONFIG: Item<EngineConfig> = Item::new("config");
pub const SETTINGS: Item<DrawSettings> = Item::new("settings");
pub const JACKPOT: Item<JackpotTracker> = Item::new("jackpot");
pub const STATS: Item<EngineStats> = Item::new("stats");

/// Monthly draws keyed by their `"YYYY-MM"` label, one per calendar month.
pub const DRAWS: Map<&str, Draw> = Map::new("draws");

/// Participant registry, mirrored from the subscription platform by the
/// registrar.
pub const PARTICIPANTS: Map<&Addr, Participant> = Map::new("participants");

/// Per-draw winner records, written at publish and deleted by reset.
pub const WINNERS: Map<(&str, &Addr), WinnerRecord> = Map::new("winners");

#[cw_serde]
pub struct EngineConfig {
    pub admin: Addr,
    /// Runs the monthly cycle: simulate, review, publish.
    pub operator: Addr,
    /// The subscription/score platform; the only address allowed to sync
    /// participant records.
    pub registrar: Addr,
}

/// The carryover jackpot balance. Versioned so off-chain tooling can
/// detect stale reads; every mutation bumps `version`. Mutated only by
/// publish (rollover) and reset (restore), never by subscription traffic.
#[cw_serde]
pub struct JackpotTracker {
    pub amount: Uint128,
    pub version: u64,
}

/// Running engine totals, adjusted by publish and reverted by reset.
#[cw_serde]
pub struct EngineStats {
    pub draws_published: u64,
    pub total_awarded: Uint128,
}

#[cw_serde]
pub struct Participant {
    /// Up to five recorded golf scores; exactly five are required for
    /// draw eligibility.
    pub scores: Vec<u16>,
    pub plan: Plan,
    pub subscription: SubscriptionStatus,
    pub suspended: bool,
    /// Monthly-plan entries are consumed by the draw they win in; holds
    /// that draw's month label.
    pub assigned_draw: Option<String>,
    pub updated_at: Timestamp,
}

#[cw_serde]
pub struct Draw {
    pub month_year: String,
    pub status: DrawStatus,
    /// Five unique numbers once published, empty while open.
    pub winning_numbers: Vec<u16>,
    pub eligible_count: u32,
    pub prize_pool: Uint128,
    pub tier1: TierResult,
    pub tier2: TierResult,
    pub tier3: TierResult,
    /// Jackpot balance as it stood before this draw's publish; the reset
    /// compensating transaction restores it.
    pub jackpot_before: Uint128,
    /// Jackpot carried into next cycle by this draw.
    pub jackpot_rollover: Uint128,
    /// Sum actually owed to winners across all tiers.
    pub total_awarded: Uint128,
    pub created_at: Timestamp,
    pub published_at: Option<Timestamp>,
}

impl Draw {
    /// A fresh open draw for the given month, no results yet.
    pub fn open(month_year: String, now: Timestamp) -> Self {
        Draw {
            month_year,
            status: DrawStatus::Open,
            winning_numbers: Vec::new(),
            eligible_count: 0,
            prize_pool: Uint128::zero(),
            tier1: TierResult::empty(),
            tier2: TierResult::empty(),
            tier3: TierResult::empty(),
            jackpot_before: Uint128::zero(),
            jackpot_rollover: Uint128::zero(),
            total_awarded: Uint128::zero(),
            created_at: now,
            published_at: None,
        }
    }
}

#[cw_serde]
pub struct WinnerRecord {
    pub matches: u32,
    pub tier: PrizeTier,
    pub payout: Uint128,
    /// The scores the participant held at settlement time.
    pub scores: Vec<u16>,
}
