use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Uint128;
use fairway_common::types::{
    DrawSettings, Plan, PrizeTier, SubscriptionStatus, TierResult,
};

use crate::state::{Draw, EngineConfig, EngineStats, JackpotTracker, Participant};

#[cw_serde]
pub struct InstantiateMsg {
    pub operator: String,
    pub registrar: String,
    pub settings: DrawSettings,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Create or overwrite a participant record. Registrar only.
    /// `assigned_draw` is preserved across upserts.
    UpsertParticipant {
        address: String,
        scores: Vec<u16>,
        plan: Plan,
        subscription: SubscriptionStatus,
        suspended: bool,
    },
    /// Remove a participant record. Registrar only.
    RemoveParticipant { address: String },
    /// Update draw economics. Admin only. The resulting tier split must
    /// sum to 100 percent or nothing is persisted.
    UpdateSettings {
        base_amount_per_sub: Option<Uint128>,
        tier1_percent: Option<u16>,
        tier2_percent: Option<u16>,
        tier3_percent: Option<u16>,
        jackpot_cap: Option<Uint128>,
    },
    /// Update addresses. Admin only.
    UpdateConfig {
        admin: Option<String>,
        operator: Option<String>,
        registrar: Option<String>,
    },
    /// Settle and publish a monthly draw. Operator only.
    ///
    /// `winning_numbers` is the set shown by the reviewed `Simulate` call,
    /// committed verbatim; matches and pool allocation are recomputed
    /// in-transaction. At most once per month: an already-published draw
    /// is rejected without mutation.
    Publish {
        month_year: String,
        range_min: u16,
        range_max: u16,
        winning_numbers: Vec<u16>,
    },
    /// Compensating transaction for a mis-published draw. Admin only,
    /// valid only from `Published`: deletes that draw's winner records,
    /// restores the jackpot to its pre-publish balance, reactivates
    /// consumed monthly-plan entries and reverts the draw to `Open`.
    Reset { month_year: String },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(EngineConfig)]
    Config {},
    #[returns(DrawSettings)]
    Settings {},
    #[returns(JackpotTracker)]
    Jackpot {},
    #[returns(EngineStats)]
    Stats {},
    #[returns(Draw)]
    Draw { month_year: String },
    #[returns(DrawHistoryResponse)]
    DrawHistory {
        start_after: Option<String>,
        limit: Option<u32>,
    },
    #[returns(Option<Participant>)]
    Participant { address: String },
    #[returns(EligibleResponse)]
    Eligible { month_year: String },
    #[returns(WinnersResponse)]
    Winners {
        month_year: String,
        start_after: Option<String>,
        limit: Option<u32>,
    },
    /// Run a full dry-run settlement for a month: draw fresh winning
    /// numbers, evaluate every eligible participant and allocate pools.
    /// Read-only and repeatable; a new block or nonce re-rolls the
    /// numbers. Nothing is persisted until `Publish`.
    #[returns(AnalysisResult)]
    Simulate {
        month_year: String,
        range_min: u16,
        range_max: u16,
        nonce: Option<u64>,
    },
}

/// Bundled arguments for `ExecuteMsg::UpdateSettings`.
#[cw_serde]
pub struct UpdateSettingsParams {
    pub base_amount_per_sub: Option<Uint128>,
    pub tier1_percent: Option<u16>,
    pub tier2_percent: Option<u16>,
    pub tier3_percent: Option<u16>,
    pub jackpot_cap: Option<Uint128>,
}

#[cw_serde]
pub struct DrawHistoryResponse {
    pub draws: Vec<Draw>,
}

#[cw_serde]
pub struct EligibleResponse {
    pub month_year: String,
    pub count: u32,
    pub participants: Vec<String>,
}

#[cw_serde]
pub struct WinnerEntry {
    pub address: String,
    pub matches: u32,
    pub tier: PrizeTier,
    pub payout: Uint128,
    pub scores: Vec<u16>,
}

#[cw_serde]
pub struct WinnersResponse {
    pub month_year: String,
    pub winners: Vec<WinnerEntry>,
}

/// One participant's evaluation inside an analysis run.
#[cw_serde]
pub struct AnalysisEntry {
    pub address: String,
    pub scores: Vec<u16>,
    pub matches: u32,
    pub tier: Option<PrizeTier>,
}

/// Dry-run settlement of a month. Exists only in the query response;
/// re-running discards the previous result with no side effects.
#[cw_serde]
pub struct AnalysisResult {
    pub month_year: String,
    pub winning_numbers: Vec<u16>,
    /// Least/most frequently submitted scores within the range, for
    /// operator display only.
    pub least_popular: Vec<u16>,
    pub most_popular: Vec<u16>,
    pub eligible_count: u32,
    pub prize_pool: Uint128,
    pub tier1: TierResult,
    pub tier2: TierResult,
    pub tier3: TierResult,
    /// Jackpot balance that would be folded into the tier-1 pool.
    pub current_jackpot: Uint128,
    /// What would roll into next cycle's jackpot.
    pub jackpot_rollover: Uint128,
    pub entries: Vec<AnalysisEntry>,
}

#[cw_serde]
pub struct MigrateMsg {}
