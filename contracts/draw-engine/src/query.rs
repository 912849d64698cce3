use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Order, StdResult};
use cw_storage_plus::Bound;
use sha2::{Digest, Sha256};

use fairway_common::month::validate_month_year;
use fairway_common::settlement::{
    allocate, count_matches, draw_numbers, score_popularity, tier_for_matches,
};
use fairway_common::types::PrizeTier;

use crate::error::ContractError;
use crate::execute::eligible_participants;
use crate::msg::{
    AnalysisEntry, AnalysisResult, DrawHistoryResponse, EligibleResponse, WinnerEntry,
    WinnersResponse,
};
use crate::state::{CONFIG, DRAWS, JACKPOT, PARTICIPANTS, SETTINGS, STATS, WINNERS};

pub fn query_config(deps: Deps) -> Result<Binary, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    Ok(to_json_binary(&config)?)
}

pub fn query_settings(deps: Deps) -> Result<Binary, ContractError> {
    let settings = SETTINGS.load(deps.storage)?;
    Ok(to_json_binary(&settings)?)
}

pub fn query_jackpot(deps: Deps) -> Result<Binary, ContractError> {
    let jackpot = JACKPOT.load(deps.storage)?;
    Ok(to_json_binary(&jackpot)?)
}

pub fn query_stats(deps: Deps) -> Result<Binary, ContractError> {
    let stats = STATS.load(deps.storage)?;
    Ok(to_json_binary(&stats)?)
}

pub fn query_draw(deps: Deps, month_year: String) -> Result<Binary, ContractError> {
    let draw = DRAWS
        .may_load(deps.storage, &month_year)?
        .ok_or(ContractError::DrawNotFound {
            month_year: month_year.clone(),
        })?;
    Ok(to_json_binary(&draw)?)
}

pub fn query_draw_history(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> Result<Binary, ContractError> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.as_deref().map(Bound::exclusive);

    let draws: Vec<_> = DRAWS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, draw)| draw)
        .collect();

    Ok(to_json_binary(&DrawHistoryResponse { draws })?)
}

pub fn query_participant(deps: Deps, address: String) -> Result<Binary, ContractError> {
    let addr = deps.api.addr_validate(&address)?;
    let participant = PARTICIPANTS.may_load(deps.storage, &addr)?;
    Ok(to_json_binary(&participant)?)
}

pub fn query_eligible(deps: Deps, month_year: String) -> Result<Binary, ContractError> {
    validate_month_year(&month_year)?;
    let eligible = eligible_participants(deps.storage, &month_year)?;
    Ok(to_json_binary(&EligibleResponse {
        month_year,
        count: eligible.len() as u32,
        participants: eligible.into_iter().map(|(addr, _)| addr.to_string()).collect(),
    })?)
}

pub fn query_winners(
    deps: Deps,
    month_year: String,
    start_after: Option<String>,
    limit: Option<u32>,
) -> Result<Binary, ContractError> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start_addr = start_after
        .map(|s| deps.api.addr_validate(&s))
        .transpose()?;
    let start = start_addr.as_ref().map(Bound::exclusive);

    let winners: StdResult<Vec<WinnerEntry>> = WINNERS
        .prefix(&month_year)
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|r| {
            r.map(|(addr, record)| WinnerEntry {
                address: addr.to_string(),
                matches: record.matches,
                tier: record.tier,
                payout: record.payout,
                scores: record.scores,
            })
        })
        .collect();

    Ok(to_json_binary(&WinnersResponse {
        month_year,
        winners: winners?,
    })?)
}

/// Seed for a simulate run: fresh per block (and per nonce) so repeated
/// analysis re-rolls, deterministic within one.
fn simulate_seed(env: &Env, month_year: &str, nonce: Option<u64>) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"fairway-simulate");
    hasher.update(month_year.as_bytes());
    hasher.update(env.block.height.to_be_bytes());
    hasher.update(env.block.time.nanos().to_be_bytes());
    hasher.update(nonce.unwrap_or_default().to_be_bytes());
    hasher.finalize().into()
}

/// Dry-run settlement: draw fresh numbers, evaluate every eligible
/// participant and allocate pools. Read-only; nothing is persisted until
/// the operator publishes the reviewed numbers.
pub fn query_simulate(
    deps: Deps,
    env: Env,
    month_year: String,
    range_min: u16,
    range_max: u16,
    nonce: Option<u64>,
) -> Result<Binary, ContractError> {
    validate_month_year(&month_year)?;

    let settings = SETTINGS.load(deps.storage)?;
    let jackpot = JACKPOT.load(deps.storage)?;

    let seed = simulate_seed(&env, &month_year, nonce);
    let winning_numbers = draw_numbers(seed, range_min, range_max)?;

    let eligible = eligible_participants(deps.storage, &month_year)?;
    let eligible_count = eligible.len() as u32;

    let submitted: Vec<u16> = eligible
        .iter()
        .flat_map(|(_, p)| p.scores.iter().copied())
        .collect();
    let (least_popular, most_popular) = score_popularity(&submitted, range_min, range_max);

    let mut counts = [0u32; 3];
    let mut entries = Vec::with_capacity(eligible.len());
    for (addr, participant) in eligible {
        let matches = count_matches(&participant.scores, &winning_numbers);
        let tier = tier_for_matches(matches);
        match tier {
            Some(PrizeTier::Tier1) => counts[0] += 1,
            Some(PrizeTier::Tier2) => counts[1] += 1,
            Some(PrizeTier::Tier3) => counts[2] += 1,
            None => {}
        }
        entries.push(AnalysisEntry {
            address: addr.to_string(),
            scores: participant.scores,
            matches,
            tier,
        });
    }

    let allocation = allocate(eligible_count, &settings, jackpot.amount, counts);

    Ok(to_json_binary(&AnalysisResult {
        month_year,
        winning_numbers,
        least_popular,
        most_popular,
        eligible_count,
        prize_pool: allocation.prize_pool,
        tier1: allocation.tier1,
        tier2: allocation.tier2,
        tier3: allocation.tier3,
        current_jackpot: jackpot.amount,
        jackpot_rollover: allocation.jackpot_rollover,
        entries,
    })?)
}
