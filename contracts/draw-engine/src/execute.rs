use cosmwasm_std::{Addr, DepsMut, Env, Event, MessageInfo, Order, Response, StdResult, Storage, Uint128};
use fairway_common::month::{next_month_year, validate_month_year};
use fairway_common::settlement::{
    allocate, count_matches, tier_for_matches, validate_tier_split, validate_winning_numbers,
};
use fairway_common::types::{Allocation, DrawStatus, Plan, PrizeTier, SubscriptionStatus};

use crate::error::ContractError;
use crate::msg::UpdateSettingsParams;
use crate::state::{
    Draw, Participant, WinnerRecord, CONFIG, DRAWS, JACKPOT, PARTICIPANTS, SETTINGS, STATS,
    WINNERS,
};

/// Exactly this many recorded scores make a participant eligible.
pub const REQUIRED_SCORE_COUNT: usize = 5;

/// Whether a participant enters the given month's draw: active or trialing
/// subscription, not suspended, exactly five scores and, for monthly-plan
/// participants, an entry not already consumed by a different cycle.
pub fn is_eligible(participant: &Participant, month_year: &str) -> bool {
    if !participant.subscription.is_entered() || participant.suspended {
        return false;
    }
    if participant.scores.len() != REQUIRED_SCORE_COUNT {
        return false;
    }
    match participant.plan {
        Plan::Annual => true,
        Plan::Monthly => match &participant.assigned_draw {
            None => true,
            Some(assigned) => assigned == month_year,
        },
    }
}

/// Scan the registry for this month's eligible participants. Read-only;
/// storage failures propagate as `StdError` and are distinct from a
/// successful empty scan.
pub fn eligible_participants(
    storage: &dyn Storage,
    month_year: &str,
) -> StdResult<Vec<(Addr, Participant)>> {
    PARTICIPANTS
        .range(storage, None, None, Order::Ascending)
        .filter(|item| match item {
            Ok((_, participant)) => is_eligible(participant, month_year),
            Err(_) => true,
        })
        .collect()
}

fn transition(draw: &mut Draw, next: DrawStatus) -> Result<(), ContractError> {
    if !draw.status.can_transition_to(next) {
        return Err(ContractError::InvalidStatusTransition {
            from: draw.status.as_str().to_string(),
            to: next.as_str().to_string(),
        });
    }
    draw.status = next;
    Ok(())
}

fn payout_for(allocation: &Allocation, tier: PrizeTier) -> Uint128 {
    match tier {
        PrizeTier::Tier1 => allocation.tier1.payout,
        PrizeTier::Tier2 => allocation.tier2.payout,
        PrizeTier::Tier3 => allocation.tier3.payout,
    }
}

/// Create or overwrite a participant record. Registrar only. The
/// `assigned_draw` marker survives upserts so a re-sync cannot re-enter a
/// consumed monthly entry.
pub fn upsert_participant(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    address: String,
    scores: Vec<u16>,
    plan: Plan,
    subscription: SubscriptionStatus,
    suspended: bool,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.registrar {
        return Err(ContractError::Unauthorized {
            reason: "only registrar can sync participants".to_string(),
        });
    }

    if scores.len() > REQUIRED_SCORE_COUNT {
        return Err(ContractError::TooManyScores {
            count: scores.len(),
            max: REQUIRED_SCORE_COUNT,
        });
    }

    let addr = deps.api.addr_validate(&address)?;
    let assigned_draw = PARTICIPANTS
        .may_load(deps.storage, &addr)?
        .and_then(|existing| existing.assigned_draw);

    let participant = Participant {
        scores,
        plan,
        subscription,
        suspended,
        assigned_draw,
        updated_at: env.block.time,
    };
    PARTICIPANTS.save(deps.storage, &addr, &participant)?;

    Ok(Response::new()
        .add_attribute("action", "upsert_participant")
        .add_attribute("address", address.clone())
        .add_event(
            Event::new("fairway_participant_synced")
                .add_attribute("address", address)
                .add_attribute("score_count", participant.scores.len().to_string())
                .add_attribute("suspended", participant.suspended.to_string()),
        ))
}

/// Remove a participant record. Registrar only. Historical winner records
/// are untouched.
pub fn remove_participant(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    address: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.registrar {
        return Err(ContractError::Unauthorized {
            reason: "only registrar can sync participants".to_string(),
        });
    }

    let addr = deps.api.addr_validate(&address)?;
    PARTICIPANTS.remove(deps.storage, &addr);

    Ok(Response::new()
        .add_attribute("action", "remove_participant")
        .add_attribute("address", address))
}

/// Update draw economics. Admin only. The resulting settings are validated
/// before anything is persisted; a bad split leaves the stored settings
/// untouched.
pub fn update_settings(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    params: UpdateSettingsParams,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update settings".to_string(),
        });
    }

    let mut settings = SETTINGS.load(deps.storage)?;
    if let Some(base) = params.base_amount_per_sub {
        settings.base_amount_per_sub = base;
    }
    if let Some(t1) = params.tier1_percent {
        settings.tier1_percent = t1;
    }
    if let Some(t2) = params.tier2_percent {
        settings.tier2_percent = t2;
    }
    if let Some(t3) = params.tier3_percent {
        settings.tier3_percent = t3;
    }
    if let Some(cap) = params.jackpot_cap {
        settings.jackpot_cap = cap;
    }

    validate_tier_split(
        settings.tier1_percent,
        settings.tier2_percent,
        settings.tier3_percent,
    )?;
    SETTINGS.save(deps.storage, &settings)?;

    Ok(Response::new()
        .add_attribute("action", "update_settings")
        .add_attribute("base_amount_per_sub", settings.base_amount_per_sub.to_string())
        .add_attribute("jackpot_cap", settings.jackpot_cap.to_string()))
}

/// Update addresses. Admin only.
pub fn update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    admin: Option<String>,
    operator: Option<String>,
    registrar: Option<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update config".to_string(),
        });
    }

    if let Some(admin) = admin {
        config.admin = deps.api.addr_validate(&admin)?;
    }
    if let Some(operator) = operator {
        config.operator = deps.api.addr_validate(&operator)?;
    }
    if let Some(registrar) = registrar {
        config.registrar = deps.api.addr_validate(&registrar)?;
    }
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("action", "update_config"))
}

/// Settle and publish a monthly draw. Operator only.
///
/// The winning numbers are the reviewed set from the last simulate,
/// committed verbatim after validation. Eligibility, matches and pool
/// allocation are recomputed here so the persisted result reflects the
/// registry at commit time. The whole settlement is one transaction
/// walking `Open -> Processing -> Published`; a draw already published is
/// rejected before any mutation, which makes publish at-most-once per
/// month.
pub fn publish(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    month_year: String,
    range_min: u16,
    range_max: u16,
    winning_numbers: Vec<u16>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.operator {
        return Err(ContractError::Unauthorized {
            reason: "only operator can publish draws".to_string(),
        });
    }

    validate_month_year(&month_year)?;
    validate_winning_numbers(&winning_numbers, range_min, range_max)?;

    // Lazily created on first publish for a not-yet-existing month.
    let mut draw = match DRAWS.may_load(deps.storage, &month_year)? {
        Some(draw) => draw,
        None => Draw::open(month_year.clone(), env.block.time),
    };

    if draw.status == DrawStatus::Published {
        return Err(ContractError::AlreadyPublished {
            month_year: month_year.clone(),
        });
    }
    transition(&mut draw, DrawStatus::Processing)?;

    let settings = SETTINGS.load(deps.storage)?;
    let mut jackpot = JACKPOT.load(deps.storage)?;

    let eligible = eligible_participants(deps.storage, &month_year)?;
    let eligible_count = eligible.len() as u32;

    let mut counts = [0u32; 3];
    let mut evaluated: Vec<(Addr, Participant, u32, Option<PrizeTier>)> = Vec::new();
    for (addr, participant) in eligible {
        let matches = count_matches(&participant.scores, &winning_numbers);
        let tier = tier_for_matches(matches);
        match tier {
            Some(PrizeTier::Tier1) => counts[0] += 1,
            Some(PrizeTier::Tier2) => counts[1] += 1,
            Some(PrizeTier::Tier3) => counts[2] += 1,
            None => {}
        }
        evaluated.push((addr, participant, matches, tier));
    }

    let allocation = allocate(eligible_count, &settings, jackpot.amount, counts);

    // Winner records; monthly-plan winners have their entry consumed.
    for (addr, mut participant, matches, tier) in evaluated {
        let Some(tier) = tier else { continue };
        let record = WinnerRecord {
            matches,
            tier,
            payout: payout_for(&allocation, tier),
            scores: participant.scores.clone(),
        };
        WINNERS.save(deps.storage, (&month_year, &addr), &record)?;

        if participant.plan == Plan::Monthly {
            participant.assigned_draw = Some(month_year.clone());
            PARTICIPANTS.save(deps.storage, &addr, &participant)?;
        }
    }

    let total_awarded = allocation.total_awarded();

    draw.winning_numbers = winning_numbers.clone();
    draw.eligible_count = eligible_count;
    draw.prize_pool = allocation.prize_pool;
    draw.tier1 = allocation.tier1.clone();
    draw.tier2 = allocation.tier2.clone();
    draw.tier3 = allocation.tier3.clone();
    draw.jackpot_before = jackpot.amount;
    draw.jackpot_rollover = allocation.jackpot_rollover;
    draw.total_awarded = total_awarded;
    draw.published_at = Some(env.block.time);
    transition(&mut draw, DrawStatus::Published)?;
    DRAWS.save(deps.storage, &month_year, &draw)?;

    // No tier-1 winner: the capped pool becomes next cycle's jackpot.
    // Otherwise the carryover was paid out and the balance drops to zero.
    jackpot.amount = allocation.jackpot_rollover;
    jackpot.version += 1;
    JACKPOT.save(deps.storage, &jackpot)?;

    let mut stats = STATS.load(deps.storage)?;
    stats.draws_published += 1;
    stats.total_awarded += total_awarded;
    STATS.save(deps.storage, &stats)?;

    // Keep the cycle gap-free: open next month's draw eagerly. The label
    // was validated above, so month arithmetic cannot fail here.
    let next_month = next_month_year(&month_year)?;
    let next_created = if DRAWS.has(deps.storage, &next_month) {
        false
    } else {
        DRAWS.save(
            deps.storage,
            &next_month,
            &Draw::open(next_month.clone(), env.block.time),
        )?;
        true
    };

    let numbers_str = winning_numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",");

    Ok(Response::new()
        .add_attribute("action", "publish")
        .add_attribute("month_year", month_year.clone())
        .add_attribute("next_draw_created", next_created.to_string())
        .add_event(
            Event::new("fairway_draw_published")
                .add_attribute("month_year", month_year)
                .add_attribute("winning_numbers", numbers_str)
                .add_attribute("eligible_count", eligible_count.to_string())
                .add_attribute("prize_pool", allocation.prize_pool.to_string())
                .add_attribute("tier1_winners", allocation.tier1.winners.to_string())
                .add_attribute("tier2_winners", allocation.tier2.winners.to_string())
                .add_attribute("tier3_winners", allocation.tier3.winners.to_string())
                .add_attribute("total_awarded", total_awarded.to_string())
                .add_attribute("jackpot_before", draw.jackpot_before.to_string())
                .add_attribute("jackpot_rollover", allocation.jackpot_rollover.to_string()),
        ))
}

/// Reset a published draw. Admin only; the compensating transaction for a
/// mis-published result, not a routine operation. Draws created after the
/// target (including the auto-created next month) are not touched.
pub fn reset(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    month_year: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can reset draws".to_string(),
        });
    }

    let mut draw = DRAWS
        .may_load(deps.storage, &month_year)?
        .ok_or(ContractError::DrawNotFound {
            month_year: month_year.clone(),
        })?;

    if draw.status != DrawStatus::Published {
        return Err(ContractError::DrawNotPublished {
            month_year: month_year.clone(),
        });
    }

    // Delete this draw's winner records and reactivate the monthly-plan
    // entries it consumed.
    let winners: Vec<Addr> = WINNERS
        .prefix(&month_year)
        .keys(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<_>>()?;
    let removed_winners = winners.len() as u32;

    for addr in winners {
        WINNERS.remove(deps.storage, (&month_year, &addr));
        if let Some(mut participant) = PARTICIPANTS.may_load(deps.storage, &addr)? {
            if participant.assigned_draw.as_deref() == Some(month_year.as_str()) {
                participant.assigned_draw = None;
                PARTICIPANTS.save(deps.storage, &addr, &participant)?;
            }
        }
    }

    let mut jackpot = JACKPOT.load(deps.storage)?;
    let restored_jackpot = draw.jackpot_before;
    jackpot.amount = restored_jackpot;
    jackpot.version += 1;
    JACKPOT.save(deps.storage, &jackpot)?;

    let mut stats = STATS.load(deps.storage)?;
    stats.draws_published = stats.draws_published.saturating_sub(1);
    stats.total_awarded = stats.total_awarded.saturating_sub(draw.total_awarded);
    STATS.save(deps.storage, &stats)?;

    transition(&mut draw, DrawStatus::Open)?;
    let reverted = Draw::open(month_year.clone(), draw.created_at);
    DRAWS.save(deps.storage, &month_year, &reverted)?;

    Ok(Response::new()
        .add_attribute("action", "reset")
        .add_attribute("month_year", month_year.clone())
        .add_event(
            Event::new("fairway_draw_reset")
                .add_attribute("month_year", month_year)
                .add_attribute("removed_winners", removed_winners.to_string())
                .add_attribute("restored_jackpot", restored_jackpot.to_string()),
        ))
}
