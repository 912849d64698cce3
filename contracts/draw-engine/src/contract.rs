use cosmwasm_std::{
    entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response, Uint128,
};
use cw2::{get_contract_version, set_contract_version};
use fairway_common::settlement::validate_tier_split;

use crate::error::ContractError;
use crate::execute;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, UpdateSettingsParams};
use crate::query;
use crate::state::{EngineConfig, EngineStats, JackpotTracker, CONFIG, JACKPOT, SETTINGS, STATS};

const CONTRACT_NAME: &str = "crates.io:fairway-draw-engine";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    // Settings are validated here and on every later write so the
    // allocator can assume the 100% split.
    validate_tier_split(
        msg.settings.tier1_percent,
        msg.settings.tier2_percent,
        msg.settings.tier3_percent,
    )?;

    let config = EngineConfig {
        admin: info.sender.clone(),
        operator: deps.api.addr_validate(&msg.operator)?,
        registrar: deps.api.addr_validate(&msg.registrar)?,
    };
    CONFIG.save(deps.storage, &config)?;
    SETTINGS.save(deps.storage, &msg.settings)?;

    JACKPOT.save(
        deps.storage,
        &JackpotTracker {
            amount: Uint128::zero(),
            version: 0,
        },
    )?;
    STATS.save(
        deps.storage,
        &EngineStats {
            draws_published: 0,
            total_awarded: Uint128::zero(),
        },
    )?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "draw-engine")
        .add_attribute("admin", info.sender.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::UpsertParticipant {
            address,
            scores,
            plan,
            subscription,
            suspended,
        } => execute::upsert_participant(
            deps,
            env,
            info,
            address,
            scores,
            plan,
            subscription,
            suspended,
        ),
        ExecuteMsg::RemoveParticipant { address } => {
            execute::remove_participant(deps, env, info, address)
        }
        ExecuteMsg::UpdateSettings {
            base_amount_per_sub,
            tier1_percent,
            tier2_percent,
            tier3_percent,
            jackpot_cap,
        } => execute::update_settings(
            deps,
            env,
            info,
            UpdateSettingsParams {
                base_amount_per_sub,
                tier1_percent,
                tier2_percent,
                tier3_percent,
                jackpot_cap,
            },
        ),
        ExecuteMsg::UpdateConfig {
            admin,
            operator,
            registrar,
        } => execute::update_config(deps, env, info, admin, operator, registrar),
        ExecuteMsg::Publish {
            month_year,
            range_min,
            range_max,
            winning_numbers,
        } => execute::publish(
            deps,
            env,
            info,
            month_year,
            range_min,
            range_max,
            winning_numbers,
        ),
        ExecuteMsg::Reset { month_year } => execute::reset(deps, env, info, month_year),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::Settings {} => query::query_settings(deps),
        QueryMsg::Jackpot {} => query::query_jackpot(deps),
        QueryMsg::Stats {} => query::query_stats(deps),
        QueryMsg::Draw { month_year } => query::query_draw(deps, month_year),
        QueryMsg::DrawHistory { start_after, limit } => {
            query::query_draw_history(deps, start_after, limit)
        }
        QueryMsg::Participant { address } => query::query_participant(deps, address),
        QueryMsg::Eligible { month_year } => query::query_eligible(deps, month_year),
        QueryMsg::Winners {
            month_year,
            start_after,
            limit,
        } => query::query_winners(deps, month_year, start_after, limit),
        QueryMsg::Simulate {
            month_year,
            range_min,
            range_max,
            nonce,
        } => query::query_simulate(deps, env, month_year, range_min, range_max, nonce),
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
