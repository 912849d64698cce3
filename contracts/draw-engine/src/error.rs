use cosmwasm_std::StdError;
use fairway_common::settlement::SettlementError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Settlement(#[from] SettlementError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("no draw exists for {month_year}")]
    DrawNotFound { month_year: String },

    #[error("draw {month_year} is already published")]
    AlreadyPublished { month_year: String },

    #[error("draw {month_year} is not published; only published draws can be reset")]
    DrawNotPublished { month_year: String },

    #[error("invalid draw status transition {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("participant holds {count} scores, maximum is {max}")]
    TooManyScores { count: usize, max: usize },
}
