//! Error types for the exchange and its configuration.
//!
//! Issuance errors abort a single `issue_order` call and leave no trace.
//! An empty or one-sided book is *not* an error: matching reports it as a
//! [`MatchStatus`](crate::engine::MatchStatus).

use thiserror::Error;

use crate::types::odds::from_fixed_trimmed;

/// Errors surfaced by the order, ledger and exchange APIs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("stake must be positive, got {stake}")]
    InvalidStake { stake: u64 },

    #[error("limit odds must be greater than 1, got {}", trimmed(.odds))]
    InvalidOdds { odds: u64 },

    #[error("invalid side byte {0}")]
    InvalidSide(u8),

    #[error("malformed order encoding: {0}")]
    Decode(String),

    #[error("probability must lie in [0, 1], got {}", trimmed(.probability))]
    InvalidProbability { probability: u64 },

    #[error("unknown agent {0}")]
    UnknownAgent(u64),

    #[error("unknown event {0}")]
    UnknownEvent(u64),

    #[error("event {0} is already settled")]
    EventSettled(u64),

    #[error("capital overflow debiting {stake} from agent {agent_id}")]
    CapitalOverflow { agent_id: u64, stake: u64 },

    #[error("payout for order {order_id} exceeds the fixed-point range")]
    PayoutOverflow { order_id: u64 },
}

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

pub type Result<T, E = ExchangeError> = std::result::Result<T, E>;

fn trimmed(value: &u64) -> String {
    from_fixed_trimmed(*value)
}
