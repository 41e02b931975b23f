//! Order types for the back/lay exchange.
//!
//! ## SSZ Serialization
//!
//! `Order` derives `SimpleSerialize` from ssz_rs so book state can be hashed
//! deterministically. Enums are stored as `u8` for SSZ compatibility.
//!
//! ## Immutability
//!
//! An `Order` never changes after issuance. Its book status lives beside it
//! in the order book slot, see [`Status`].

use std::fmt;

use ssz_rs::prelude::*;

use crate::error::{ExchangeError, Result};
use crate::types::odds::{from_fixed_trimmed, is_valid_odds};

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Back or Lay
///
/// Represented as u8 for SSZ compatibility:
/// - Back = 0
/// - Lay = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Bet that the event happens; `limit_odds` is the minimum accepted
    #[default]
    Back,
    /// Bet that the event does not happen; `limit_odds` is the maximum offered
    Lay,
}

impl Side {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Back => 0,
            Side::Lay => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Back),
            1 => Some(Side::Lay),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Back => f.write_str("Back"),
            Side::Lay => f.write_str("Lay"),
        }
    }
}

// ============================================================================
// Status enum
// ============================================================================

/// Book status of an order. Tracked in the book slot, not in the `Order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Unmatched,
    Matched,
    Settled,
}

impl Status {
    pub fn to_u8(self) -> u8 {
        match self {
            Status::Unmatched => 0,
            Status::Matched => 1,
            Status::Settled => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Status::Unmatched),
            1 => Some(Status::Matched),
            2 => Some(Status::Settled),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Unmatched => f.write_str("unmatched"),
            Status::Matched => f.write_str("matched"),
            Status::Settled => f.write_str("settled"),
        }
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A back or lay commitment against one event.
///
/// ## Fields
///
/// `limit_odds` and `stake` are fixed-point (scaled by 10^8). For a back
/// order `limit_odds` is the lowest odds the bettor accepts; for a lay order
/// it is the highest odds the layer offers.
///
/// ## SSZ Layout
///
/// Fixed-size container of 41 bytes (8+8+8+1+8+8).
///
/// `Default` exists only because SSZ decoding requires it; a defaulted order
/// has zero stake and is never produced by [`Order::new`]. Bytes from outside
/// the process go through [`Order::decode`], which enforces the same
/// invariants as `new`.
///
/// ## Example
///
/// ```
/// use backlay::types::{Order, Side};
///
/// // Back event 1 at 2.0 or better for a stake of 10
/// let order = Order::new(1, 7, 1, Side::Back, 200_000_000, 1_000_000_000).unwrap();
/// assert_eq!(order.side(), Side::Back);
///
/// // Odds of exactly 1.0 pay nothing and are rejected
/// assert!(Order::new(2, 7, 1, Side::Lay, 100_000_000, 1_000_000_000).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    id: u64,
    agent_id: u64,
    event_id: u64,
    side_raw: u8,
    limit_odds: u64,
    stake: u64,
}

impl Order {
    /// Create a validated order
    ///
    /// # Errors
    ///
    /// * [`ExchangeError::InvalidStake`] if `stake == 0`
    /// * [`ExchangeError::InvalidOdds`] if `limit_odds <= 1.0`
    pub fn new(
        id: u64,
        agent_id: u64,
        event_id: u64,
        side: Side,
        limit_odds: u64,
        stake: u64,
    ) -> Result<Self> {
        Self::validate(limit_odds, stake)?;

        Ok(Self {
            id,
            agent_id,
            event_id,
            side_raw: side.to_u8(),
            limit_odds,
            stake,
        })
    }

    /// Decode an SSZ-encoded order and enforce the [`Order::new`] invariants
    ///
    /// # Errors
    ///
    /// * [`ExchangeError::Decode`] if `bytes` is not a 41-byte order
    /// * [`ExchangeError::InvalidSide`] if the side byte is neither back nor lay
    /// * [`ExchangeError::InvalidStake`] / [`ExchangeError::InvalidOdds`] as for `new`
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let order: Self =
            ssz_rs::deserialize(bytes).map_err(|e| ExchangeError::Decode(e.to_string()))?;
        if Side::from_u8(order.side_raw).is_none() {
            return Err(ExchangeError::InvalidSide(order.side_raw));
        }
        Self::validate(order.limit_odds, order.stake)?;
        Ok(order)
    }

    /// Check the order invariants without building one
    pub fn validate(limit_odds: u64, stake: u64) -> Result<()> {
        if stake == 0 {
            return Err(ExchangeError::InvalidStake { stake });
        }
        if !is_valid_odds(limit_odds) {
            return Err(ExchangeError::InvalidOdds { odds: limit_odds });
        }
        Ok(())
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn agent_id(&self) -> u64 {
        self.agent_id
    }

    #[inline]
    pub fn event_id(&self) -> u64 {
        self.event_id
    }

    /// Get the order side
    ///
    /// Orders built by [`Order::new`] or [`Order::decode`] always carry a
    /// valid side byte.
    #[inline]
    pub fn side(&self) -> Side {
        Side::from_u8(self.side_raw).unwrap_or_default()
    }

    #[inline]
    pub fn limit_odds(&self) -> u64 {
        self.limit_odds
    }

    #[inline]
    pub fn stake(&self) -> u64 {
        self.stake
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(id={}, limit_odds={}, stake={}, agent={}, event={})",
            self.side(),
            self.id,
            from_fixed_trimmed(self.limit_odds),
            from_fixed_trimmed(self.stake),
            self.agent_id,
            self.event_id,
        )
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
