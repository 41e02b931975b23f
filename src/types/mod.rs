//! Core data types for the exchange
//!
//! All numeric values use fixed-point representation (scaled by 10^8).
//!
//! ## Types
//!
//! - [`Order`]: An immutable back or lay commitment
//! - [`Side`]: Back or Lay
//! - [`Status`]: Unmatched, Matched or Settled (kept beside the order)
//! - [`MatchReceipt`]: SSZ summary of one clearing run
//!
//! ## Fixed-Point Arithmetic
//!
//! Odds and stakes are stored as `u64` scaled by 10^8.
//! Example: decimal odds 2.1 are stored as 210_000_000u64

mod order;
mod receipt;
pub mod odds;

pub use order::{Order, Side, Status};
pub use receipt::MatchReceipt;
