//! # backlay
//!
//! Two-sided betting exchange simulator for binary events.
//!
//! ## Architecture
//!
//! - **Types**: fixed-point odds, `Order`, `MatchReceipt`
//! - **Book**: per-event order book with slab-based slot storage
//! - **Engine**: greedy volume-balancing back/lay clearing
//! - **Ledger**: agents, events and the `Exchange` registry
//! - **Settlement**: payout contract handed to an external collaborator
//! - **Simulation**: seeded agents, events and orders driven through the exchange
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical books produce identical partitions, odds and state roots
//! 2. **No Floating Point**: odds, stakes and capital are fixed-point (10^8 scaling)
//! 3. **Pre-allocated Memory**: slab allocation for O(1) slot inserts and keyed updates
//! 4. **Synchronous Execution**: a matching run is a single `&mut` borrow of its book
//!
//! ## Example
//!
//! ```
//! use backlay::{Exchange, Side};
//! use backlay::types::odds::to_fixed;
//!
//! let mut exchange = Exchange::new();
//! let agent = exchange.create_agent(10_000_000_000);
//! let event = exchange.create_event(to_fixed("0.5").unwrap()).unwrap();
//!
//! exchange.issue_order(agent, event, Side::Back, to_fixed("2.0").unwrap(), to_fixed("10").unwrap()).unwrap();
//! let result = exchange.run_match(event).unwrap();
//! assert!(result.bettor_odds.is_none());
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: fixed-point odds, Order, MatchReceipt
pub mod types;

/// Order book: slab-backed sides with (Order, Status) slots
pub mod book;

/// Matching engine: greedy back/lay clearing
pub mod engine;

/// Agents and the exchange registry
pub mod ledger;

/// Settlement boundary and reference payout schedule
pub mod settlement;

/// TOML configuration and logging setup
pub mod config;

/// Seeded end-to-end market simulation
pub mod simulation;

/// Error types
pub mod error;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use book::{Event, OrderBook};
pub use engine::{MatchObserver, MatchStatus, MatchingEngine};
pub use error::{ConfigError, ExchangeError, Result};
pub use ledger::{Agent, Exchange, MatchResult, SharedExchange};
pub use settlement::{Outcome, PayoutSchedule, Settlement};
pub use types::{MatchReceipt, Order, Side, Status};
