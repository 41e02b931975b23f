//! Matching engine module.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: Same book always produces the same partition and odds
//! 2. **Fixed-Point Math**: Liability balance cross-multiplied in exact 256-bit integers
//! 3. **Synchronous Execution**: One run is one `&mut` borrow of the book
//! 4. **Greedy, non-backtracking**: The first incompatible look-ahead ends a run
//!
//! ## Matching Rules
//!
//! - **Back orders** rank ascending by limit odds, **lay orders** descending
//! - Ties keep arrival order
//! - Runs never partially fill: an order is matched whole or not at all
//! - A side with no orders yields [`MatchOutcome::EmptyBook`] and no mutation
//!
//! ## Example
//!
//! ```
//! use backlay::book::OrderBook;
//! use backlay::engine::{MatchingEngine, MatchStatus, RecordingObserver};
//! use backlay::types::{Order, Side};
//!
//! let mut book = OrderBook::new();
//! book.add(Order::new(1, 1, 1, Side::Back, 200_000_000, 1_000_000_000).unwrap());
//!
//! let mut engine = MatchingEngine::with_observer(RecordingObserver::new());
//! let outcome = engine.match_book(&mut book);
//!
//! assert_eq!(outcome.status(), MatchStatus::EmptyBook);
//! assert!(book.clearing().is_none());
//! ```

pub mod matcher;
pub mod trace;

pub use matcher::{Clearing, MatchOutcome, MatchStatus, MatchingEngine, Resolution};
pub use trace::{
    MatchObserver, MatchStep, NoopObserver, RecordingObserver, StopReason, TracingObserver,
};
