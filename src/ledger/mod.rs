//! Agent ledger and exchange registry.
//!
//! - [`Agent`]: capital and issued orders
//! - [`Exchange`]: owns agents, events, id sequences and the engine
//! - [`SharedExchange`]: `Arc<Mutex<Exchange>>` handle for multi-threaded callers

pub mod agent;
pub mod exchange;
pub mod sequence;
pub mod shared;

pub use agent::Agent;
pub use exchange::{Exchange, MatchResult, DEFAULT_BOOK_CAPACITY};
pub use sequence::IdSequence;
pub use shared::SharedExchange;
